use super::PLUGINS;
use axum::Router;
use plugin_api::{Plugin, PluginError};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, PoisonError},
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PluginContainerError {
    #[error("duplicate entry in plugin registry")]
    DuplicateEntry,
    #[error("plugin container is unloaded")]
    Unloaded,
    #[error("{0:?}")]
    PluginErrorMap(HashMap<String, PluginError>),
}

pub struct PluginContainer<'a> {
    loaded: bool,
    collected_routes: Vec<Router>,
    plugins: &'a Vec<Arc<Mutex<dyn Plugin + 'static>>>,
    mounted_plugins: Vec<Arc<Mutex<dyn Plugin + 'static>>>,
}

impl Default for PluginContainer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PluginContainer<'a> {
    /// Instantiate an object aware of all statically registered plugins
    pub fn new() -> Self {
        Self {
            loaded: false,
            collected_routes: vec![],
            plugins: &*PLUGINS,
            mounted_plugins: vec![],
        }
    }

    /// Load referenced plugins
    ///
    /// This entails mounting them and merging their routes internally (only
    /// upon successful initialization). An error is returned if plugins
    /// bearing the same name are found. Also, all plugins failing to be
    /// initialized are returned in a map with respectively raised errors.
    pub fn load(&mut self) -> Result<(), PluginContainerError> {
        tracing::debug!("loading plugin container");

        let names: Vec<&'static str> = self.plugins.iter().map(plugin_name).collect();
        let unique_names: HashSet<_> = names.iter().collect();
        if unique_names.len() != names.len() {
            tracing::error!("found duplicate entries in plugin registry");
            return Err(PluginContainerError::DuplicateEntry);
        }

        // Reset collection of routes
        self.collected_routes.clear();
        self.mounted_plugins.clear();

        let plugins = self.plugins;
        let mut errors = HashMap::new();
        for plugin in plugins.iter() {
            let mut guard = match plugin.lock() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    let name = poisoned.get_ref().name();
                    tracing::error!("cannot mount plugin {name}: lock poisoned");
                    errors.insert(name.to_owned(), poisoned_error());
                    continue;
                }
            };
            let name = guard.name();

            let outcome = guard.mount().and_then(|_| guard.routes());
            match outcome {
                Ok(routes) => {
                    tracing::info!("mounted plugin {name}");
                    self.collected_routes.push(routes);
                    self.mounted_plugins.push(plugin.clone());
                }
                Err(err) => {
                    tracing::error!("error mounting plugin {name}: {err}");
                    errors.insert(name.to_owned(), err);
                }
            }
        }

        // Flag as loaded
        self.loaded = true;

        if errors.is_empty() {
            tracing::debug!("plugin container loaded");
            Ok(())
        } else {
            Err(PluginContainerError::PluginErrorMap(errors))
        }
    }

    /// Unmount plugins that were successfully mounted.
    pub fn unload(&mut self) -> Result<(), PluginContainerError> {
        let mut errors = HashMap::new();

        for plugin in self.mounted_plugins.drain(..) {
            let guard = match plugin.lock() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    let name = poisoned.get_ref().name();
                    tracing::error!("cannot unmount plugin {name}: lock poisoned");
                    errors.insert(name.to_owned(), poisoned_error());
                    continue;
                }
            };

            match guard.unmount() {
                Ok(_) => tracing::info!("unmounted plugin {}", guard.name()),
                Err(err) => {
                    tracing::error!("error unmounting plugin {}: {err}", guard.name());
                    errors.insert(guard.name().to_owned(), err);
                }
            }
        }

        self.collected_routes.clear();
        self.loaded = false;

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PluginContainerError::PluginErrorMap(errors))
        }
    }

    /// Merge collected routes from all plugins successfully initialized.
    pub fn routes(&self) -> Result<Router, PluginContainerError> {
        if self.loaded {
            Ok(self
                .collected_routes
                .iter()
                .fold(Router::new(), |acc, e| acc.merge(e.clone())))
        } else {
            Err(PluginContainerError::Unloaded)
        }
    }
}

fn plugin_name(plugin: &Arc<Mutex<dyn Plugin + 'static>>) -> &'static str {
    plugin
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .name()
}

fn poisoned_error() -> PluginError {
    PluginError::Other("plugin lock poisoned".to_owned())
}
