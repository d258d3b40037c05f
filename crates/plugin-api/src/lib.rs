use axum::Router;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PluginError {
    #[error("{0}")]
    InitError(String),
    #[error("{0}")]
    Other(String),
}

/// A web plugin contributes a set of routes to the gateway.
///
/// Plugins are mounted once at startup, before their routes are requested,
/// and unmounted on shutdown.
pub trait Plugin: Sync + Send {
    /// Define a unique name for the plugin
    fn name(&self) -> &'static str;

    /// Acquire the resources the plugin needs (environment, state, tasks)
    fn mount(&mut self) -> Result<(), PluginError>;

    /// Release the resources acquired during mounting
    fn unmount(&self) -> Result<(), PluginError>;

    /// Export the routes served by the plugin
    fn routes(&self) -> Result<Router, PluginError>;
}
