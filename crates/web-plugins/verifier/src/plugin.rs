use crate::{
    builder::SenderRegistry,
    config::{load_plugin_env, ResolverSettings, VerifierEnv},
    constants::QR_CODE_TTL,
    identity::GenesisIdentity,
    lifecycle::{Collaborators, SessionController},
    model::{RequestMessage, SessionState},
    store::{QrCodeStore, SessionStore},
    validator::ValidationRules,
    verification::HttpProofVerifier,
    web,
};
use axum::Router;
use cache::InMemoryCache;
use plugin_api::{Plugin, PluginError};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct VerifierPlugin {
    state: Option<Arc<SessionController>>,
    janitor: Option<JoinHandle<()>>,
}

impl VerifierPlugin {
    fn mount_with(
        &mut self,
        env: VerifierEnv,
        settings: ResolverSettings,
    ) -> Result<(), PluginError> {
        let identity_networks = settings
            .identity_networks()
            .map_err(|err| PluginError::InitError(err.to_string()))?;

        let verifier = HttpProofVerifier::new(env.verifier_url.clone(), env.verifier_timeout)
            .map_err(|err| PluginError::InitError(format!("cannot build verifier client: {err}")))?;

        let sessions = Arc::new(InMemoryCache::<SessionState>::new());
        let qr_codes = Arc::new(InMemoryCache::<RequestMessage>::new());

        let rules = ValidationRules {
            supported_chain_ids: settings.supported_chain_ids(),
            require_credential_subject: env.require_credential_subject,
        };
        tracing::debug!(chains = ?rules.supported_chain_ids, "supported chains loaded");

        let controller = SessionController::new(
            env.server_public_domain,
            rules,
            Collaborators {
                senders: Arc::new(SenderRegistry::new(settings.sender_dids())),
                contracts: Arc::new(GenesisIdentity::new(identity_networks)),
                verifier: Arc::new(verifier),
            },
            SessionStore::new(sessions.clone(), env.cache_expiration),
            QrCodeStore::new(qr_codes.clone()),
        );

        self.janitor = spawn_janitor(sessions, qr_codes, env.cache_expiration.min(QR_CODE_TTL));
        self.state = Some(Arc::new(controller));

        Ok(())
    }
}

/// Periodically drops expired entries that were never read again.
fn spawn_janitor(
    sessions: Arc<InMemoryCache<SessionState>>,
    qr_codes: Arc<InMemoryCache<RequestMessage>>,
    period: Duration,
) -> Option<JoinHandle<()>> {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!("no async runtime, expired cache entries are only evicted on read");
        return None;
    };

    Some(runtime.spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let purged = sessions.purge_expired() + qr_codes.purge_expired();
            tracing::debug!(purged, "cache janitor run");
        }
    }))
}

impl Plugin for VerifierPlugin {
    fn name(&self) -> &'static str {
        "verifier"
    }

    fn mount(&mut self) -> Result<(), PluginError> {
        let env = load_plugin_env()?;

        let settings = ResolverSettings::load(&env.resolver_settings_path).map_err(|err| {
            PluginError::InitError(format!(
                "{err} ({path})",
                path = env.resolver_settings_path
            ))
        })?;

        self.mount_with(env, settings)
    }

    fn unmount(&self) -> Result<(), PluginError> {
        if let Some(janitor) = &self.janitor {
            janitor.abort();
        }

        Ok(())
    }

    fn routes(&self) -> Result<Router, PluginError> {
        let state = self.state.as_ref().ok_or(PluginError::Other(
            "missing state, plugin not mounted".to_owned(),
        ))?;

        Ok(web::routes(state.clone()))
    }
}
