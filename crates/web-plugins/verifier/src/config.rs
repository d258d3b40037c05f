use crate::identity::IdentityNetwork;
use plugin_api::PluginError;
use serde::Deserialize;
use std::{collections::HashMap, path::Path, time::Duration};
use thiserror::Error;
use url::Url;

const DEFAULT_CACHE_EXPIRATION: Duration = Duration::from_secs(48 * 60 * 60);
const DEFAULT_RESOLVER_SETTINGS_PATH: &str = "./resolvers_settings.json";
const DEFAULT_VERIFIER_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

pub(crate) struct VerifierEnv {
    pub(crate) server_public_domain: String,
    pub(crate) cache_expiration: Duration,
    pub(crate) resolver_settings_path: String,
    pub(crate) verifier_url: Url,
    pub(crate) verifier_timeout: Duration,
    pub(crate) require_credential_subject: bool,
}

pub(crate) fn load_plugin_env() -> Result<VerifierEnv, PluginError> {
    let server_public_domain = std::env::var("SERVER_PUBLIC_DOMAIN").map_err(|_| {
        PluginError::InitError("SERVER_PUBLIC_DOMAIN env variable required".to_owned())
    })?;

    let verifier_url = std::env::var("VERIFIER_URL")
        .map_err(|_| PluginError::InitError("VERIFIER_URL env variable required".to_owned()))?;
    let verifier_url = Url::parse(&verifier_url)
        .map_err(|err| PluginError::InitError(format!("invalid VERIFIER_URL: {err}")))?;

    Ok(VerifierEnv {
        server_public_domain: server_public_domain.trim_end_matches('/').to_owned(),
        cache_expiration: optional_secs("CACHE_EXPIRATION_SECS")?
            .unwrap_or(DEFAULT_CACHE_EXPIRATION),
        resolver_settings_path: std::env::var("RESOLVER_SETTINGS_PATH")
            .unwrap_or_else(|_| DEFAULT_RESOLVER_SETTINGS_PATH.to_owned()),
        verifier_url,
        verifier_timeout: optional_secs("VERIFIER_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_VERIFIER_TIMEOUT),
        require_credential_subject: std::env::var("REQUIRE_CREDENTIAL_SUBJECT")
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false),
    })
}

fn optional_secs(name: &str) -> Result<Option<Duration>, PluginError> {
    std::env::var(name)
        .ok()
        .map(|value| parse_secs(name, &value))
        .transpose()
}

fn parse_secs(name: &str, value: &str) -> Result<Duration, PluginError> {
    value
        .parse::<u64>()
        .ok()
        .filter(|secs| (1..=MAX_DURATION_SECS).contains(secs))
        .map(Duration::from_secs)
        .ok_or_else(|| {
            PluginError::InitError(format!(
                "{name} must be a number of seconds between 1 and {MAX_DURATION_SECS}"
            ))
        })
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("cannot read resolver settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse resolver settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid chainID {chain_id:?} for {blockchain}:{network}")]
    InvalidChainId {
        blockchain: String,
        network: String,
        chain_id: String,
    },
}

/// Per network settings, keyed by blockchain then network name.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub(crate) struct ResolverSettings(HashMap<String, HashMap<String, NetworkSettings>>);

// `contractAddress` and `networkURL` are consumed by the state resolvers of
// the proof verifier and ignored here.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NetworkSettings {
    #[serde(rename = "chainID")]
    pub(crate) chain_id: String,

    #[serde(rename = "DID")]
    pub(crate) did: String,

    #[serde(rename = "networkFlag")]
    pub(crate) network_flag: u8,
}

impl ResolverSettings {
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub(crate) fn parse(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(content)?;
        // Chain ids must be numeric for identity derivation
        settings.identity_networks()?;

        Ok(settings)
    }

    fn networks(&self) -> impl Iterator<Item = (&str, &str, &NetworkSettings)> {
        self.0.iter().flat_map(|(blockchain, networks)| {
            networks
                .iter()
                .map(move |(network, settings)| (blockchain.as_str(), network.as_str(), settings))
        })
    }

    /// Chain id to the DID requests are sent from.
    pub(crate) fn sender_dids(&self) -> HashMap<String, String> {
        self.networks()
            .map(|(_, _, settings)| (settings.chain_id.clone(), settings.did.clone()))
            .collect()
    }

    /// Chain ids in ascending numeric order.
    pub(crate) fn supported_chain_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .networks()
            .map(|(_, _, settings)| settings.chain_id.clone())
            .collect();
        ids.sort_by_key(|id| id.parse::<i64>().unwrap_or(i64::MAX));
        ids.dedup();

        ids
    }

    pub(crate) fn identity_networks(&self) -> Result<HashMap<i64, IdentityNetwork>, ConfigError> {
        self.networks()
            .map(|(blockchain, network, settings)| {
                let chain_id =
                    settings
                        .chain_id
                        .parse::<i64>()
                        .map_err(|_| ConfigError::InvalidChainId {
                            blockchain: blockchain.to_owned(),
                            network: network.to_owned(),
                            chain_id: settings.chain_id.clone(),
                        })?;

                Ok((
                    chain_id,
                    IdentityNetwork {
                        blockchain: blockchain.to_owned(),
                        network: network.to_owned(),
                        network_flag: settings.network_flag,
                    },
                ))
            })
            .collect()
    }
}
