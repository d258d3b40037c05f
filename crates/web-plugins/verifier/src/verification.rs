use crate::model::{AuthorizationResponse, RequestMessage};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// The token was checked and refused
    #[error("{0}")]
    Rejected(String),
    #[error("verifier unavailable: {0}")]
    Unavailable(String),
    #[error("malformed verifier response: {0}")]
    Malformed(String),
}

/// Full check of a signed response token against the request it answers:
/// signature, zero-knowledge proofs and issuer state freshness.
#[async_trait]
pub trait ProofVerifier: Send + Sync {
    async fn full_verify(
        &self,
        token: &str,
        request: &RequestMessage,
        accepted_state_transition_delay: Duration,
    ) -> Result<AuthorizationResponse, VerificationError>;
}

#[derive(Serialize)]
struct VerifyPayload<'a> {
    token: &'a str,
    request: &'a RequestMessage,
    /// Milliseconds
    #[serde(rename = "acceptedStateTransitionDelay")]
    accepted_state_transition_delay: u64,
}

#[derive(Deserialize)]
struct VerifierFailure {
    message: String,
}

/// Delegates verification to a remote service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProofVerifier {
    client: Client,
    endpoint: Url,
}

impl HttpProofVerifier {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, VerificationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| VerificationError::Unavailable(err.to_string()))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ProofVerifier for HttpProofVerifier {
    async fn full_verify(
        &self,
        token: &str,
        request: &RequestMessage,
        accepted_state_transition_delay: Duration,
    ) -> Result<AuthorizationResponse, VerificationError> {
        let payload = VerifyPayload {
            token,
            request,
            accepted_state_transition_delay: millis(accepted_state_transition_delay),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|err| VerificationError::Unavailable(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<AuthorizationResponse>()
                .await
                .map_err(|err| VerificationError::Malformed(err.to_string()));
        }

        let body = response
            .text()
            .await
            .map_err(|err| VerificationError::Unavailable(err.to_string()))?;

        Err(failure(status, &body))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn failure(status: StatusCode, body: &str) -> VerificationError {
    let message = serde_json::from_str::<VerifierFailure>(body)
        .map(|failure| failure.message)
        .unwrap_or_else(|_| format!("{status}: {body}"));

    if status.is_client_error() {
        VerificationError::Rejected(message)
    } else {
        VerificationError::Unavailable(message)
    }
}
