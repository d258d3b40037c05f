use crate::{
    builder::{RequestBuilder, SenderResolver},
    constants::{
        AUTHORIZATION_REQUEST_MESSAGE_TYPE, IDEN3COMM_SCHEME, QR_STORE_PATH,
        STATE_TRANSITION_DELAY,
    },
    error::SessionError,
    identity::ContractIdentity,
    model::{
        ProofRequestSpec, RequestMessage, SessionState, SignInResponse, StatusResponse,
        VerificationResult,
    },
    signals,
    store::{QrCodeStore, SessionStore},
    validator::{self, RequestMode, ValidationRules},
    verification::ProofVerifier,
};
use std::sync::Arc;
use uuid::Uuid;

/// External services a controller relies on.
#[derive(Clone)]
pub struct Collaborators {
    pub senders: Arc<dyn SenderResolver>,
    pub contracts: Arc<dyn ContractIdentity>,
    pub verifier: Arc<dyn ProofVerifier>,
}

/// Drives sessions through `Pending -> {Verified | Error}`.
pub struct SessionController {
    host: String,
    rules: ValidationRules,
    collaborators: Collaborators,
    sessions: SessionStore,
    qr_codes: QrCodeStore,
}

impl SessionController {
    /// `host` is the public base URL, without trailing slash.
    pub fn new(
        host: impl Into<String>,
        rules: ValidationRules,
        collaborators: Collaborators,
        sessions: SessionStore,
        qr_codes: QrCodeStore,
    ) -> Self {
        Self {
            host: host.into(),
            rules,
            collaborators,
            sessions,
            qr_codes,
        }
    }

    /// Opens a session for a proof request. Nothing is stored when the
    /// request is rejected.
    pub fn initiate(&self, spec: &ProofRequestSpec) -> Result<SignInResponse, SessionError> {
        let mode = RequestMode::of(spec);
        if let Err(err) = validator::validate(spec, mode, &self.rules) {
            tracing::warn!("rejected proof request: {err}");
            return Err(err.into());
        }

        let session_id = Uuid::new_v4();
        let builder = RequestBuilder::new(
            &self.host,
            self.collaborators.senders.as_ref(),
            self.collaborators.contracts.as_ref(),
        );
        let message = builder.build(spec, mode, &session_id).map_err(|err| {
            tracing::warn!("could not build request message: {err}");
            err
        })?;

        self.sessions
            .create(&session_id, SessionState::Pending(message.clone()));
        let qr_id = self.qr_codes.save(message);

        tracing::info!(%session_id, ?mode, "session created");

        Ok(SignInResponse {
            qr_code: format!(
                "{IDEN3COMM_SCHEME}://?request_uri={}{QR_STORE_PATH}?id={qr_id}",
                self.host
            ),
            session_id,
        })
    }

    pub fn fetch_payload(&self, id: &Uuid) -> Result<RequestMessage, SessionError> {
        self.qr_codes.get(id).ok_or_else(|| {
            tracing::error!(%id, "qr code payload not found");
            SessionError::QrCodeNotFound(*id)
        })
    }

    /// Verifies the token a prover posted for a pending session and records
    /// the outcome.
    pub async fn callback(&self, session_id: &Uuid, token: String) -> Result<(), SessionError> {
        let request = match self.sessions.get(session_id) {
            Some(SessionState::Pending(request))
                if request.type_ == AUTHORIZATION_REQUEST_MESSAGE_TYPE =>
            {
                request
            }
            Some(SessionState::Pending(request)) => {
                // Contract invoke requests are answered on chain
                tracing::warn!(%session_id, kind = %request.type_, "callback on a non authorization request");
                return Err(SessionError::NotAnAuthorizationRequest);
            }
            Some(_) => {
                tracing::warn!(%session_id, "callback on a completed session");
                return Err(SessionError::SessionNotPending);
            }
            None => {
                tracing::error!(%session_id, "callback for unknown session");
                return Err(SessionError::UnknownCallbackSession);
            }
        };

        let response = self
            .collaborators
            .verifier
            .full_verify(&token, &request, STATE_TRANSITION_DELAY)
            .await
            .map_err(|err| self.fail(session_id, err.into()))?;

        let scopes = signals::verification_artifacts(&response.body.scope)
            .map_err(|err| self.fail(session_id, err.into()))?;

        self.sessions.create(
            session_id,
            SessionState::Verified(VerificationResult {
                jwz: token,
                user_did: response.from,
                scopes,
            }),
        );
        tracing::info!(%session_id, "session verified");

        Ok(())
    }

    pub fn status(&self, session_id: &Uuid) -> Result<StatusResponse, SessionError> {
        self.sessions
            .get(session_id)
            .map(|state| StatusResponse::from(&state))
            .ok_or(SessionError::SessionNotFound)
    }

    fn fail(&self, session_id: &Uuid, err: SessionError) -> SessionError {
        tracing::error!(%session_id, "verification failed: {err}");
        self.sessions
            .create(session_id, SessionState::Error(err.to_string()));
        err
    }
}
