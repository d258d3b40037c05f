use crate::{
    error::SessionError,
    lifecycle::SessionController,
    model::{ProofRequestSpec, RequestMessage, SignInResponse, StatusResponse},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection, StringRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub(crate) struct QrStoreParams {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionParams {
    #[serde(rename = "sessionID")]
    session_id: Uuid,
}

pub(crate) async fn sign_in(
    State(state): State<Arc<SessionController>>,
    payload: Result<Json<ProofRequestSpec>, JsonRejection>,
) -> Result<Json<SignInResponse>, SessionError> {
    let Json(spec) = payload.map_err(|rejection| {
        tracing::warn!("unreadable sign-in request: {rejection}");
        SessionError::MalformedRequest(rejection.body_text())
    })?;

    state.initiate(&spec).map(Json)
}

pub(crate) async fn qr_store(
    State(state): State<Arc<SessionController>>,
    params: Result<Query<QrStoreParams>, QueryRejection>,
) -> Result<Json<RequestMessage>, SessionError> {
    let Query(params) = params.map_err(malformed_query)?;

    state.fetch_payload(&params.id).map(Json)
}

/// Receives the signed response token posted by a wallet.
pub(crate) async fn callback(
    State(state): State<Arc<SessionController>>,
    params: Result<Query<SessionParams>, QueryRejection>,
    token: Result<String, StringRejection>,
) -> Result<StatusCode, SessionError> {
    let Query(params) = params.map_err(malformed_query)?;
    let token = token.map_err(|rejection| {
        tracing::warn!("unreadable callback token: {rejection}");
        SessionError::MalformedRequest(rejection.body_text())
    })?;

    state.callback(&params.session_id, token).await?;
    Ok(StatusCode::OK)
}

pub(crate) async fn status(
    State(state): State<Arc<SessionController>>,
    params: Result<Query<SessionParams>, QueryRejection>,
) -> Result<Json<StatusResponse>, SessionError> {
    let Query(params) = params.map_err(malformed_query)?;

    state.status(&params.session_id).map(Json)
}

fn malformed_query(rejection: QueryRejection) -> SessionError {
    SessionError::MalformedRequest(rejection.body_text())
}
