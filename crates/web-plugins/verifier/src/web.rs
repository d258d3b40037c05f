pub(crate) mod handler;

use crate::{
    constants::{CALLBACK_PATH, QR_STORE_PATH, SIGN_IN_PATH, STATUS_PATH},
    lifecycle::SessionController,
    web::handler::{callback, qr_store, sign_in, status},
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub(crate) fn routes(state: Arc<SessionController>) -> Router {
    Router::new() //
        .route(SIGN_IN_PATH, post(sign_in))
        .route(QR_STORE_PATH, get(qr_store))
        .route(CALLBACK_PATH, post(callback))
        .route(STATUS_PATH, get(status))
        .with_state(state)
}
