use axum::{
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;

pub(crate) fn routes() -> Router {
    Router::new() //
        .route("/", get(index))
        .route("/health", get(health))
}

async fn index() -> impl IntoResponse {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <title>{name}</title>
    </head>
    <body>
        <h1>{name} v{version}</h1>
        <p>{description}</p>
        <ul>
            <li><code>POST /sign-in</code></li>
            <li><code>GET /qr-store?id=</code></li>
            <li><code>POST /callback?sessionID=</code></li>
            <li><code>GET /status?sessionID=</code></li>
        </ul>
    </body>
</html>"#,
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        description = env!("CARGO_PKG_DESCRIPTION"),
    ))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "healthy": true }))
}
