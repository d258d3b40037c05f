use dotenv_flow::dotenv_flow;
use eyre::{Context, Result};
use std::net::SocketAddr;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use verifier_gateway::app;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load dotenv-flow variables
    dotenv_flow().ok();

    // Enable logging
    config_tracing();

    // Start server
    let port = std::env::var("SERVER_LOCAL_PORT").unwrap_or("3000".to_owned());
    let addr: SocketAddr = format!("0.0.0.0:{port}")
        .parse()
        .wrap_err("invalid SERVER_LOCAL_PORT")?;

    tracing::info!("listening on {addr}");
    generic_server_with_graceful_shutdown(addr).await
}

async fn generic_server_with_graceful_shutdown(addr: SocketAddr) -> Result<()> {
    // Load plugins
    let (mut plugin_container, router) = app()?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("cannot bind {addr}"))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down gracefully");
        })
        .await
        .wrap_err("server error")?;

    plugin_container.unload().map_err(|e| eyre::eyre!(e))?;

    Ok(())
}

fn config_tracing() {
    let filter = filter::Targets::new()
        .with_target("hyper::proto", tracing::Level::INFO)
        .with_target("tower_http::trace", tracing::Level::DEBUG)
        .with_default(tracing::Level::DEBUG);

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
