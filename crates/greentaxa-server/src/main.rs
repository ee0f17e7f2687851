// SPDX-License-Identifier: Apache-2.0
#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;

use greentaxa_server::{
    build_router, AppState, ServerConfig, CRATE_NAME, DEFAULT_BIND_ADDR, DEFAULT_BODY_LIMIT_BYTES,
    DEFAULT_DB_PATH,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("GREENTAXA_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn config_from_env() -> Result<ServerConfig, String> {
    let db_path = PathBuf::from(
        env::var("GREENTAXA_DB").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
    );
    let bind_addr =
        env::var("GREENTAXA_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let body_limit_bytes = match env::var("GREENTAXA_BODY_LIMIT_BYTES") {
        Ok(raw) => raw
            .parse::<usize>()
            .map_err(|e| format!("invalid GREENTAXA_BODY_LIMIT_BYTES {raw}: {e}"))?,
        Err(_) => DEFAULT_BODY_LIMIT_BYTES,
    };
    Ok(ServerConfig {
        db_path,
        bind_addr,
        body_limit_bytes,
    })
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let config = config_from_env()?;
    config.validate()?;
    if !config.db_path.exists() {
        warn!(
            db = %config.db_path.display(),
            "catalog database not found; requests will fail until it exists"
        );
    }

    let bind_addr = config.bind_addr.clone();
    let app = build_router(AppState::new(config));
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!("{CRATE_NAME} listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
