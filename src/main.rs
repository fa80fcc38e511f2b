use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::info;
use wot_calculator::api::{self, AppState};
use wot_calculator::config::{self, ThingConfig};
use wot_calculator::state::ThingState;
use wot_calculator::td;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wot_calculator=info".into()),
        )
        .init();

    // Config file (optional), env overrides, then CLI port override
    let mut config = match std::env::var("WOT_CONFIG") {
        Ok(path) => config::load_config(&path)
            .map_err(|e| anyhow!("failed to load config from {}: {}", path, e))?,
        Err(_) => ThingConfig::default(),
    };
    config.apply_env();
    if let Some(port) = port_arg()? {
        config.port = port;
    }

    info!(
        thing_name = %config.thing_name,
        port = config.port,
        "Starting thing server"
    );

    // The Thing Description is built exactly once; a broken template is
    // fatal before the listener binds
    let template = td::load_template(&config.template_path)
        .map_err(|e| anyhow!("failed to load template from {}: {}", config.template_path, e))?;
    let description = td::build_description(&template, &config)
        .context("failed to build thing description")?;

    let app = api::create_router(
        &config.thing_name,
        AppState {
            description: Arc::new(description),
            state: Arc::new(ThingState::new()),
            encoding: config.encoding,
        },
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(%addr, "ThingIsReady");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Parse an optional `-p <port>` / `--port <port>` argument
fn port_arg() -> Result<Option<u16>> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "-p" || arg == "--port" {
            let value = args.next().context("missing value for --port")?;
            let port = value
                .parse()
                .with_context(|| format!("invalid port {:?}", value))?;
            return Ok(Some(port));
        }
    }
    Ok(None)
}
