//! deckhandd - Deckhand demo service daemon.

use std::sync::Arc;

use clap::Parser;
use deckhand_events::{
    Attributes, EventPublisher, HeartbeatEmitter, Level, MetricsProvider, attributes,
};
use deckhandd::{AppState, Args, EcsMetadataProvider, SysinfoMetrics, api};
use serde_json::json;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let config = args.server_config()?;
    let publisher = EventPublisher::new(args.events_config())?;

    let metrics: Arc<dyn MetricsProvider> = Arc::new(SysinfoMetrics::new());
    let metadata = Arc::new(EcsMetadataProvider::from_env(config.metadata_timeout));
    let state = AppState::new(config.clone(), publisher.clone(), Arc::clone(&metrics), metadata);

    let heartbeat = HeartbeatEmitter::new(publisher.clone(), metrics).spawn();

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, service = %config.service_name, "HTTP server listening");

    publisher.record(
        Level::Info,
        "service started",
        attributes([
            ("port", json!(config.addr.port())),
            ("version", json!(env!("CARGO_PKG_VERSION"))),
        ]),
    );

    axum::serve(listener, api::server::app(state))
        .with_graceful_shutdown(shutdown_signal(publisher))
        .await?;

    heartbeat.abort();
    tracing::info!("deckhandd stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

/// Resolve on Ctrl-C or SIGTERM, then end every live stream so the server
/// can finish draining connections.
async fn shutdown_signal(publisher: EventPublisher) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown requested");
    publisher.record(Level::Warn, "service stopping", Attributes::new());
    publisher.disconnect_all();
}
