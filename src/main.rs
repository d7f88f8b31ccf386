use std::future::IntoFuture;
use std::sync::Arc;

use identity_hub::adapters::inbound::rpc::RpcUserService;
use identity_hub::config::Configuration;
use identity_hub::{app, initialize_state, telemetry};
use tokio::sync::watch;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let (config, fallback) = match Configuration::load() {
        Ok(config) => (config, None),
        Err(err) => (Arc::new(Configuration::default()), Some(err)),
    };
    let guard = telemetry::setup_tracing(&config.telemetry)?;
    if let Some(err) = fallback {
        tracing::error!(error = %err, "configuration file not loaded, using defaults");
    }

    let metrics = if config.telemetry.metrics {
        Some(telemetry::setup_metrics_recorder()?)
    } else {
        None
    };

    let state = initialize_state(&config, metrics).await?;
    let rpc = RpcUserService::new(state.usecase.clone()).into_server();

    // Both servers stop on the same signal.
    let (tx, rx) = watch::channel(());
    let mut http_rx = rx.clone();
    let mut rpc_rx = rx;

    let listener = tokio::net::TcpListener::bind(config.http.socket()).await?;
    tracing::info!(address = %config.http.socket(), "http server listening");
    let http = axum::serve(listener, app(state))
        .with_graceful_shutdown(async move {
            let _ = http_rx.changed().await;
        })
        .into_future();

    tracing::info!(address = %config.rpc.socket(), "grpc server listening");
    let grpc = tonic::transport::Server::builder()
        .trace_fn(|request| tracing::info_span!("grpc", path = %request.uri().path()))
        .add_service(rpc)
        .serve_with_shutdown(config.rpc.socket(), async move {
            let _ = rpc_rx.changed().await;
        });

    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = tx.send(());
    });

    let (http, grpc) = tokio::join!(http, grpc);
    http?;
    grpc?;

    guard.shutdown();
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received, starting graceful shutdown");
}
