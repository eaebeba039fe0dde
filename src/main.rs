use std::sync::Arc;

use anyhow::Result;
use log::{error, info, warn};
use rentals::{
    config::{self, Config},
    db,
    geocoder::NominatimGeocoder,
    logger::setup_logger,
    web::{start_http_server, AppState},
};
use tokio::{
    signal::{
        ctrl_c,
        unix::{signal, SignalKind},
    },
    sync::broadcast,
};

async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c() => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    setup_logger()?;

    let config: Arc<Config> = Arc::new(config::read_config());
    if config.auth_hmac_secret.is_none() {
        warn!("auth_hmac_secret is not set, bearer tokens are accepted without signature checks");
    }

    let state = AppState {
        repo: db::open_repository(&config)?,
        geocoder: Arc::new(NominatimGeocoder::from_config(&config)?),
        config,
    };

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let mut server_handle = tokio::spawn(start_http_server(state, shutdown_rx));

    // The server only returns early when it failed to start.
    let result = tokio::select! {
        result = &mut server_handle => result,
        _ = shutdown_signal() => {
            let _ = shutdown_tx.send(());
            server_handle.await
        }
    };

    match result {
        Ok(Ok(())) => info!("Server stopped"),
        Ok(Err(err)) => error!("Error: {err:?}"),
        Err(err) => error!("Error: {err:?}"),
    }

    Ok(())
}
