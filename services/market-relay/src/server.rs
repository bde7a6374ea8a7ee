//! Listener wiring and process lifecycle

use crate::broadcaster::TickBroadcaster;
use crate::config::RelayConfig;
use crate::router::{create_router, create_ws_router};
use crate::shutdown::Shutdown;
use crate::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve the HTTP API on an already bound listener until shutdown.
pub async fn serve_http(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown.wait())
        .await
}

/// Serve the WebSocket endpoint on an already bound listener until shutdown.
pub async fn serve_ws(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    axum::serve(listener, create_ws_router(state))
        .with_graceful_shutdown(shutdown.wait())
        .await
}

async fn ctrl_c(shutdown: Shutdown) {
    tokio::select! {
        res = tokio::signal::ctrl_c() => match res {
            Ok(()) => tracing::info!("Shutdown signal received, stopping"),
            Err(e) => {
                tracing::error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        },
        _ = shutdown.wait() => {}
    }
}

/// Bind both listeners, start the broadcaster and run until Ctrl+C.
pub async fn run(config: RelayConfig) -> anyhow::Result<()> {
    let (trigger, shutdown) = crate::shutdown::channel();
    let trigger = Arc::new(trigger);
    let state = AppState::from_config(config.clone(), shutdown.clone())?;

    let http_listener = TcpListener::bind(config.http_addr()).await?;
    tracing::info!("HTTP listening on {}", http_listener.local_addr()?);
    let ws_listener = TcpListener::bind(config.ws_addr()).await?;
    tracing::info!("WS listening on {}", ws_listener.local_addr()?);

    let broadcaster = tokio::spawn(TickBroadcaster::from_state(&state).run(shutdown.clone()));

    tokio::spawn({
        let trigger = Arc::clone(&trigger);
        let shutdown = shutdown.clone();
        async move {
            ctrl_c(shutdown).await;
            trigger.trigger();
        }
    });

    let served = tokio::try_join!(
        serve_http(http_listener, state.clone()),
        serve_ws(ws_listener, state),
    );

    // A listener failing takes the rest of the process down with it.
    trigger.trigger();
    if let Err(e) = broadcaster.await {
        tracing::warn!(error = %e, "broadcaster task ended abnormally");
    }
    served?;

    tracing::info!("market relay stopped");
    Ok(())
}
