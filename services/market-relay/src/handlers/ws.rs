use crate::state::AppState;
use crate::subscriptions::{Outbox, OUTBOX_CAPACITY};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use types::ids::ConnectionId;
use types::stream::{parse_client_message, ClientMessage, ServerMessage};

/// How long a closing connection may take to flush queued frames.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (outbox, mut rx) = mpsc::channel::<String>(OUTBOX_CAPACITY);
    let id = state.subscriptions.register(outbox.clone());
    tracing::debug!(connection = %id, "websocket connected");

    // Single writer: replies and broadcast ticks share one ordered queue.
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    });

    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    handle_text(&state, id, &outbox, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            _ = state.shutdown.clone().wait() => break,
        }
    }

    // Dropping the registry's and our sender lets the writer drain and close.
    state.subscriptions.disconnect(id);
    drop(outbox);
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
        tracing::debug!(connection = %id, "writer did not drain in time");
    }
    tracing::debug!(connection = %id, "websocket closed");
}

async fn handle_text(state: &AppState, id: ConnectionId, outbox: &Outbox, text: &str) {
    let Some(ClientMessage::Subscribe { pool }) = parse_client_message(text) else {
        tracing::debug!(connection = %id, "ignoring malformed client message");
        return;
    };

    // Acknowledge before registering so the reply precedes the first tick.
    let reply = ServerMessage::Subscribed { pool: pool.clone() };
    match serde_json::to_string(&reply) {
        Ok(frame) => {
            if outbox.send(frame).await.is_err() {
                return;
            }
        }
        Err(e) => {
            tracing::warn!(connection = %id, error = %e, "failed to encode subscribe reply");
            return;
        }
    }

    let previous = state.subscriptions.subscribe(id, pool.clone());
    tracing::info!(connection = %id, %pool, ?previous, "subscribed");
}
