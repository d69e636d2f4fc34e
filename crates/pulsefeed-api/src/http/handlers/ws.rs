//! WebSocket handler for the live feed channel.
//!
//! `/ws/feeds` upgrades the connection and registers it with the
//! [`BroadcastHub`](pulsefeed_core::hub::BroadcastHub). A single
//! `tokio::select!` loop multiplexes hub pushes out to the client and
//! control frames back in, so subscribe acknowledgements and feed updates
//! share one writer.
//!
//! Control frames: `subscribe` records a preference and is acknowledged
//! with `subscribed`; `requestUpdate` forces an immediate broadcast cycle.
//! Malformed frames get an in-band `error` reply; the connection stays
//! open. Disconnects (and send failures detected by the hub) remove the
//! connection without touching anyone else.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use pulsefeed_types::live::{ClientCommand, LiveEvent};

use crate::state::AppState;

/// Upgrade an HTTP request to a live feed WebSocket connection.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (connection_id, mut events) = state.hub.register();

    loop {
        tokio::select! {
            // --- Branch 1: hub pushes out to the client ---
            event = events.recv() => {
                match event {
                    Some(event) => {
                        if send_event(&mut ws_sender, &event).await.is_err() {
                            break;
                        }
                    }
                    // The hub dropped this connection (send failure cleanup).
                    None => break,
                }
            }

            // --- Branch 2: control frames from the client ---
            frame = ws_receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        process_command(&text, &connection_id, &state, &mut ws_sender).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(connection = %connection_id, error = %err, "live channel receive error");
                        break;
                    }
                    // Binary, ping, pong frames are handled by the protocol layer.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.hub.unregister(&connection_id);
    tracing::debug!(connection = %connection_id, "live channel closed");
}

async fn send_event(
    ws_sender: &mut SplitSink<WebSocket, Message>,
    event: &LiveEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => ws_sender.send(Message::Text(json.into())).await,
        Err(err) => {
            tracing::warn!(error = %err, "failed to serialize live event");
            Ok(())
        }
    }
}

/// Parse and process a single control frame.
async fn process_command(
    text: &str,
    connection_id: &Uuid,
    state: &AppState,
    ws_sender: &mut SplitSink<WebSocket, Message>,
) {
    let command: ClientCommand = match serde_json::from_str(text) {
        Ok(command) => command,
        Err(err) => {
            tracing::warn!(connection = %connection_id, error = %err, "malformed live channel frame");
            let reply = LiveEvent::Error("Failed to process message".to_string());
            let _ = send_event(ws_sender, &reply).await;
            return;
        }
    };

    match command {
        ClientCommand::Subscribe(prefs) => {
            state.hub.record_subscription(connection_id, prefs.clone());
            let _ = send_event(ws_sender, &LiveEvent::Subscribed(prefs)).await;
        }
        ClientCommand::RequestUpdate => {
            state.hub.push_now().await;
        }
    }
}
