use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::guard::Identity;
use crate::error::AppError;
use crate::models::user::Role;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

/// Notification stream. The token is verified during the upgrade and the
/// socket only ever carries events addressed to that identity.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let token = params
        .token
        .ok_or_else(|| AppError::Unauthenticated("missing token".to_string()))?;
    let identity = state.tokens.verify(&token)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.order_events_tx.subscribe();

    info!(user_id = %identity.id, "notification client connected");

    let send_task = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            if event.recipient_id != identity.id && identity.role != Role::Admin {
                continue;
            }

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize order event for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!(user_id = %identity.id, "notification client disconnected");
}
