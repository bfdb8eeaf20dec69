use crate::error::AppError;
use crate::utils::jwt::decode_jwt;
use crate::websocket::hub::NotificationHub;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, WebSocketUpgrade,
    },
    response::IntoResponse,
    Extension,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// GET /ws?token=... upgrades to a socket that receives the caller's
/// notifications as JSON text frames.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    Extension(hub): Extension<NotificationHub>,
) -> Result<impl IntoResponse, AppError> {
    let claims = decode_jwt(&query.token).map_err(|_| AppError::Unauthorized)?;
    let user_id = claims.user_id().ok_or(AppError::Unauthorized)?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, user_id, hub)))
}

async fn handle_socket(socket: WebSocket, user_id: i32, hub: NotificationHub) {
    let (mut outgoing, mut incoming) = socket.split();
    let subscription = hub.subscribe(user_id);
    let conn_id = subscription.id;
    let mut inbox = subscription.inbox;

    tracing::info!(user_id, conn_id, "websocket connected");

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = inbox.recv().await {
            if outgoing.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = incoming.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.unsubscribe(user_id, conn_id);
    tracing::info!(user_id, conn_id, "websocket disconnected");
}
