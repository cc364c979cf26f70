/**
 * WebSocket Upgrade Handler
 *
 * `GET /ws` authenticates the caller, upgrades the connection and registers
 * it under the token's subject. Each socket is split in two:
 *
 * - a writer task that owns the sink and drains the connection's outbound
 *   queue, bounding each frame by the write deadline;
 * - the reader loop, which echoes text frames back through the same queue.
 *
 * Either side can end the connection. The writer flips the close signal
 * when the sink fails; the reader stops on client close, read error, end of
 * stream, or the close signal, then removes its own registry entry.
 */

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use crate::backend::auth::Credential;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::connection::{ConnectionHandle, WsConnection};
use crate::backend::realtime::registry::ConnectionId;
use crate::backend::server::state::AppState;

/// GET /ws
///
/// Token via `Authorization: Bearer` or `?token=`; 401 before upgrade when
/// missing or invalid.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    AuthUser(credential): AuthUser,
    ws: WebSocketUpgrade,
) -> Response {
    tracing::info!(user_id = %credential.subject, "WebSocket connection authenticated");
    ws.on_upgrade(move |socket| run_connection(socket, state, credential))
}

async fn run_connection(socket: WebSocket, state: AppState, credential: Credential) {
    let user_id = credential.subject.clone();
    let write_timeout = state.config.write_timeout;
    let (handle, outbound) = WsConnection::channel(state.config.outbound_buffer, write_timeout);

    let (sink, mut stream) = socket.split();
    let connection_id = state.registry.add(user_id.clone(), handle.clone(), credential);

    let mut writer = tokio::spawn(write_frames(
        sink,
        outbound,
        handle.clone(),
        write_timeout,
        connection_id,
    ));

    tracing::info!(user_id = %user_id, connection_id, "WebSocket connection started");

    let mut closed = handle.closed_signal();
    loop {
        tokio::select! {
            _ = wait_closed(&mut closed) => {
                tracing::debug!(user_id = %user_id, connection_id, "Connection closed by server");
                break;
            }
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = handle.send(text.as_str()).await {
                        tracing::warn!(user_id = %user_id, connection_id, error = %e, "Echo failed");
                        break;
                    }
                }
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!(user_id = %user_id, bytes = data.len(), "Ignoring binary frame");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(user_id = %user_id, connection_id, reason = ?frame, "Client initiated close");
                    break;
                }
                Some(Err(e)) => {
                    tracing::warn!(user_id = %user_id, connection_id, error = %e, "WebSocket receive error");
                    break;
                }
                None => {
                    tracing::info!(user_id = %user_id, connection_id, "WebSocket stream ended");
                    break;
                }
            }
        }
    }

    state.registry.remove_if_current(&user_id, connection_id);
    handle.close();

    if timeout(write_timeout, &mut writer).await.is_err() {
        writer.abort();
    }

    tracing::info!(user_id = %user_id, connection_id, "WebSocket connection finished");
}

/// Resolves once the close signal is set or every handle is gone
async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    let _ = closed.wait_for(|closed| *closed).await;
}

async fn write_frames(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<String>,
    handle: WsConnection,
    write_timeout: Duration,
    connection_id: ConnectionId,
) {
    let mut closed = handle.closed_signal();

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(text) = frame else { break };
                match timeout(write_timeout, sink.send(Message::Text(text.into()))).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::warn!(connection_id, error = %e, "WebSocket write failed");
                        break;
                    }
                    Err(_) => {
                        tracing::warn!(connection_id, timeout = ?write_timeout, "WebSocket write timed out");
                        break;
                    }
                }
            }
            _ = wait_closed(&mut closed) => {
                let frame = CloseFrame {
                    code: close_code::NORMAL,
                    reason: "connection closed".into(),
                };
                let _ = timeout(write_timeout, sink.send(Message::Close(Some(frame)))).await;
                break;
            }
        }
    }

    handle.close();
}
