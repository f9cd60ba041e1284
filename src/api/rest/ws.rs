use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::state::AppState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.events_tx.subscribe();

    info!("websocket client connected");

    let send_task = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagging; events dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize store event for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    first_to_finish(send_task, recv_task).await;

    info!("websocket client disconnected");
}

/// Waits for either task, then aborts the other so it releases its half of
/// the socket and its event subscription.
async fn first_to_finish(mut a: JoinHandle<()>, mut b: JoinHandle<()>) {
    let a_finished = tokio::select! {
        _ = &mut a => true,
        _ = &mut b => false,
    };
    let other = if a_finished { b } else { a };
    other.abort();
    let _ = other.await;
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast;

    use super::first_to_finish;

    #[tokio::test]
    async fn unfinished_task_is_aborted_and_drops_its_receiver() {
        let (tx, _rx) = broadcast::channel::<u8>(4);
        let mut subscriber = tx.subscribe();
        assert_eq!(tx.receiver_count(), 2);

        let waiting = tokio::spawn(async move { while subscriber.recv().await.is_ok() {} });
        let done = tokio::spawn(async {});

        first_to_finish(waiting, done).await;

        assert_eq!(tx.receiver_count(), 1);
    }
}
