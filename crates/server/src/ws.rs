use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use engine::{ConnectionHandler, MessageSink};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tracing::debug;

use crate::AppState;

struct WsSink {
    sender: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl MessageSink for WsSink {
    async fn send_text(&mut self, text: String) -> anyhow::Result<()> {
        self.sender.send(Message::Text(text)).await?;
        Ok(())
    }
}

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.max_message_size(state.settings.max_message_bytes)
        .on_upgrade(move |socket| ws_connection(state, socket))
}

/// One task per socket. Frames are handled strictly one after another, so
/// every render reflects all earlier messages from this client.
async fn ws_connection(state: AppState, socket: WebSocket) {
    let (sender, mut receiver) = socket.split();
    let mut handler = ConnectionHandler::open(state.engine.clone(), WsSink { sender });

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let outcome = handler.handle_text(&text).await;
                debug!(connection = %handler.connection(), ?outcome, "frame handled");
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                debug!(connection = %handler.connection(), "ignoring binary frame");
            }
            Ok(_) => {}
            Err(error) => {
                debug!(connection = %handler.connection(), %error, "socket read failed");
                break;
            }
        }
    }

    handler.close();
}
