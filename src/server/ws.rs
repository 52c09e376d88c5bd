use crate::concierge::{Concierge, PriorTurn};
use crate::server::chat::{run_turn, success_response, ErrorResponse};
use crate::server::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Exchanges (user message plus reply) remembered per connection.
const MAX_HISTORY_EXCHANGES: usize = 20;

#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(default)]
    message: String,
}

/// Frames may be `{"message": "..."}` or the bare text.
fn frame_message(text: &str) -> String {
    match serde_json::from_str::<Frame>(text) {
        Ok(frame) => frame.message,
        Err(_) => text.to_string(),
    }
}

#[derive(Debug, Default)]
struct ConnectionHistory {
    turns: VecDeque<PriorTurn>,
}

impl ConnectionHistory {
    fn snapshot(&self) -> Vec<PriorTurn> {
        self.turns.iter().cloned().collect()
    }

    fn record(&mut self, user_text: &str, reply: &str) {
        self.turns.push_back(PriorTurn::user(user_text));
        self.turns.push_back(PriorTurn::assistant(reply));
        while self.turns.len() > MAX_HISTORY_EXCHANGES * 2 {
            self.turns.pop_front();
        }
    }
}

pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.concierge))
}

async fn handle_socket(mut socket: WebSocket, concierge: Arc<Concierge>) {
    let connection_id = Uuid::new_v4();
    let mut history = ConnectionHistory::default();
    info!(connection_id = %connection_id, "WebSocket connected");

    while let Some(frame) = socket.recv().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(connection_id = %connection_id, error = %e, "WebSocket receive failed");
                break;
            }
        };

        let payload = respond(&concierge, &mut history, text.as_str()).await;
        if socket.send(Message::Text(payload.into())).await.is_err() {
            break;
        }
    }

    info!(connection_id = %connection_id, "WebSocket disconnected");
}

async fn respond(concierge: &Concierge, history: &mut ConnectionHistory, frame: &str) -> String {
    let message = frame_message(frame);
    let encoded = match run_turn(concierge, &message, history.snapshot()).await {
        Some((message, reply)) => {
            debug!(outcome = ?reply.outcome, iterations = reply.iterations, "WebSocket turn complete");
            history.record(&message, &reply.text);
            serde_json::to_string(&success_response(message, reply))
        }
        None => serde_json::to_string(&ErrorResponse {
            error: "Please provide a message".to_string(),
        }),
    };

    encoded.unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
}
