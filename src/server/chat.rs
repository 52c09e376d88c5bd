use crate::concierge::{Concierge, PriorTurn, TurnReply};
use crate::server::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<PriorTurn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub user_message: String,
    pub bot_response: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Run one turn for a trimmed, non-empty message.
pub(crate) async fn run_turn(
    concierge: &Concierge,
    message: &str,
    history: Vec<PriorTurn>,
) -> Option<(String, TurnReply)> {
    let message = message.trim();
    if message.is_empty() {
        return None;
    }

    let reply = concierge.handle_turn(message, history).await;
    Some((message.to_string(), reply))
}

pub(crate) fn success_response(message: String, reply: TurnReply) -> ChatResponse {
    ChatResponse {
        user_message: message,
        bot_response: reply.text,
        status: "success".to_string(),
    }
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    match run_turn(&state.concierge, &request.message, request.history).await {
        Some((message, reply)) => Ok(Json(success_response(message, reply))),
        None => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Please provide a message".to_string(),
            }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use crate::server::router;
    use crate::server::test_support::{concierge, DownReasoner, EchoReasoner};
    use crate::server::{ChatResponse, ErrorResponse};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn post_chat(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_chat_success() {
        let app = router(concierge(Arc::new(EchoReasoner), true));

        let response = app.oneshot(post_chat(r#"{"message": "  Hours?  "}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload: ChatResponse = read_json(response).await;
        assert_eq!(payload.user_message, "Hours?");
        assert_eq!(payload.bot_response, "echo: Hours? (0 prior)");
        assert_eq!(payload.status, "success");
    }

    #[tokio::test]
    async fn test_chat_passes_history() {
        let app = router(concierge(Arc::new(EchoReasoner), true));
        let body = r#"{
            "message": "And Sundays?",
            "history": [
                {"speaker": "user", "text": "Hours?"},
                {"speaker": "assistant", "text": "10am to 6pm."}
            ]
        }"#;

        let response = app.oneshot(post_chat(body)).await.unwrap();

        let payload: ChatResponse = read_json(response).await;
        assert_eq!(payload.bot_response, "echo: And Sundays? (2 prior)");
    }

    #[tokio::test]
    async fn test_chat_blank_message_is_bad_request() {
        let app = router(concierge(Arc::new(EchoReasoner), true));

        let response = app.oneshot(post_chat(r#"{"message": "   "}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload: ErrorResponse = read_json(response).await;
        assert_eq!(payload.error, "Please provide a message");
    }

    #[tokio::test]
    async fn test_chat_reasoner_down_still_answers_in_text() {
        let app = router(concierge(Arc::new(DownReasoner), true));

        let response = app.oneshot(post_chat(r#"{"message": "Hi"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload: ChatResponse = read_json(response).await;
        assert_eq!(payload.bot_response, crate::concierge::orchestrator::UNAVAILABLE_REPLY);
    }
}
