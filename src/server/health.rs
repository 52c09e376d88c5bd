use crate::concierge::Concierge;
use crate::server::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub knowledge: HealthCheck,
    pub reasoning: HealthCheck,
    pub checked_at: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = health_report(&state.concierge);
    let status_code =
        if payload.status == "ready" { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn health_report(concierge: &Concierge) -> HealthResponse {
    let knowledge = knowledge_check(concierge);
    let reasoning = reasoning_check(concierge);
    let ready = knowledge.status == "ready" && reasoning.status == "ready";

    HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        knowledge,
        reasoning,
        checked_at: Utc::now().to_rfc3339(),
    }
}

fn knowledge_check(concierge: &Concierge) -> HealthCheck {
    let document = concierge.knowledge();
    if document.is_empty() {
        HealthCheck {
            status: "degraded",
            detail: format!("knowledge document {} is empty", document.source().display()),
        }
    } else {
        HealthCheck {
            status: "ready",
            detail: format!("{} loaded ({} bytes)", document.source().display(), document.len()),
        }
    }
}

fn reasoning_check(concierge: &Concierge) -> HealthCheck {
    if concierge.reasoning_credential_present() {
        HealthCheck { status: "ready", detail: "reasoning credential configured".to_string() }
    } else {
        HealthCheck { status: "degraded", detail: "reasoning credential missing".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::{concierge, EchoReasoner};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_ready() {
        let state = AppState { concierge: concierge(Arc::new(EchoReasoner), true) };

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.knowledge.status, "ready");
        assert!(payload.knowledge.detail.contains("kb.txt"));
        assert_eq!(payload.reasoning.status, "ready");
        assert!(chrono::DateTime::parse_from_rfc3339(&payload.checked_at).is_ok());
    }

    #[tokio::test]
    async fn test_health_degraded_without_credential() {
        let state = AppState { concierge: concierge(Arc::new(EchoReasoner), false) };

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.knowledge.status, "ready");
        assert_eq!(payload.reasoning.status, "degraded");
    }
}
