//! Message routes: the chat webhook (form in, XML out) and the JSON chat
//! API. Both run the same pipeline; only the envelope differs.

use assistant::{AssistantError, Channel, EncodedReply, format_reply};
use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;

use crate::{
    AppState,
    error::{ApiError, INTERNAL_ERROR, INVALID_MESSAGE},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/assistant", post(webhook_message))
        .route("/assistant/chat", post(chat_message))
}

/// Webhook form payload (Twilio convention: `Body` and `From`).
#[derive(Debug, Deserialize)]
pub struct WebhookMessage {
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub message: String,
    pub user_phone: Option<String>,
}

fn xml_response(status: StatusCode, text: &str) -> Response {
    let xml = match format_reply(text, Channel::WebhookForm) {
        EncodedReply::Xml(xml) => xml,
        EncodedReply::Json(_) => unreachable!("webhook channel always encodes XML"),
    };
    (status, [("Content-Type", "application/xml")], xml).into_response()
}

/// POST /api/assistant
///
/// Every outcome, including failures, stays wrapped in the XML envelope so
/// the chat provider can always render it.
pub async fn webhook_message(
    State(state): State<AppState>,
    Form(form): Form<WebhookMessage>,
) -> Response {
    let sender = form.from.as_deref().unwrap_or("unknown");
    tracing::info!(sender, "incoming webhook message");

    let body = form.body.unwrap_or_default();
    match state.assistant.respond(&body).await {
        Ok(reply) => xml_response(StatusCode::OK, &reply),
        Err(AssistantError::EmptyMessage) => {
            xml_response(StatusCode::BAD_REQUEST, INVALID_MESSAGE)
        }
        Err(err) => {
            tracing::error!("webhook pipeline failed: {err}");
            xml_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        }
    }
}

/// POST /api/assistant/chat
pub async fn chat_message(
    State(state): State<AppState>,
    Json(request): Json<ChatMessage>,
) -> Result<Response, ApiError> {
    if let Some(phone) = &request.user_phone {
        tracing::info!(sender = %phone, "incoming chat message");
    }

    let reply = state.assistant.respond(&request.message).await?;
    match format_reply(&reply, Channel::JsonApi) {
        EncodedReply::Json(body) => Ok(Json(body).into_response()),
        EncodedReply::Xml(_) => unreachable!("json channel always encodes JSON"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assistant::{Assistant, CompletionProvider, ProviderError, SqliteTaskStore};
    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Request, header},
    };
    use db::DBService;
    use tower::ServiceExt;

    use super::*;

    struct FailingProvider;

    #[async_trait]
    impl CompletionProvider for FailingProvider {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
            Err(ProviderError::RequestFailed("quota exceeded".to_string()))
        }

        fn is_configured(&self) -> bool {
            false
        }
    }

    async fn test_app() -> Router {
        let db = DBService::new_in_memory().await.unwrap();
        let store = Arc::new(SqliteTaskStore::new(db.pool.clone()));
        let assistant = Assistant::new(store, Arc::new(FailingProvider));
        crate::routes::router(AppState::new(db, assistant))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/assistant")
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/assistant/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn webhook_replies_with_xml_envelope() {
        let app = test_app().await;
        let response = app
            .oneshot(form_request("Body=hola&From=%2B34600111222"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "application/xml"
        );
        let xml = body_string(response).await;
        assert!(xml.starts_with("<Response><Message>"));
        assert!(xml.contains("asistente de tareas"));
    }

    #[tokio::test]
    async fn webhook_empty_body_is_400_in_xml() {
        let app = test_app().await;
        let response = app.oneshot(form_request("From=%2B34600111222")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let xml = body_string(response).await;
        assert!(xml.starts_with("<Response><Message>"));
        assert!(xml.contains("Mensaje inválido"));
    }

    #[tokio::test]
    async fn chat_returns_reply_json() {
        let app = test_app().await;
        let response = app
            .oneshot(json_request(r#"{"message": "agregar: Comprar pan"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert!(body["reply"].as_str().unwrap().contains("Comprar pan"));
    }

    #[tokio::test]
    async fn chat_empty_message_is_400_with_error_field() {
        let app = test_app().await;
        let response = app.oneshot(json_request(r#"{"message": "  "}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn provider_failure_stays_a_200_fallback() {
        let app = test_app().await;
        let response = app
            .oneshot(json_request(r#"{"message": "que opinas del universo?"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        let reply = body["reply"].as_str().unwrap();
        assert!(reply.contains("comandos") || reply.contains("funcionan"));
        assert!(!reply.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn webhook_escapes_reply_content() {
        let app = test_app().await;
        // Title with XML specials lands escaped inside the envelope.
        let response = app
            .clone()
            .oneshot(form_request("Body=agregar%3A+pan+%26+%3Cqueso%3E"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let xml = body_string(response).await;
        assert!(xml.contains("pan &amp; &lt;queso&gt;"));
        assert!(!xml.contains("<queso>"));
    }
}
