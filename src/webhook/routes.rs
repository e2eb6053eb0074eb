//! Webhook endpoint handlers
//!
//! Implements the verification endpoint (GET) and the delivery receiver
//! (POST).
//!
//! # Security
//!
//! The POST endpoint verifies the `X-Hub-Signature-256` header over the raw
//! body bytes before anything is parsed. Requests without a valid signature
//! are rejected with a 401 and nothing else runs.

use super::{
    WebhookConfig, errors::WebhookError, handler, handler::DispatchMode, handler::EventHandler,
    schemas::Envelope, verification::HandshakeQuery,
};
use crate::{consts, metric};
use ntex::{util::Bytes, web};
use serde::Deserialize;
use std::sync::Arc;
use tracing::Instrument;

/// State shared by the webhook endpoints.
#[derive(Clone)]
pub struct WebhookState {
    pub config: WebhookConfig,
    pub dispatch: DispatchMode,
    pub handler: Arc<dyn EventHandler>,
}

/// Configures the webhook routes.
///
/// # Routes
/// - `GET /webhook` - subscription handshake
/// - `POST /webhook` - delivery receiver
pub fn webhook(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope(consts::WEBHOOK_PATH).service((verify, receive)));
}

/// Webhook verification endpoint (GET)
///
/// # Query Parameters
/// - `hub.mode` - Should be "subscribe"
/// - `hub.verify_token` - Token configured in the provider dashboard
/// - `hub.challenge` - Challenge string to echo back
///
/// # Returns
/// - 200 with the challenge string as plain text if verification succeeds
/// - 403 without the challenge otherwise
#[web::get("")]
pub async fn verify(
    query: web::types::Query<HandshakeQuery>,
    state: web::types::State<WebhookState>,
) -> Result<impl web::Responder, web::Error> {
    let Some(challenge) = state.config.verify_handshake(&query) else {
        logfire::warn!(
            "Webhook verification rejected: mode={mode}",
            mode = query.mode.clone().unwrap_or_default()
        );
        metric::incr_webhook_statds("handshake_rejected");
        return Err(WebhookError::Forbidden.into());
    };

    logfire::info!("Webhook verification successful");
    metric::incr_webhook_statds("handshake_accepted");

    Ok(web::HttpResponse::Ok()
        .content_type("text/plain")
        .body(challenge.to_string()))
}

/// Webhook receiver endpoint (POST)
///
/// # Processing
///
/// 1. the signature header is checked against the raw body (401 on failure)
/// 2. the body must be JSON (400 otherwise); it is read as an [`Envelope`]
///    where null or mistyped links count as absent
/// 3. the events selected by the configured [`DispatchMode`] reach the
///    [`EventHandler`]; handler failures are logged, the delivery is still
///    acknowledged with a 200
#[web::post("")]
pub async fn receive(
    req: web::HttpRequest,
    body: Bytes,
    state: web::types::State<WebhookState>,
) -> Result<web::HttpResponse, web::Error> {
    deliver(&req, &body, &state)
        .instrument(logfire::span!("webhook_delivery"))
        .await
}

async fn deliver(
    req: &web::HttpRequest,
    body: &Bytes,
    state: &WebhookState,
) -> Result<web::HttpResponse, web::Error> {
    let signature = req
        .headers()
        .get(consts::SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !state.config.validate_signature(body, signature) {
        metric::incr_webhook_statds("signature_rejected");
        return Err(WebhookError::Unauthorized.into());
    }

    let payload: serde_json::Value = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            logfire::error!(
                "Failed to parse webhook payload: {error}",
                error = e.to_string()
            );
            metric::incr_webhook_statds("invalid_payload");
            return Err(WebhookError::InvalidPayload.into());
        }
    };

    // Valid JSON of an unexpected shape carries no events
    let envelope = Envelope::deserialize(&payload).unwrap_or_else(|e| {
        logfire::warn!(
            "Webhook payload is not an envelope: {error}",
            error = e.to_string()
        );
        Envelope::default()
    });

    metric::incr_webhook_statds("accepted");

    let handled = handler::process_webhook(&envelope, state.dispatch, state.handler.as_ref()).await;
    tracing::debug!(
        "Handled {handled} events from {entries} entries",
        entries = envelope.entry.len()
    );

    Ok(web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "received"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::{handler::MockEventHandler, security::sign_payload};
    use ntex::{http::StatusCode, web::test};

    const SECRET: &str = "app-secret";
    const TOKEN: &str = "verify-token";

    fn state(handler: MockEventHandler, dispatch: DispatchMode) -> WebhookState {
        WebhookState {
            config: WebhookConfig::new(SECRET, TOKEN),
            dispatch,
            handler: Arc::new(handler),
        }
    }

    fn text_delivery() -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{"id": "1", "changes": [{"field": "messages", "value": {
                "messages": [
                    {"id": "m1", "from": "16505551234", "type": "text", "text": {"body": "hi"}},
                    {"id": "m2", "from": "16505551234", "type": "text", "text": {"body": "there"}}
                ]
            }}]}]
        }))
        .unwrap()
    }

    #[ntex::test]
    async fn test_verify_echoes_challenge() {
        let app = test::init_service(
            web::App::new()
                .state(state(MockEventHandler::new(), DispatchMode::FirstEvent))
                .configure(webhook),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/webhook?hub.mode=subscribe&hub.verify_token=verify-token&hub.challenge=1158201444")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, Bytes::from_static(b"1158201444"));
    }

    #[ntex::test]
    async fn test_verify_rejects_wrong_token() {
        let app = test::init_service(
            web::App::new()
                .state(state(MockEventHandler::new(), DispatchMode::FirstEvent))
                .configure(webhook),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/webhook?hub.mode=subscribe&hub.verify_token=WRONG&hub.challenge=1158201444")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body = test::read_body(resp).await;
        assert!(!String::from_utf8_lossy(&body).contains("1158201444"));
    }

    #[ntex::test]
    async fn test_verify_rejects_missing_mode() {
        let app = test::init_service(
            web::App::new()
                .state(state(MockEventHandler::new(), DispatchMode::FirstEvent))
                .configure(webhook),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/webhook?hub.verify_token=verify-token&hub.challenge=1158201444")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[ntex::test]
    async fn test_receive_dispatches_first_message() {
        let mut handler = MockEventHandler::new();
        handler
            .expect_on_message()
            .withf(|message, _| message.id == "m1")
            .times(1)
            .returning(|_, _| Ok(()));

        let app = test::init_service(
            web::App::new()
                .state(state(handler, DispatchMode::FirstEvent))
                .configure(webhook),
        )
        .await;

        let body = text_delivery();
        let req = test::TestRequest::post()
            .uri("/webhook")
            .header(consts::SIGNATURE_HEADER, sign_payload(&body, SECRET.as_bytes()).unwrap())
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[ntex::test]
    async fn test_receive_dispatches_all_messages() {
        let mut handler = MockEventHandler::new();
        handler
            .expect_on_message()
            .times(2)
            .returning(|_, _| Ok(()));

        let app = test::init_service(
            web::App::new()
                .state(state(handler, DispatchMode::AllEvents))
                .configure(webhook),
        )
        .await;

        let body = text_delivery();
        let req = test::TestRequest::post()
            .uri("/webhook")
            .header(consts::SIGNATURE_HEADER, sign_payload(&body, SECRET.as_bytes()).unwrap())
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[ntex::test]
    async fn test_receive_rejects_bad_signature_before_parsing() {
        let mut handler = MockEventHandler::new();
        handler.expect_on_message().never();
        handler.expect_on_status().never();

        let app = test::init_service(
            web::App::new()
                .state(state(handler, DispatchMode::AllEvents))
                .configure(webhook),
        )
        .await;

        let body = text_delivery();
        let req = test::TestRequest::post()
            .uri("/webhook")
            .header(
                consts::SIGNATURE_HEADER,
                sign_payload(&body, b"someone-else").unwrap(),
            )
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[ntex::test]
    async fn test_receive_rejects_missing_signature() {
        let app = test::init_service(
            web::App::new()
                .state(state(MockEventHandler::new(), DispatchMode::FirstEvent))
                .configure(webhook),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/webhook")
            .set_payload(text_delivery())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[ntex::test]
    async fn test_receive_rejects_signed_garbage() {
        let app = test::init_service(
            web::App::new()
                .state(state(MockEventHandler::new(), DispatchMode::FirstEvent))
                .configure(webhook),
        )
        .await;

        let body = b"not json".to_vec();
        let req = test::TestRequest::post()
            .uri("/webhook")
            .header(consts::SIGNATURE_HEADER, sign_payload(&body, SECRET.as_bytes()).unwrap())
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[ntex::test]
    async fn test_receive_acknowledges_when_handler_fails() {
        let mut handler = MockEventHandler::new();
        handler
            .expect_on_message()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("downstream unavailable")));

        let app = test::init_service(
            web::App::new()
                .state(state(handler, DispatchMode::FirstEvent))
                .configure(webhook),
        )
        .await;

        let body = text_delivery();
        let req = test::TestRequest::post()
            .uri("/webhook")
            .header(consts::SIGNATURE_HEADER, sign_payload(&body, SECRET.as_bytes()).unwrap())
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[ntex::test]
    async fn test_receive_treats_null_messages_as_absent() {
        let mut handler = MockEventHandler::new();
        handler.expect_on_message().never();
        handler
            .expect_on_status()
            .withf(|status, _| status.id == "wamid.s1")
            .times(1)
            .returning(|_, _| Ok(()));

        let app = test::init_service(
            web::App::new()
                .state(state(handler, DispatchMode::FirstEvent))
                .configure(webhook),
        )
        .await;

        let body = serde_json::to_vec(&serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{"id": "1", "changes": [{"field": "messages", "value": {
                "messages": null,
                "statuses": [{"id": "wamid.s1", "status": "delivered", "recipient_id": "16505551234"}]
            }}]}]
        }))
        .unwrap();
        let req = test::TestRequest::post()
            .uri("/webhook")
            .header(consts::SIGNATURE_HEADER, sign_payload(&body, SECRET.as_bytes()).unwrap())
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[ntex::test]
    async fn test_receive_acknowledges_signed_non_envelope_json() {
        let mut handler = MockEventHandler::new();
        handler.expect_on_message().never();
        handler.expect_on_status().never();

        let app = test::init_service(
            web::App::new()
                .state(state(handler, DispatchMode::AllEvents))
                .configure(webhook),
        )
        .await;

        let body = br#"{"entry": null}"#.to_vec();
        let req = test::TestRequest::post()
            .uri("/webhook")
            .header(consts::SIGNATURE_HEADER, sign_payload(&body, SECRET.as_bytes()).unwrap())
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }
}
