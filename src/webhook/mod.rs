//! Inbound webhook handling
//!
//! Deliveries are authenticated first and parsed second:
//!
//! 1. [`security::validate_signature`] checks the `X-Hub-Signature-256`
//!    header against the raw body bytes
//! 2. the body is parsed into a [`schemas::Envelope`]
//! 3. [`extract`] pulls the first message / status out of it, or walks all
//!    events
//!
//! The GET handshake used when registering the URL lives in
//! [`verification`]. [`routes`] wires all of it into ntex handlers.
//!
//! ## Submodules
//!
//! - [`security`] - HMAC-SHA256 signature verification
//! - [`verification`] - subscription handshake check
//! - [`schemas`] - data structures of the delivery payload
//! - [`extract`] - first-event extraction and the full event walk
//! - [`handler`] - application callback trait and event dispatch
//! - [`routes`] - HTTP endpoint handlers
//! - [`errors`] - HTTP error responses

pub mod errors;
pub mod extract;
pub mod handler;
pub mod routes;
pub mod schemas;
pub mod security;
pub mod verification;

pub use extract::{Event, events, first_message, first_status};
pub use handler::{DispatchMode, EventHandler};
pub use schemas::{Envelope, Message, Status};
pub use verification::HandshakeQuery;

/// Credentials for one webhook endpoint.
///
/// Passed by reference into the verifier and the handshake check, so several
/// endpoints with their own secrets can live in one process.
#[derive(Clone)]
pub struct WebhookConfig {
    /// 🔒 SENSITIVE: app secret used as the HMAC key
    pub app_secret: String,
    /// 🔒 SENSITIVE: token registered in the provider dashboard
    pub verify_token: String,
}

impl WebhookConfig {
    pub fn new(app_secret: impl Into<String>, verify_token: impl Into<String>) -> Self {
        Self {
            app_secret: app_secret.into(),
            verify_token: verify_token.into(),
        }
    }

    /// See [`security::validate_signature`].
    pub fn validate_signature(&self, payload: &[u8], signature_header: &str) -> bool {
        security::validate_signature(payload, signature_header, self.app_secret.as_bytes())
    }

    /// See [`verification::verify_handshake`].
    pub fn verify_handshake<'q>(&self, query: &'q HandshakeQuery) -> Option<&'q str> {
        verification::verify_handshake(query, &self.verify_token)
    }
}

// Never print the secrets
impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("app_secret", &"***")
            .field("verify_token", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_with_different_secrets() {
        let tenant_a = WebhookConfig::new("secret-a", "token-a");
        let tenant_b = WebhookConfig::new("secret-b", "token-b");
        let payload = br#"{"object":"whatsapp_business_account","entry":[]}"#;
        let header = security::sign_payload(payload, b"secret-a").unwrap();

        assert!(tenant_a.validate_signature(payload, &header));
        assert!(!tenant_b.validate_signature(payload, &header));
    }

    #[test]
    fn test_config_handshake() {
        let config = WebhookConfig::new("secret", "T");
        let query = HandshakeQuery::from_pairs([
            ("hub.mode", "subscribe"),
            ("hub.verify_token", "T"),
            ("hub.challenge", "C123"),
        ]);

        assert_eq!(config.verify_handshake(&query), Some("C123"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let rendered = format!("{:?}", WebhookConfig::new("very-secret", "my-token"));

        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("my-token"));
    }
}
