//! Subscription handshake for webhook registration
//!
//! When a webhook URL is registered, the provider sends a single GET request
//! carrying `hub.mode`, `hub.verify_token` and `hub.challenge`. The endpoint
//! must echo the challenge verbatim with a 200 when the token matches, and
//! answer with a 4xx otherwise.

use serde::Deserialize;

/// The only mode the provider uses for the handshake.
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Query parameters of the verification request. Every field is optional so
/// a partial query still deserializes and is rejected by [`verify_handshake`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct HandshakeQuery {
    /// The mode parameter, should be "subscribe"
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    /// Token configured in the provider dashboard
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    /// The challenge string to echo back
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

impl HandshakeQuery {
    /// Builds the query from any key/value mapping, e.g. an already parsed
    /// query string. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::default(), |mut query, (key, value)| {
                match key.as_ref() {
                    "hub.mode" => query.mode = Some(value.into()),
                    "hub.verify_token" => query.verify_token = Some(value.into()),
                    "hub.challenge" => query.challenge = Some(value.into()),
                    _ => {}
                }
                query
            })
    }
}

/// Checks the handshake and returns the challenge to echo back.
///
/// Returns `Some(challenge)` only when the mode is `"subscribe"` and the
/// supplied token equals `expected_token`. A missing mode, token or
/// challenge, a different mode, or a token mismatch all return `None`, and
/// the caller must reject the request instead of echoing anything.
///
/// The token is compared with plain string equality: this runs once per
/// registration and the token does not authenticate the event stream.
pub fn verify_handshake<'q>(query: &'q HandshakeQuery, expected_token: &str) -> Option<&'q str> {
    if query.mode.as_deref()? != SUBSCRIBE_MODE {
        return None;
    }

    if query.verify_token.as_deref()? != expected_token {
        return None;
    }

    query.challenge.as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(mode: Option<&str>, token: Option<&str>, challenge: Option<&str>) -> HandshakeQuery {
        HandshakeQuery {
            mode: mode.map(Into::into),
            verify_token: token.map(Into::into),
            challenge: challenge.map(Into::into),
        }
    }

    #[test]
    fn test_handshake_query_deserialization() {
        let json = r#"{"hub.mode":"subscribe","hub.verify_token":"test123","hub.challenge":"challenge123"}"#;
        let query: HandshakeQuery = serde_json::from_str(json).unwrap();

        assert_eq!(query.mode.as_deref(), Some("subscribe"));
        assert_eq!(query.verify_token.as_deref(), Some("test123"));
        assert_eq!(query.challenge.as_deref(), Some("challenge123"));
    }

    #[test]
    fn test_handshake_query_partial_deserialization() {
        let query: HandshakeQuery = serde_json::from_str(r#"{"hub.challenge":"c"}"#).unwrap();

        assert_eq!(query, query_with_challenge_only());
    }

    fn query_with_challenge_only() -> HandshakeQuery {
        query(None, None, Some("c"))
    }

    #[test]
    fn test_verify_handshake_success_returns_challenge_verbatim() {
        let q = query(Some("subscribe"), Some("T"), Some("C123"));

        assert_eq!(verify_handshake(&q, "T"), Some("C123"));
    }

    #[test]
    fn test_verify_handshake_wrong_token() {
        let q = query(Some("subscribe"), Some("WRONG"), Some("C123"));

        assert_eq!(verify_handshake(&q, "T"), None);
    }

    #[test]
    fn test_verify_handshake_missing_mode() {
        let q = query(None, Some("T"), Some("C123"));

        assert_eq!(verify_handshake(&q, "T"), None);
    }

    #[test]
    fn test_verify_handshake_unsubscribe_mode() {
        let q = query(Some("unsubscribe"), Some("T"), Some("C123"));

        assert_eq!(verify_handshake(&q, "T"), None);
    }

    #[test]
    fn test_verify_handshake_missing_token() {
        let q = query(Some("subscribe"), None, Some("C123"));

        assert_eq!(verify_handshake(&q, "T"), None);
    }

    #[test]
    fn test_verify_handshake_missing_challenge() {
        let q = query(Some("subscribe"), Some("T"), None);

        assert_eq!(verify_handshake(&q, "T"), None);
    }

    #[test]
    fn test_from_pairs() {
        let q = HandshakeQuery::from_pairs([
            ("hub.mode", "subscribe"),
            ("hub.verify_token", "T"),
            ("hub.challenge", "1158201444"),
            ("utm_source", "ignored"),
        ]);

        assert_eq!(verify_handshake(&q, "T"), Some("1158201444"));
    }
}
