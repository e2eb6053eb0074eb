use derive_more::{Display, Error};
use serde::Deserialize;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of an outbound Graph API call. Nothing is retried, the caller
/// decides what to do with it.
#[derive(Debug, Display, Error)]
pub enum ApiError {
    /// The request never got a response (connection, TLS, timeout)
    #[display("request to the WhatsApp API failed: {_0}")]
    Transport(reqwest::Error),
    /// Non-2xx response; `body` is the provider's error body as received
    #[display("WhatsApp API returned error status {status}: {body}")]
    Provider {
        status: u16,
        body: serde_json::Value,
    },
    /// The operation is scoped to a business account and none is configured
    #[display("no WhatsApp business account id configured")]
    MissingBusinessAccount,
    /// Media part rejected before sending (e.g. unparsable MIME type)
    #[display("invalid media: {_0}")]
    InvalidMedia(#[error(not(source))] String),
    /// A request body could not be encoded, or a 2xx body did not have the
    /// expected shape
    #[display("unexpected JSON for the WhatsApp API: {_0}")]
    Json(serde_json::Error),
}

impl ApiError {
    /// HTTP status of a provider error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Provider { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The `error` object of a provider error body, when it has the usual
    /// Graph API shape.
    pub fn graph_error(&self) -> Option<GraphError> {
        let ApiError::Provider { body, .. } = self else {
            return None;
        };

        serde_json::from_value::<GraphErrorBody>(body.clone())
            .ok()
            .map(|b| b.error)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Json(e)
    }
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: GraphError,
}

/// Error object returned by the Graph API, e.g.
/// `{"error": {"message": "...", "type": "OAuthException", "code": 190, ...}}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    pub code: i64,
    #[serde(default)]
    pub error_subcode: Option<i64>,
    #[serde(default)]
    pub error_user_title: Option<String>,
    #[serde(default)]
    pub error_user_msg: Option<String>,
    #[serde(default)]
    pub error_data: Option<serde_json::Value>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}
