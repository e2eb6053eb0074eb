use derive_more::{Display, Error};
use ntex::{http, web};

/// Rejections returned by the webhook endpoints. None of them echo request
/// data back to the caller.
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// Signature header missing or not matching the body
    #[display("invalid webhook signature")]
    Unauthorized,
    /// Handshake with the wrong mode or token
    #[display("webhook verification failed")]
    Forbidden,
    /// Authentic body that is not a valid envelope
    #[display("invalid webhook payload")]
    InvalidPayload,
}

impl web::error::WebResponseError for WebhookError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        web::HttpResponse::build(self.status_code())
            .set_header("content-type", "text/plain; charset=utf-8")
            .body(self.to_string())
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            WebhookError::Unauthorized => http::StatusCode::UNAUTHORIZED,
            WebhookError::Forbidden => http::StatusCode::FORBIDDEN,
            WebhookError::InvalidPayload => http::StatusCode::BAD_REQUEST,
        }
    }
}
