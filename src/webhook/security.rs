//! Signature verification for incoming webhook deliveries
//!
//! Meta signs every webhook payload with HMAC-SHA256 keyed by the app secret
//! and sends the result in the `X-Hub-Signature-256` header as
//! `sha256=<hex_signature>`.
//!
//! # Important Notes
//!
//! - The signature MUST be computed on the raw request body bytes, not on
//!   parsed or re-serialized JSON
//! - The digest comparison is constant-time
//! - Every malformed input fails closed (`false`), nothing here panics

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm label expected on the left side of the signature header.
pub const SIGNATURE_ALGORITHM: &str = "sha256";

/// Verifies a `X-Hub-Signature-256` header value against the raw request body.
///
/// # Arguments
///
/// * `payload` - The raw request body bytes, exactly as received
/// * `signature_header` - The header value (e.g., "sha256=abc123...")
/// * `app_secret` - The app secret shared with the provider
///
/// # Returns
///
/// * `true` if the signature was produced with `app_secret` over `payload`
/// * `false` for a wrong signature or any malformed input: empty header,
///   header that does not split on `=` into exactly two parts, algorithm
///   other than `sha256`, non-hex digest, digest of the wrong length, or an
///   empty secret
///
/// # Example
///
/// ```
/// use wacloud::webhook::security::{sign_payload, validate_signature};
///
/// let payload = br#"{"object":"whatsapp_business_account"}"#;
/// let header = sign_payload(payload, b"app-secret").unwrap();
///
/// assert!(validate_signature(payload, &header, b"app-secret"));
/// assert!(!validate_signature(payload, &header, b"other-secret"));
/// ```
pub fn validate_signature(payload: &[u8], signature_header: &str, app_secret: &[u8]) -> bool {
    if signature_header.is_empty() {
        logfire::warn!("Missing webhook signature header");
        return false;
    }

    if app_secret.is_empty() {
        logfire::error!("Webhook app secret is empty, refusing to verify");
        return false;
    }

    let parts: Vec<&str> = signature_header.split('=').collect();
    let &[algorithm, signature_hex] = parts.as_slice() else {
        logfire::warn!("Invalid signature header format: expected '<algorithm>=<hex>'");
        return false;
    };

    if algorithm != SIGNATURE_ALGORITHM {
        logfire::warn!(
            "Unsupported signature algorithm: {algorithm}",
            algorithm = algorithm.to_string()
        );
        return false;
    }

    let received_signature = match hex::decode(signature_hex) {
        Ok(sig) => sig,
        Err(e) => {
            logfire::warn!(
                "Failed to decode signature hex: {error}",
                error = e.to_string()
            );
            return false;
        }
    };

    let computed_signature = match compute_signature(payload, app_secret) {
        Ok(sig) => sig,
        Err(e) => {
            logfire::error!(
                "Failed to create HMAC instance: {error}",
                error = e.to_string()
            );
            return false;
        }
    };

    // digest length is public, the content is not
    if computed_signature.len() != received_signature.len() {
        logfire::warn!("Webhook signature has an unexpected length");
        return false;
    }

    let is_valid: bool = computed_signature
        .as_slice()
        .ct_eq(received_signature.as_slice())
        .into();

    if !is_valid {
        logfire::warn!("Webhook signature verification failed: signatures do not match");
    }

    is_valid
}

/// Renders the header value the provider would send for `payload`:
/// `sha256=<lowercase hex HMAC-SHA256>`.
///
/// Returns `None` only if the HMAC instance cannot be keyed.
pub fn sign_payload(payload: &[u8], app_secret: &[u8]) -> Option<String> {
    let signature = compute_signature(payload, app_secret).ok()?;
    Some(format!("{SIGNATURE_ALGORITHM}={}", hex::encode(signature)))
}

fn compute_signature(
    payload: &[u8],
    app_secret: &[u8],
) -> Result<Vec<u8>, hmac::digest::InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(app_secret)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}
