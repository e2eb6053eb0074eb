//! QR codes with a prefilled message: `/{phone_number_id}/message_qrdls`

use super::{ApiResult, SuccessResponse, WhatsAppClient};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QrImageFormat {
    Png,
    Svg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCode {
    pub code: String,
    pub prefilled_message: String,
    pub deep_link_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_image_url: Option<String>,
}

impl WhatsAppClient {
    pub async fn create_qr_code(
        &self,
        prefilled_message: &str,
        image_format: QrImageFormat,
    ) -> ApiResult<QrCode> {
        let body = serde_json::json!({
            "prefilled_message": prefilled_message,
            "generate_qr_image": image_format,
        });
        self.post_json(&self.phone_path("message_qrdls"), &body)
            .await
    }

    pub async fn list_qr_codes(&self) -> ApiResult<serde_json::Value> {
        self.get_json(&self.phone_path("message_qrdls"), &[]).await
    }

    pub async fn get_qr_code(&self, code: &str) -> ApiResult<serde_json::Value> {
        self.get_json(&self.phone_path(&format!("message_qrdls/{code}")), &[])
            .await
    }

    /// Replaces the prefilled message of an existing code
    pub async fn update_qr_code(&self, code: &str, prefilled_message: &str) -> ApiResult<QrCode> {
        let body = serde_json::json!({
            "code": code,
            "prefilled_message": prefilled_message,
        });
        self.post_json(&self.phone_path("message_qrdls"), &body)
            .await
    }

    pub async fn delete_qr_code(&self, code: &str) -> ApiResult<SuccessResponse> {
        self.delete_json(&self.phone_path(&format!("message_qrdls/{code}")), &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_format_serialization() {
        assert_eq!(serde_json::to_value(QrImageFormat::Svg).unwrap(), "SVG");
    }
}
