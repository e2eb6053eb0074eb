//! Business profile, phone numbers, app subscriptions, credit lines and
//! official business account

use super::{ApiResult, SuccessResponse, WhatsAppClient};
use crate::consts::MESSAGING_PRODUCT;
use serde::{Deserialize, Serialize};

const BUSINESS_PROFILE_FIELDS: &str =
    "about,address,description,email,profile_picture_url,websites,vertical";

/// Profile update, unset fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BusinessProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Handle returned by the resumable upload API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websites: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationMethod {
    Sms,
    Voice,
}

/// Credit line allocation created by [`WhatsAppClient::attach_credit_line`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreditAllocation {
    pub allocation_config_id: String,
    pub waba_id: String,
}

impl WhatsAppClient {
    pub async fn get_business_profile(&self) -> ApiResult<serde_json::Value> {
        self.get_json(
            &self.phone_path("whatsapp_business_profile"),
            &[("fields", BUSINESS_PROFILE_FIELDS.to_string())],
        )
        .await
    }

    pub async fn update_business_profile(
        &self,
        profile: &BusinessProfileUpdate,
    ) -> ApiResult<SuccessResponse> {
        let mut body = serde_json::to_value(profile)?;
        body["messaging_product"] = MESSAGING_PRODUCT.into();

        self.post_json(&self.phone_path("whatsapp_business_profile"), &body)
            .await
    }

    /// Phone numbers registered on the business account
    pub async fn list_phone_numbers(&self) -> ApiResult<serde_json::Value> {
        self.get_json(&self.business_path("phone_numbers")?, &[])
            .await
    }

    /// The configured phone number: display number, verified name, quality
    /// rating and throughput
    pub async fn get_phone_number(&self) -> ApiResult<serde_json::Value> {
        self.get_json(&self.phone_path(""), &[]).await
    }

    /// Sends a registration code; `language` is a locale such as "en_US"
    pub async fn request_verification_code(
        &self,
        method: VerificationMethod,
        language: &str,
    ) -> ApiResult<SuccessResponse> {
        let body = serde_json::json!({"code_method": method, "language": language});
        self.post_json(&self.phone_path("request_code"), &body)
            .await
    }

    pub async fn verify_code(&self, code: &str) -> ApiResult<SuccessResponse> {
        self.post_json(
            &self.phone_path("verify_code"),
            &serde_json::json!({"code": code}),
        )
        .await
    }

    /// Registers the phone number for Cloud API use with its six digit
    /// two-step verification `pin`
    pub async fn register_phone_number(&self, pin: &str) -> ApiResult<SuccessResponse> {
        let body = serde_json::json!({"messaging_product": MESSAGING_PRODUCT, "pin": pin});
        self.post_json(&self.phone_path("register"), &body).await
    }

    pub async fn deregister_phone_number(&self) -> ApiResult<SuccessResponse> {
        self.post_json(&self.phone_path("deregister"), &serde_json::json!({}))
            .await
    }

    pub async fn set_two_step_pin(&self, pin: &str) -> ApiResult<SuccessResponse> {
        self.post_json(&self.phone_path(""), &serde_json::json!({"pin": pin}))
            .await
    }

    /// Subscribes the app owning the token to webhooks of the business account
    pub async fn subscribe_app(&self) -> ApiResult<SuccessResponse> {
        self.post_json(
            &self.business_path("subscribed_apps")?,
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn list_subscribed_apps(&self) -> ApiResult<serde_json::Value> {
        self.get_json(&self.business_path("subscribed_apps")?, &[])
            .await
    }

    pub async fn unsubscribe_app(&self) -> ApiResult<SuccessResponse> {
        self.delete_json(&self.business_path("subscribed_apps")?, &[])
            .await
    }

    /// Extended credit lines of the business (`business_id` is the Meta
    /// business portfolio, not the WhatsApp Business Account)
    pub async fn list_credit_lines(&self, business_id: &str) -> ApiResult<serde_json::Value> {
        self.get_json(
            &format!("{business_id}/extendedcredits"),
            &[("fields", "id,legal_entity_name".to_string())],
        )
        .await
    }

    /// Shares credit line `credit_line_id` with the configured business account
    pub async fn attach_credit_line(
        &self,
        credit_line_id: &str,
        currency: &str,
    ) -> ApiResult<CreditAllocation> {
        let query = [
            ("waba_currency", currency.to_string()),
            ("waba_id", self.business_path("")?),
        ];

        self.post_query(
            &format!("{credit_line_id}/whatsapp_credit_sharing_and_attach"),
            &query,
        )
        .await
    }

    pub async fn revoke_credit_line(&self, allocation_config_id: &str) -> ApiResult<SuccessResponse> {
        self.delete_json(allocation_config_id, &[]).await
    }

    /// Official business account (green badge) status of the phone number
    pub async fn get_official_account_status(&self) -> ApiResult<serde_json::Value> {
        self.get_json(
            &self.phone_path(""),
            &[("fields", "official_business_account".to_string())],
        )
        .await
    }

    /// Submits the official business account request; `details` carries
    /// `business_website_url`, `primary_country_of_operation`,
    /// `primary_language` and optional `supporting_links`
    pub async fn request_official_account(
        &self,
        details: &serde_json::Value,
    ) -> ApiResult<serde_json::Value> {
        self.post_json(&self.phone_path("official_business_account"), details)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiError, ClientConfig, tests::test_client};

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = BusinessProfileUpdate {
            about: Some("Open 9-18".into()),
            websites: Some(vec!["https://shop.example.com".into()]),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({
                "about": "Open 9-18",
                "websites": ["https://shop.example.com"]
            })
        );
    }

    #[test]
    fn test_verification_method_serialization() {
        assert_eq!(
            serde_json::to_value(VerificationMethod::Sms).unwrap(),
            "SMS"
        );
    }

    #[ntex::test]
    async fn test_subscription_requires_business_account() {
        let client = WhatsAppClient::new(ClientConfig::new("token", "1"));

        assert!(matches!(
            client.subscribe_app().await,
            Err(ApiError::MissingBusinessAccount)
        ));
        assert!(matches!(
            client.attach_credit_line("1586175381658854", "USD").await,
            Err(ApiError::MissingBusinessAccount)
        ));
    }

    #[test]
    fn test_phone_paths() {
        let client = test_client();

        assert_eq!(
            client.url(&client.phone_path("whatsapp_business_profile")),
            "https://graph.example.com/v22.0/106540352242922/whatsapp_business_profile"
        );
    }
}
