//! WhatsApp Flows management: `/{waba_id}/flows` and `/{flow_id}`

use super::{ApiError, ApiResult, SuccessResponse, WhatsAppClient};
use serde::{Deserialize, Serialize};

/// Fields returned by [`WhatsAppClient::get_flow`] when none are requested
pub const DEFAULT_FLOW_FIELDS: &str =
    "id,name,categories,preview,status,validation_errors,json_version,data_api_version,endpoint_uri";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFlow {
    pub name: String,
    /// e.g. "SIGN_UP", "APPOINTMENT_BOOKING", "OTHER"
    pub categories: Vec<String>,
    /// Flow to copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_flow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlowCreated {
    pub id: String,
}

/// Metadata update, unset fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
}

/// Response to a flow JSON upload
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlowJsonUpdated {
    pub success: bool,
    pub validation_errors: Vec<serde_json::Value>,
}

impl WhatsAppClient {
    pub async fn create_flow(&self, flow: &NewFlow) -> ApiResult<FlowCreated> {
        self.post_json(&self.business_path("flows")?, flow).await
    }

    pub async fn list_flows(&self) -> ApiResult<serde_json::Value> {
        self.get_json(&self.business_path("flows")?, &[]).await
    }

    /// Reads a flow; `fields` defaults to [`DEFAULT_FLOW_FIELDS`]
    pub async fn get_flow(
        &self,
        flow_id: &str,
        fields: Option<&str>,
    ) -> ApiResult<serde_json::Value> {
        let fields = fields.unwrap_or(DEFAULT_FLOW_FIELDS).to_string();
        self.get_json(flow_id, &[("fields", fields)]).await
    }

    pub async fn update_flow_metadata(
        &self,
        flow_id: &str,
        metadata: &FlowMetadata,
    ) -> ApiResult<SuccessResponse> {
        self.post_json(flow_id, metadata).await
    }

    /// Uploads the flow definition as the `flow.json` asset
    pub async fn update_flow_json(
        &self,
        flow_id: &str,
        flow_json: &serde_json::Value,
    ) -> ApiResult<FlowJsonUpdated> {
        let file_part = reqwest::multipart::Part::bytes(flow_json.to_string().into_bytes())
            .file_name("flow.json")
            .mime_str("application/json")
            .map_err(|e| ApiError::InvalidMedia(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("name", "flow.json")
            .text("asset_type", "FLOW_JSON")
            .part("file", file_part);

        self.post_multipart(&format!("{flow_id}/assets"), form)
            .await
    }

    /// Publishes a draft flow; published flows can no longer be edited
    pub async fn publish_flow(&self, flow_id: &str) -> ApiResult<SuccessResponse> {
        self.post_json(&format!("{flow_id}/publish"), &serde_json::json!({}))
            .await
    }

    pub async fn deprecate_flow(&self, flow_id: &str) -> ApiResult<SuccessResponse> {
        self.post_json(&format!("{flow_id}/deprecate"), &serde_json::json!({}))
            .await
    }

    /// Deletes a flow that was never published
    pub async fn delete_flow(&self, flow_id: &str) -> ApiResult<SuccessResponse> {
        self.delete_json(flow_id, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_metadata_skips_unset_fields() {
        let metadata = FlowMetadata {
            name: Some("Booking v2".into()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            serde_json::json!({"name": "Booking v2"})
        );
    }

    #[test]
    fn test_flow_json_updated_with_errors() {
        let updated: FlowJsonUpdated = serde_json::from_value(serde_json::json!({
            "success": true,
            "validation_errors": [{"error": "INVALID_PROPERTY", "line_start": 10}]
        }))
        .unwrap();

        assert!(updated.success);
        assert_eq!(updated.validation_errors.len(), 1);
    }
}
