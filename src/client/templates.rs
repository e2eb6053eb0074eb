//! Message template management: `/{waba_id}/message_templates`

use super::{ApiResult, SuccessResponse, WhatsAppClient};
use serde::{Deserialize, Serialize};

/// Template submitted for review
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateDefinition {
    pub name: String,
    /// e.g. "en_US"
    pub language: String,
    /// "MARKETING", "UTILITY" or "AUTHENTICATION"
    pub category: String,
    /// Header, body, footer and buttons as the API documents them
    pub components: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_format: Option<String>,
}

/// Response to a template creation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateCreated {
    pub id: String,
    /// "APPROVED", "PENDING" or "REJECTED"
    pub status: String,
    pub category: String,
}

/// Filters for [`WhatsAppClient::list_templates`]
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub name: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub limit: Option<u32>,
    /// Cursor from `paging.cursors.after` of the previous page
    pub after: Option<String>,
}

impl TemplateFilter {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        [
            ("name", self.name.clone()),
            ("status", self.status.clone()),
            ("category", self.category.clone()),
            ("language", self.language.clone()),
            ("limit", self.limit.map(|l| l.to_string())),
            ("after", self.after.clone()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

impl WhatsAppClient {
    pub async fn create_template(
        &self,
        template: &TemplateDefinition,
    ) -> ApiResult<TemplateCreated> {
        self.post_json(&self.business_path("message_templates")?, template)
            .await
    }

    /// Lists templates; the response carries `data` and `paging`
    pub async fn list_templates(&self, filter: &TemplateFilter) -> ApiResult<serde_json::Value> {
        self.get_json(&self.business_path("message_templates")?, &filter.to_query())
            .await
    }

    pub async fn get_template(&self, template_id: &str) -> ApiResult<serde_json::Value> {
        self.get_json(template_id, &[]).await
    }

    /// Edits category and/or components of an existing template
    pub async fn edit_template(
        &self,
        template_id: &str,
        changes: &serde_json::Value,
    ) -> ApiResult<SuccessResponse> {
        self.post_json(template_id, changes).await
    }

    /// Deletes every language of template `name`, or only the one with
    /// `template_id` when given
    pub async fn delete_template(
        &self,
        name: &str,
        template_id: Option<&str>,
    ) -> ApiResult<SuccessResponse> {
        let mut query = vec![("name", name.to_string())];
        if let Some(id) = template_id {
            query.push(("hsm_id", id.to_string()));
        }

        self.delete_json(&self.business_path("message_templates")?, &query)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_query_skips_unset_fields() {
        let filter = TemplateFilter {
            status: Some("APPROVED".into()),
            limit: Some(50),
            ..Default::default()
        };

        assert_eq!(
            filter.to_query(),
            vec![("status", "APPROVED".to_string()), ("limit", "50".to_string())]
        );
        assert!(TemplateFilter::default().to_query().is_empty());
    }

    #[test]
    fn test_template_definition_shape() {
        let definition = TemplateDefinition {
            name: "order_confirmation".into(),
            language: "en_US".into(),
            category: "UTILITY".into(),
            components: vec![json!({"type": "BODY", "text": "Order {{1}} confirmed"})],
            parameter_format: None,
        };

        let value = serde_json::to_value(&definition).unwrap();

        assert_eq!(value["category"], "UTILITY");
        assert!(value.get("parameter_format").is_none());
    }
}
