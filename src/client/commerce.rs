//! Commerce settings of the phone number and catalog products

use super::{ApiResult, SuccessResponse, WhatsAppClient};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommerceSettings {
    pub id: String,
    pub is_cart_enabled: bool,
    pub is_catalog_visible: bool,
}

/// `{"data": [{...}]}`, with an empty list when nothing was configured
fn commerce_settings_from(body: serde_json::Value) -> ApiResult<CommerceSettings> {
    match body.get("data").and_then(|data| data.get(0)) {
        Some(first) => Ok(CommerceSettings::deserialize(first)?),
        None => Ok(CommerceSettings::default()),
    }
}

impl WhatsAppClient {
    pub async fn get_commerce_settings(&self) -> ApiResult<CommerceSettings> {
        let settings: serde_json::Value = self
            .get_json(&self.phone_path("whatsapp_commerce_settings"), &[])
            .await?;

        commerce_settings_from(settings)
    }

    /// Enables or hides the cart and the catalog; `None` leaves a setting as is
    pub async fn update_commerce_settings(
        &self,
        is_cart_enabled: Option<bool>,
        is_catalog_visible: Option<bool>,
    ) -> ApiResult<SuccessResponse> {
        let query: Vec<(&str, String)> = [
            ("is_cart_enabled", is_cart_enabled),
            ("is_catalog_visible", is_catalog_visible),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v.to_string())))
        .collect();

        self.post_query(&self.phone_path("whatsapp_commerce_settings"), &query)
            .await
    }

    /// One page of products; pass `after` from `paging.cursors.after` for the next
    pub async fn list_catalog_products(
        &self,
        catalog_id: &str,
        after: Option<&str>,
    ) -> ApiResult<serde_json::Value> {
        let mut query = vec![(
            "fields",
            "id,retailer_id,name,price,currency,availability".to_string(),
        )];
        if let Some(cursor) = after {
            query.push(("after", cursor.to_string()));
        }

        self.get_json(&format!("{catalog_id}/products"), &query)
            .await
    }
}
