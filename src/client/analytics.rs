//! Messaging, conversation and template analytics

use super::{ApiResult, WhatsAppClient};
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    HalfHour,
    Day,
    Month,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::HalfHour => write!(f, "HALF_HOUR"),
            Granularity::Day => write!(f, "DAY"),
            Granularity::Month => write!(f, "MONTH"),
        }
    }
}

/// Time window of an analytics query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub granularity: Granularity,
}

impl AnalyticsRange {
    /// `analytics.start(..).end(..).granularity(..)` field expansion
    fn field(&self, edge: &str) -> String {
        format!(
            "{edge}.start({start}).end({end}).granularity({granularity})",
            start = self.start.timestamp(),
            end = self.end.timestamp(),
            granularity = self.granularity
        )
    }
}

impl WhatsAppClient {
    /// Sent and delivered message counts of the business account
    pub async fn get_analytics(&self, range: &AnalyticsRange) -> ApiResult<serde_json::Value> {
        self.get_json(
            &self.business_path("")?,
            &[("fields", range.field("analytics"))],
        )
        .await
    }

    /// Conversation counts and cost of the business account
    pub async fn get_conversation_analytics(
        &self,
        range: &AnalyticsRange,
    ) -> ApiResult<serde_json::Value> {
        self.get_json(
            &self.business_path("")?,
            &[("fields", range.field("conversation_analytics"))],
        )
        .await
    }

    /// Daily sent/delivered/read/clicked counts for the given templates
    pub async fn get_template_analytics(
        &self,
        template_ids: &[&str],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ApiResult<serde_json::Value> {
        let query = [
            ("start", start.timestamp().to_string()),
            ("end", end.timestamp().to_string()),
            ("granularity", "DAILY".to_string()),
            ("template_ids", serde_json::to_string(template_ids)?),
        ];

        self.get_json(&self.business_path("template_analytics")?, &query)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_field() {
        let range = AnalyticsRange {
            start: DateTime::from_timestamp(1_693_526_400, 0).unwrap(),
            end: DateTime::from_timestamp(1_696_118_400, 0).unwrap(),
            granularity: Granularity::Day,
        };

        assert_eq!(
            range.field("analytics"),
            "analytics.start(1693526400).end(1696118400).granularity(DAY)"
        );
    }
}
