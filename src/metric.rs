use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("wacloud_statds")
        .with_description("Webhook and API call statistics")
        .with_unit("event")
        .build()
});

fn incr_statds(metric: String, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

pub fn incr_webhook_statds(outcome: &str) {
    incr_statds("webhook".to_string(), outcome.into())
}

pub fn incr_api_call_statds(outcome: &str) {
    incr_statds("api_call".to_string(), outcome.into())
}
