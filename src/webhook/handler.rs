//! # Webhook Event Dispatch
//!
//! Hands the events of an authenticated delivery to the application through
//! the [`EventHandler`] trait.

use super::{
    extract::{self, Event},
    schemas::{ChangeValue, Envelope, Message, Status},
};
use async_trait::async_trait;
use std::{fmt, str::FromStr};

/// Application callbacks for webhook events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Called for an inbound message. `value` carries the metadata and the
    /// contacts of the change the message came from.
    async fn on_message(&self, message: &Message, value: &ChangeValue) -> anyhow::Result<()>;

    /// Called for a delivery status update of a message we sent.
    async fn on_status(&self, status: &Status, value: &ChangeValue) -> anyhow::Result<()>;
}

/// Which events of a delivery reach the [`EventHandler`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Only the first message of the first change of the first entry, or the
    /// first status when there is no message. Batched siblings are dropped.
    #[default]
    FirstEvent,
    /// Every message and status of every entry and change, in order.
    AllEvents,
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" | "first_event" => Ok(DispatchMode::FirstEvent),
            "all" | "all_events" => Ok(DispatchMode::AllEvents),
            other => Err(format!("unknown dispatch mode: {other}")),
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::FirstEvent => write!(f, "first"),
            DispatchMode::AllEvents => write!(f, "all"),
        }
    }
}

/// Selects the events of `envelope` according to `mode`.
pub fn select_events(envelope: &Envelope, mode: DispatchMode) -> Vec<Event<'_>> {
    match mode {
        DispatchMode::AllEvents => extract::events(envelope).collect(),
        DispatchMode::FirstEvent => {
            let Some(value) = envelope
                .entry
                .first()
                .and_then(|entry| entry.changes.first())
                .map(|change| &change.value)
            else {
                return Vec::new();
            };

            if let Some(message) = extract::first_message(envelope) {
                return vec![Event::Message { message, value }];
            }

            extract::first_status(envelope)
                .map(|status| Event::Status { status, value })
                .into_iter()
                .collect()
        }
    }
}

/// Processes a delivery: every selected event is handed to `handler`.
///
/// A failing callback is logged and does not stop the remaining events.
/// Returns the number of events handled successfully.
pub async fn process_webhook(
    envelope: &Envelope,
    mode: DispatchMode,
    handler: &dyn EventHandler,
) -> usize {
    let mut handled = 0;

    for event in select_events(envelope, mode) {
        let result = match event {
            Event::Message { message, value } => {
                tracing::info!(
                    "Received {msg_type} message {id}",
                    msg_type = message.msg_type,
                    id = message.id
                );
                handler.on_message(message, value).await
            }
            Event::Status { status, value } => {
                tracing::info!(
                    "Received status {status:?} for message {id}",
                    status = status.status,
                    id = status.id
                );
                handler.on_status(status, value).await
            }
        };

        match result {
            Ok(()) => handled += 1,
            Err(e) => logfire::error!(
                "Webhook event handler failed: {error}",
                error = e.to_string()
            ),
        }
    }

    handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope() -> Envelope {
        serde_json::from_value(json!({
            "object": "whatsapp_business_account",
            "entry": [
                {"id": "1", "changes": [{"field": "messages", "value": {
                    "metadata": {"display_phone_number": "15550783881", "phone_number_id": "106540352242922"},
                    "messages": [{"id": "m1", "from": "16505551234", "type": "text", "text": {"body": "hi"}},
                                 {"id": "m2", "from": "16505551234", "type": "text", "text": {"body": "hi"}}],
                    "statuses": [{"id": "s1", "status": "read"}]
                }}]},
                {"id": "2", "changes": [{"field": "messages", "value": {
                    "statuses": [{"id": "s2", "status": "sent"}]
                }}]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_dispatch_mode_from_str() {
        assert_eq!("first".parse::<DispatchMode>(), Ok(DispatchMode::FirstEvent));
        assert_eq!("ALL".parse::<DispatchMode>(), Ok(DispatchMode::AllEvents));
        assert!("some".parse::<DispatchMode>().is_err());
        assert_eq!(DispatchMode::AllEvents.to_string(), "all");
    }

    #[test]
    fn test_select_first_event_prefers_message() {
        let envelope = envelope();
        let events = select_events(&envelope, DispatchMode::FirstEvent);

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::Message { message, .. } if message.id == "m1"));
        assert_eq!(
            events[0].value().metadata.as_ref().map(|m| m.phone_number_id.as_str()),
            Some("106540352242922")
        );
    }

    #[test]
    fn test_select_first_event_falls_back_to_status() {
        let envelope: Envelope = serde_json::from_value(json!({
            "entry": [{"changes": [{"value": {"statuses": [{"id": "s1", "status": "read"}]}}]}]
        }))
        .unwrap();

        let events = select_events(&envelope, DispatchMode::FirstEvent);

        assert!(matches!(events[..], [Event::Status { status, .. }] if status.id == "s1"));
    }

    #[test]
    fn test_select_first_event_empty() {
        assert!(select_events(&Envelope::default(), DispatchMode::FirstEvent).is_empty());
    }

    #[ntex::test]
    async fn test_process_webhook_first_event() {
        let mut handler = MockEventHandler::new();
        handler
            .expect_on_message()
            .withf(|message, _| message.id == "m1")
            .times(1)
            .returning(|_, _| Ok(()));
        handler.expect_on_status().never();

        let handled = process_webhook(&envelope(), DispatchMode::FirstEvent, &handler).await;

        assert_eq!(handled, 1);
    }

    #[ntex::test]
    async fn test_process_webhook_all_events_continues_after_failure() {
        let mut handler = MockEventHandler::new();
        handler
            .expect_on_message()
            .times(2)
            .returning(|message, _| {
                if message.id == "m2" {
                    anyhow::bail!("boom");
                }
                Ok(())
            });
        handler
            .expect_on_status()
            .times(2)
            .returning(|_, _| Ok(()));

        let handled = process_webhook(&envelope(), DispatchMode::AllEvents, &handler).await;

        assert_eq!(handled, 3);
    }
}
