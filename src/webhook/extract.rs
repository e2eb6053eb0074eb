//! Event extraction from a parsed webhook envelope
//!
//! [`first_message`] and [`first_status`] only look at
//! `entry[0].changes[0].value`, and only at its first element. A delivery that
//! batches several entries, changes or messages keeps the rest in the
//! envelope; use [`events`] to walk all of them.
//!
//! None of these functions check authenticity, run
//! [`validate_signature`](super::security::validate_signature) on the raw body
//! first.

use super::schemas::{ChangeValue, Envelope, Message, Status};

/// First inbound message of the first change of the first entry.
pub fn first_message(envelope: &Envelope) -> Option<&Message> {
    first_value(envelope)?.messages.first()
}

/// First status update of the first change of the first entry.
pub fn first_status(envelope: &Envelope) -> Option<&Status> {
    first_value(envelope)?.statuses.first()
}

fn first_value(envelope: &Envelope) -> Option<&ChangeValue> {
    envelope
        .entry
        .first()?
        .changes
        .first()
        .map(|change| &change.value)
}

/// Same descent as [`first_message`] over untyped JSON. Any missing link,
/// empty array or value of the wrong JSON type yields `None`.
pub fn first_message_value(envelope: &serde_json::Value) -> Option<&serde_json::Value> {
    first_in_value(envelope, "messages")
}

/// Same descent as [`first_status`] over untyped JSON.
pub fn first_status_value(envelope: &serde_json::Value) -> Option<&serde_json::Value> {
    first_in_value(envelope, "statuses")
}

fn first_in_value<'a>(envelope: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    envelope
        .get("entry")?
        .as_array()?
        .first()?
        .get("changes")?
        .as_array()?
        .first()?
        .get("value")?
        .get(key)?
        .as_array()?
        .first()
}

/// A single event found in a delivery, borrowed from the envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    Message {
        message: &'a Message,
        /// The change value the message came from (metadata, contacts)
        value: &'a ChangeValue,
    },
    Status {
        status: &'a Status,
        value: &'a ChangeValue,
    },
}

impl<'a> Event<'a> {
    pub fn value(&self) -> &'a ChangeValue {
        match *self {
            Event::Message { value, .. } | Event::Status { value, .. } => value,
        }
    }
}

/// Every message and status in the envelope, in document order: for each
/// entry and change, its messages first and then its statuses.
///
/// The iterator is lazy and finite; call `events` again to start over.
pub fn events(envelope: &Envelope) -> impl Iterator<Item = Event<'_>> + Clone {
    change_values(envelope).flat_map(|value| {
        let messages = value
            .messages
            .iter()
            .map(move |message| Event::Message { message, value });
        let statuses = value
            .statuses
            .iter()
            .map(move |status| Event::Status { status, value });
        messages.chain(statuses)
    })
}

/// Every inbound message across all entries and changes.
pub fn messages(envelope: &Envelope) -> impl Iterator<Item = &Message> + Clone {
    change_values(envelope).flat_map(|value| value.messages.iter())
}

/// Every status update across all entries and changes.
pub fn statuses(envelope: &Envelope) -> impl Iterator<Item = &Status> + Clone {
    change_values(envelope).flat_map(|value| value.statuses.iter())
}

fn change_values(envelope: &Envelope) -> impl Iterator<Item = &ChangeValue> + Clone {
    envelope
        .entry
        .iter()
        .flat_map(|entry| &entry.changes)
        .map(|change| &change.value)
}
