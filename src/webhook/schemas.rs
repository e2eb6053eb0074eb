//! # Webhook Schemas
//!
//! Data structures for the JSON body the provider POSTs when webhook events
//! occur (incoming messages, status updates, etc.).
//!
//! Every nested sequence may be absent in a delivery, so collections default
//! to empty and optional objects are `Option`. Unknown fields are ignored.
//! A link that is `null` or of the wrong type reads as absent, and elements
//! of a sequence that do not parse are skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, VecSkipError, serde_as};

/// Root webhook payload
#[serde_as]
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Envelope {
    /// The object type, typically "whatsapp_business_account"
    pub object: String,
    /// Array of entry objects containing the actual data
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    pub entry: Vec<Entry>,
}

/// Entry object, one per subscribed business account
#[serde_as]
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Entry {
    /// Business Account ID
    pub id: String,
    /// Array of changes that occurred
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    pub changes: Vec<Change>,
}

/// Change object, one per updated field
#[serde_as]
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Change {
    /// The field that changed (e.g., "messages")
    pub field: String,
    /// The value containing the actual data
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub value: ChangeValue,
}

/// Value object containing messages, statuses and metadata
#[serde_as]
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChangeValue {
    /// Messaging product (e.g., "whatsapp")
    pub messaging_product: String,
    /// Metadata about the receiving phone number
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub metadata: Option<Metadata>,
    /// Senders of the messages in this change
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    pub contacts: Vec<Contact>,
    /// Messages received
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    pub messages: Vec<Message>,
    /// Status updates for messages we sent
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    pub statuses: Vec<Status>,
    /// Errors not attached to a single message
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    pub errors: Vec<ErrorDetail>,
}

impl ChangeValue {
    /// Contact entry of the sender of `message`, matched by WhatsApp ID.
    pub fn contact_for(&self, message: &Message) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.wa_id == message.from)
    }
}

/// Metadata about the business phone number
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Metadata {
    /// Display name of the business phone number
    pub display_phone_number: String,
    /// Phone number ID
    pub phone_number_id: String,
}

/// Contact information for the message sender
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Contact {
    /// Profile information
    pub profile: Option<Profile>,
    /// WhatsApp ID (phone number)
    pub wa_id: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
}

/// Inbound message
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Message {
    /// Sender's WhatsApp ID (phone number)
    pub from: String,
    /// Message ID
    pub id: String,
    /// Unix timestamp of the message, as sent by the provider
    pub timestamp: String,
    /// Message type (text, image, interactive, ...)
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<MediaContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<MediaContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<MediaContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticker: Option<MediaContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationContent>,
    /// Shared contact cards, kept as raw JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<InteractiveReply>,
    /// Quick reply button of a template message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<ButtonReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Reaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    /// System notification (e.g. the user changed number)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<serde_json::Value>,
    /// Click-to-WhatsApp ad referral
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral: Option<serde_json::Value>,
    /// Context (if this is a reply to another message)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    /// Set for `unsupported` messages
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDetail>,
}

impl Message {
    /// Parses the unix `timestamp` field.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        parse_unix_timestamp(&self.timestamp)
    }

    /// Text the user typed or selected: the text body, the title of a
    /// button or list reply, or the payload of a template quick reply.
    pub fn text_body(&self) -> Option<&str> {
        if let Some(text) = &self.text {
            return Some(&text.body);
        }

        if let Some(interactive) = &self.interactive {
            if let Some(reply) = interactive.button_reply.as_ref() {
                return Some(&reply.title);
            }
            if let Some(reply) = interactive.list_reply.as_ref() {
                return Some(&reply.title);
            }
        }

        self.button.as_ref().map(|b| b.text.as_str())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TextContent {
    pub body: String,
}

/// Media message content (image, audio, video, document, sticker)
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaContent {
    /// Media ID, resolvable through the media endpoint
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// SHA256 hash of the media
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Only present on documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Only present on stickers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationContent {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Reply to an interactive message we sent
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InteractiveReply {
    /// "button_reply", "list_reply" or "nfm_reply"
    #[serde(rename = "type")]
    pub reply_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_reply: Option<ReplyOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_reply: Option<ReplyOption>,
    /// Flow completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfm_reply: Option<FlowReply>,
}

/// Selected button or list row
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReplyOption {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FlowReply {
    pub name: String,
    pub body: String,
    /// JSON document encoded as a string by the provider
    pub response_json: String,
}

impl FlowReply {
    /// Decodes `response_json`.
    pub fn response(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.response_json)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ButtonReply {
    pub payload: String,
    pub text: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Reaction {
    /// Message the reaction applies to
    pub message_id: String,
    /// Absent when a reaction is removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// Cart sent from a catalog
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Order {
    pub catalog_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub product_items: Vec<OrderItem>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrderItem {
    pub product_retailer_id: String,
    pub quantity: u32,
    pub item_price: f64,
    pub currency: String,
}

/// Context for reply or forwarded messages
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Context {
    /// Sender of the message being replied to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Message ID being referenced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarded: Option<bool>,
}

/// Delivery status of a sent message
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Status {
    /// ID of the message the status refers to
    pub id: String,
    pub status: StatusKind,
    pub timestamp: String,
    pub recipient_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    /// Present when `status` is `failed`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDetail>,
}

impl Status {
    /// Parses the unix `timestamp` field.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        parse_unix_timestamp(&self.timestamp)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Sent,
    Delivered,
    Read,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Conversation {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<ConversationOrigin>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConversationOrigin {
    /// e.g. "marketing", "utility", "service"
    #[serde(rename = "type")]
    pub origin_type: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Pricing {
    pub billable: bool,
    pub pricing_model: String,
    pub category: String,
}

/// Error detail attached to a status, message or change
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ErrorDetail {
    pub code: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_data: Option<serde_json::Value>,
}

fn parse_unix_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let secs = raw.parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0)
}
