//! # Outgoing Message Schemas
//!
//! Request bodies for `POST /{phone_number_id}/messages` and the response the
//! API returns for it.

use crate::consts::MESSAGING_PRODUCT;
use serde::{Deserialize, Serialize};

/// Message to send.
///
/// Serializes to `{"messaging_product": "whatsapp", "recipient_type":
/// "individual", "to": ..., "type": ..., <type>: {...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage {
    /// Messaging product, always "whatsapp"
    pub messaging_product: String,
    pub recipient_type: String,
    /// Recipient's WhatsApp ID (phone number with country code)
    pub to: String,
    /// Message being replied to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ReplyContext>,
    #[serde(flatten)]
    pub content: MessageContent,
}

impl OutgoingMessage {
    pub fn new(to: impl Into<String>, content: MessageContent) -> Self {
        Self {
            messaging_product: MESSAGING_PRODUCT.to_string(),
            recipient_type: "individual".to_string(),
            to: to.into(),
            context: None,
            content,
        }
    }

    /// Quotes `message_id` in the recipient's chat.
    pub fn reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.context = Some(ReplyContext {
            message_id: message_id.into(),
        });
        self
    }

    pub fn text(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(
            to,
            MessageContent::Text {
                text: TextBody {
                    body: body.into(),
                    preview_url: None,
                },
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyContext {
    pub message_id: String,
}

/// Typed content of an outgoing message; the variant name becomes `type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextBody },
    Image { image: Media },
    Audio { audio: Media },
    Video { video: Media },
    Document { document: Media },
    Sticker { sticker: Media },
    Location { location: Location },
    Contacts { contacts: Vec<ContactCard> },
    Reaction { reaction: ReactionBody },
    Template { template: Template },
    Interactive { interactive: Interactive },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBody {
    pub body: String,
    /// Render a link preview for the first URL in `body`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<bool>,
}

/// Media reference, either an uploaded media ID or a public link
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Media {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Not supported for audio and stickers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Documents only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Media {
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn from_link(link: impl Into<String>) -> Self {
        Self {
            link: Some(link.into()),
            ..Default::default()
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Contact card shared with the recipient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactCard {
    pub name: ContactName,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<ContactPhone>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<ContactEmail>,
}

impl ContactCard {
    pub fn new(formatted_name: impl Into<String>) -> Self {
        Self {
            name: ContactName {
                formatted_name: formatted_name.into(),
                first_name: None,
                last_name: None,
            },
            phones: Vec::new(),
            emails: Vec::new(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>, wa_id: Option<String>) -> Self {
        self.phones.push(ContactPhone {
            phone: phone.into(),
            phone_type: None,
            wa_id,
        });
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.emails.push(ContactEmail {
            email: email.into(),
            email_type: None,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactName {
    pub formatted_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactPhone {
    pub phone: String,
    /// e.g. "CELL", "WORK"
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub phone_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wa_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactEmail {
    pub email: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub email_type: Option<String>,
}

/// Reaction to a message; an empty emoji removes a previous reaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactionBody {
    pub message_id: String,
    pub emoji: String,
}

/// Approved message template with its parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub name: String,
    pub language: TemplateLanguage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<TemplateComponent>,
}

impl Template {
    pub fn new(name: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: TemplateLanguage {
                code: language_code.into(),
            },
            components: Vec::new(),
        }
    }

    pub fn with_component(mut self, component: TemplateComponent) -> Self {
        self.components.push(component);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateLanguage {
    /// e.g. "en_US", "es_MX"
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateComponent {
    /// "header", "body" or "button"
    #[serde(rename = "type")]
    pub component_type: String,
    /// Buttons only: "quick_reply", "url", "copy_code", "flow"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    /// Buttons only: position of the button, as a string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    pub parameters: Vec<TemplateParameter>,
}

impl TemplateComponent {
    pub fn header(parameters: Vec<TemplateParameter>) -> Self {
        Self {
            component_type: "header".to_string(),
            sub_type: None,
            index: None,
            parameters,
        }
    }

    pub fn body(parameters: Vec<TemplateParameter>) -> Self {
        Self {
            component_type: "body".to_string(),
            sub_type: None,
            index: None,
            parameters,
        }
    }

    pub fn button(
        sub_type: impl Into<String>,
        index: usize,
        parameters: Vec<TemplateParameter>,
    ) -> Self {
        Self {
            component_type: "button".to_string(),
            sub_type: Some(sub_type.into()),
            index: Some(index.to_string()),
            parameters,
        }
    }
}

/// Value substituted into a template placeholder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateParameter {
    Text {
        text: String,
        /// Named parameters only
        #[serde(skip_serializing_if = "Option::is_none")]
        parameter_name: Option<String>,
    },
    Currency {
        currency: serde_json::Value,
    },
    DateTime {
        date_time: serde_json::Value,
    },
    Image {
        image: Media,
    },
    Document {
        document: Media,
    },
    Video {
        video: Media,
    },
    /// Quick reply button payload
    Payload {
        payload: String,
    },
    /// Copy code button value
    CouponCode {
        coupon_code: String,
    },
}

impl TemplateParameter {
    pub fn text(text: impl Into<String>) -> Self {
        TemplateParameter::Text {
            text: text.into(),
            parameter_name: None,
        }
    }
}

/// Interactive content structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interactive {
    /// "button", "list", "cta_url", "flow", "location_request_message",
    /// "product", "product_list" or "catalog_message"
    #[serde(rename = "type")]
    pub interactive_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<InteractiveHeader>,
    /// Optional for single product messages only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<InteractiveText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<InteractiveText>,
    pub action: InteractiveAction,
}

impl Interactive {
    pub fn new(
        interactive_type: impl Into<String>,
        body: Option<String>,
        action: InteractiveAction,
    ) -> Self {
        Self {
            interactive_type: interactive_type.into(),
            header: None,
            body: body.map(|text| InteractiveText { text }),
            footer: None,
            action,
        }
    }

    pub fn with_header(mut self, header: InteractiveHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(InteractiveText {
            text: footer.into(),
        });
        self
    }
}

/// Interactive message header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractiveHeader {
    /// Header type ("text", "image", "video", "document")
    #[serde(rename = "type")]
    pub header_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Media>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Media>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Media>,
}

impl InteractiveHeader {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            header_type: "text".to_string(),
            text: Some(text.into()),
            image: None,
            video: None,
            document: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractiveText {
    pub text: String,
}

/// Interactive action. Which fields are set depends on the interactive type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InteractiveAction {
    /// List messages: text of the button that opens the list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<String>,
    /// Reply button messages
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<ReplyButton>,
    /// List and product list messages
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<InteractiveSection>,
    /// "cta_url", "flow", "send_location", "catalog_message"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    /// Product and product list messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    /// Single product messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_retailer_id: Option<String>,
}

/// Reply button, at most three per message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyButton {
    /// Always "reply"
    #[serde(rename = "type")]
    pub button_type: String,
    pub reply: ReplyButtonContent,
}

impl ReplyButton {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            button_type: "reply".to_string(),
            reply: ReplyButtonContent {
                id: id.into(),
                title: title.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyButtonContent {
    pub id: String,
    pub title: String,
}

/// Interactive section containing rows or products
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InteractiveSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<InteractiveRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub product_items: Vec<ProductItem>,
}

impl InteractiveSection {
    pub fn rows(title: Option<String>, rows: Vec<InteractiveRow>) -> Self {
        Self {
            title,
            rows,
            ..Default::default()
        }
    }

    pub fn products(title: impl Into<String>, product_retailer_ids: Vec<String>) -> Self {
        Self {
            title: Some(title.into()),
            product_items: product_retailer_ids
                .into_iter()
                .map(|product_retailer_id| ProductItem {
                    product_retailer_id,
                })
                .collect(),
            ..Default::default()
        }
    }
}

/// Interactive row (list item)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractiveRow {
    /// Unique row ID, echoed back in the list reply
    pub id: String,
    /// Row title (displayed to user)
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InteractiveRow {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductItem {
    pub product_retailer_id: String,
}

/// Parameters of a flow message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowParameters {
    pub flow_message_version: String,
    pub flow_id: String,
    /// Opaque token echoed back in the flow completion
    pub flow_token: String,
    /// Text of the button that opens the flow
    pub flow_cta: String,
    /// "navigate" or "data_exchange"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_action_payload: Option<serde_json::Value>,
    /// "draft" sends an unpublished flow for testing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl FlowParameters {
    pub fn new(
        flow_id: impl Into<String>,
        flow_token: impl Into<String>,
        flow_cta: impl Into<String>,
    ) -> Self {
        Self {
            flow_message_version: "3".to_string(),
            flow_id: flow_id.into(),
            flow_token: flow_token.into(),
            flow_cta: flow_cta.into(),
            flow_action: None,
            flow_action_payload: None,
            mode: None,
        }
    }

    /// Opens the flow on `screen` with optional initial `data`.
    pub fn navigate(mut self, screen: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        let mut payload = serde_json::json!({ "screen": screen.into() });
        if let Some(data) = data {
            payload["data"] = data;
        }
        self.flow_action = Some("navigate".to_string());
        self.flow_action_payload = Some(payload);
        self
    }
}

/// Body for read receipts and the typing indicator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadReceipt {
    pub messaging_product: String,
    /// Always "read"
    pub status: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typing_indicator: Option<TypingIndicator>,
}

impl ReadReceipt {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            messaging_product: MESSAGING_PRODUCT.to_string(),
            status: "read".to_string(),
            message_id: message_id.into(),
            typing_indicator: None,
        }
    }

    pub fn with_typing_indicator(mut self) -> Self {
        self.typing_indicator = Some(TypingIndicator {
            indicator_type: "text".to_string(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypingIndicator {
    #[serde(rename = "type")]
    pub indicator_type: String,
}

/// Response from the API when sending a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageResponse {
    pub messaging_product: String,
    /// Recipients
    pub contacts: Vec<MessageResponseContact>,
    /// Messages accepted
    pub messages: Vec<MessageResponseId>,
}

impl MessageResponse {
    /// ID of the accepted message (`wamid...`)
    pub fn message_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageResponseContact {
    /// WhatsApp ID of the contact
    pub wa_id: String,
    /// Input phone number
    pub input: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageResponseId {
    pub id: String,
    /// "accepted", "held_for_quality_assessment", ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_status: Option<String>,
}

/// Response of endpoints that only acknowledge, e.g. `{"success": true}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_message_shape() {
        let message = OutgoingMessage::text("16505551234", "hello").reply_to("wamid.1");

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "16505551234",
                "context": {"message_id": "wamid.1"},
                "type": "text",
                "text": {"body": "hello"}
            })
        );
    }

    #[test]
    fn test_document_message_shape() {
        let message = OutgoingMessage::new(
            "16505551234",
            MessageContent::Document {
                document: Media::from_id("1013859600285441").with_filename("report.pdf"),
            },
        );

        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["type"], "document");
        assert_eq!(
            value["document"],
            json!({"id": "1013859600285441", "filename": "report.pdf"})
        );
        assert!(value.get("context").is_none());
    }

    #[test]
    fn test_template_message_shape() {
        let template = Template::new("order_update", "en_US")
            .with_component(TemplateComponent::body(vec![TemplateParameter::text("#1234")]))
            .with_component(TemplateComponent::button(
                "quick_reply",
                0,
                vec![TemplateParameter::Payload {
                    payload: "TRACK".into(),
                }],
            ));

        let value = serde_json::to_value(MessageContent::Template { template }).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "template",
                "template": {
                    "name": "order_update",
                    "language": {"code": "en_US"},
                    "components": [
                        {"type": "body", "parameters": [{"type": "text", "text": "#1234"}]},
                        {"type": "button", "sub_type": "quick_reply", "index": "0",
                         "parameters": [{"type": "payload", "payload": "TRACK"}]}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_list_interactive_shape() {
        let interactive = Interactive::new(
            "list",
            Some("Pick one".into()),
            InteractiveAction {
                button: Some("Options".into()),
                sections: vec![InteractiveSection::rows(
                    None,
                    vec![
                        InteractiveRow::new("report", "Report"),
                        InteractiveRow::new("card", "Card").with_description("digital card"),
                    ],
                )],
                ..Default::default()
            },
        )
        .with_header(InteractiveHeader::text("Pets"));

        assert_eq!(
            serde_json::to_value(&interactive).unwrap(),
            json!({
                "type": "list",
                "header": {"type": "text", "text": "Pets"},
                "body": {"text": "Pick one"},
                "action": {
                    "button": "Options",
                    "sections": [{"rows": [
                        {"id": "report", "title": "Report"},
                        {"id": "card", "title": "Card", "description": "digital card"}
                    ]}]
                }
            })
        );
    }

    #[test]
    fn test_flow_parameters_navigate() {
        let params = FlowParameters::new("1234", "token-1", "Book")
            .navigate("WELCOME", Some(json!({"name": "Ada"})));

        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(value["flow_message_version"], "3");
        assert_eq!(value["flow_action"], "navigate");
        assert_eq!(
            value["flow_action_payload"],
            json!({"screen": "WELCOME", "data": {"name": "Ada"}})
        );
    }

    #[test]
    fn test_read_receipt_with_typing_indicator() {
        assert_eq!(
            serde_json::to_value(ReadReceipt::new("wamid.1").with_typing_indicator()).unwrap(),
            json!({
                "messaging_product": "whatsapp",
                "status": "read",
                "message_id": "wamid.1",
                "typing_indicator": {"type": "text"}
            })
        );
    }

    #[test]
    fn test_message_response() {
        let response: MessageResponse = serde_json::from_value(json!({
            "messaging_product": "whatsapp",
            "contacts": [{"input": "16505551234", "wa_id": "16505551234"}],
            "messages": [{"id": "wamid.HBgLMTY1MDM4Nzk0MzkVAgARGBI3", "message_status": "accepted"}]
        }))
        .unwrap();

        assert_eq!(response.message_id(), Some("wamid.HBgLMTY1MDM4Nzk0MzkVAgARGBI3"));
    }
}
