//! Sending messages: `POST /{phone_number_id}/messages`

use super::{
    ApiResult, WhatsAppClient,
    schemas::{
        ContactCard, FlowParameters, Interactive, InteractiveAction, InteractiveHeader,
        InteractiveRow, InteractiveSection, Location, Media, MessageContent, MessageResponse,
        OutgoingMessage, ReactionBody, ReadReceipt, ReplyButton, SuccessResponse, Template,
        TextBody,
    },
};

impl WhatsAppClient {
    /// Sends any message type
    pub async fn send_message(&self, message: &OutgoingMessage) -> ApiResult<MessageResponse> {
        tracing::debug!("Sending {to} a message", to = message.to);
        self.post_json(&self.phone_path("messages"), message).await
    }

    /// Sends a text message
    ///
    /// # Arguments
    /// * `to` - Recipient's WhatsApp ID (phone number with country code)
    /// * `body` - Message text
    /// * `preview_url` - Render a preview of the first URL in `body`
    pub async fn send_text(
        &self,
        to: &str,
        body: &str,
        preview_url: bool,
    ) -> ApiResult<MessageResponse> {
        let content = MessageContent::Text {
            text: TextBody {
                body: body.to_string(),
                preview_url: preview_url.then_some(true),
            },
        };
        self.send_message(&OutgoingMessage::new(to, content)).await
    }

    pub async fn send_image(&self, to: &str, image: Media) -> ApiResult<MessageResponse> {
        self.send_message(&OutgoingMessage::new(to, MessageContent::Image { image }))
            .await
    }

    pub async fn send_audio(&self, to: &str, audio: Media) -> ApiResult<MessageResponse> {
        self.send_message(&OutgoingMessage::new(to, MessageContent::Audio { audio }))
            .await
    }

    pub async fn send_video(&self, to: &str, video: Media) -> ApiResult<MessageResponse> {
        self.send_message(&OutgoingMessage::new(to, MessageContent::Video { video }))
            .await
    }

    /// Sends a document, by uploaded media ID or by link
    pub async fn send_document(&self, to: &str, document: Media) -> ApiResult<MessageResponse> {
        self.send_message(&OutgoingMessage::new(
            to,
            MessageContent::Document { document },
        ))
        .await
    }

    pub async fn send_sticker(&self, to: &str, sticker: Media) -> ApiResult<MessageResponse> {
        self.send_message(&OutgoingMessage::new(to, MessageContent::Sticker { sticker }))
            .await
    }

    pub async fn send_location(&self, to: &str, location: Location) -> ApiResult<MessageResponse> {
        self.send_message(&OutgoingMessage::new(
            to,
            MessageContent::Location { location },
        ))
        .await
    }

    pub async fn send_contacts(
        &self,
        to: &str,
        contacts: Vec<ContactCard>,
    ) -> ApiResult<MessageResponse> {
        self.send_message(&OutgoingMessage::new(
            to,
            MessageContent::Contacts { contacts },
        ))
        .await
    }

    /// Reacts to `message_id` with `emoji`; an empty emoji removes the reaction
    pub async fn send_reaction(
        &self,
        to: &str,
        message_id: &str,
        emoji: &str,
    ) -> ApiResult<MessageResponse> {
        let reaction = ReactionBody {
            message_id: message_id.to_string(),
            emoji: emoji.to_string(),
        };
        self.send_message(&OutgoingMessage::new(
            to,
            MessageContent::Reaction { reaction },
        ))
        .await
    }

    /// Sends an approved template, the only message type allowed outside the
    /// customer service window
    pub async fn send_template(&self, to: &str, template: Template) -> ApiResult<MessageResponse> {
        self.send_message(&OutgoingMessage::new(
            to,
            MessageContent::Template { template },
        ))
        .await
    }

    /// Sends any interactive message
    pub async fn send_interactive(
        &self,
        to: &str,
        interactive: Interactive,
    ) -> ApiResult<MessageResponse> {
        self.send_message(&OutgoingMessage::new(
            to,
            MessageContent::Interactive { interactive },
        ))
        .await
    }

    /// Sends up to three reply buttons
    pub async fn send_interactive_buttons(
        &self,
        to: &str,
        body: &str,
        buttons: Vec<ReplyButton>,
    ) -> ApiResult<MessageResponse> {
        self.send_interactive(to, reply_buttons(body, buttons)).await
    }

    /// Sends an interactive list message
    pub async fn send_interactive_list(
        &self,
        to: &str,
        header: Option<&str>,
        body: &str,
        button_text: &str,
        sections: Vec<InteractiveSection>,
    ) -> ApiResult<MessageResponse> {
        self.send_interactive(to, list(header, body, button_text, sections))
            .await
    }

    /// Sends a call-to-action button that opens `url`
    pub async fn send_cta_url(
        &self,
        to: &str,
        body: &str,
        display_text: &str,
        url: &str,
    ) -> ApiResult<MessageResponse> {
        self.send_interactive(to, cta_url(body, display_text, url))
            .await
    }

    /// Sends a button that opens a WhatsApp Flow
    pub async fn send_flow(
        &self,
        to: &str,
        body: &str,
        parameters: FlowParameters,
    ) -> ApiResult<MessageResponse> {
        let action = InteractiveAction {
            name: Some("flow".to_string()),
            parameters: Some(serde_json::to_value(parameters)?),
            ..Default::default()
        };
        self.send_interactive(to, Interactive::new("flow", Some(body.to_string()), action))
            .await
    }

    /// Asks the user to share their location
    pub async fn send_location_request(&self, to: &str, body: &str) -> ApiResult<MessageResponse> {
        let action = InteractiveAction {
            name: Some("send_location".to_string()),
            ..Default::default()
        };
        self.send_interactive(
            to,
            Interactive::new("location_request_message", Some(body.to_string()), action),
        )
        .await
    }

    /// Sends a single catalog product
    pub async fn send_product(
        &self,
        to: &str,
        catalog_id: &str,
        product_retailer_id: &str,
        body: Option<&str>,
    ) -> ApiResult<MessageResponse> {
        let action = InteractiveAction {
            catalog_id: Some(catalog_id.to_string()),
            product_retailer_id: Some(product_retailer_id.to_string()),
            ..Default::default()
        };
        self.send_interactive(
            to,
            Interactive::new("product", body.map(str::to_string), action),
        )
        .await
    }

    /// Sends up to 30 products grouped in sections
    pub async fn send_product_list(
        &self,
        to: &str,
        catalog_id: &str,
        header: &str,
        body: &str,
        sections: Vec<InteractiveSection>,
    ) -> ApiResult<MessageResponse> {
        let action = InteractiveAction {
            catalog_id: Some(catalog_id.to_string()),
            sections,
            ..Default::default()
        };
        let interactive = Interactive::new("product_list", Some(body.to_string()), action)
            .with_header(InteractiveHeader::text(header));
        self.send_interactive(to, interactive).await
    }

    /// Sends the whole catalog, optionally with a product as thumbnail
    pub async fn send_catalog(
        &self,
        to: &str,
        body: &str,
        thumbnail_product_retailer_id: Option<&str>,
    ) -> ApiResult<MessageResponse> {
        let action = InteractiveAction {
            name: Some("catalog_message".to_string()),
            parameters: thumbnail_product_retailer_id.map(|id| {
                serde_json::json!({ "thumbnail_product_retailer_id": id })
            }),
            ..Default::default()
        };
        self.send_interactive(
            to,
            Interactive::new("catalog_message", Some(body.to_string()), action),
        )
        .await
    }

    /// Marks an inbound message (and every earlier one) as read
    pub async fn mark_as_read(&self, message_id: &str) -> ApiResult<SuccessResponse> {
        self.post_json(&self.phone_path("messages"), &ReadReceipt::new(message_id))
            .await
    }

    /// Marks `message_id` as read and shows a typing indicator for up to 25
    /// seconds or until the next message is sent
    pub async fn send_typing_indicator(&self, message_id: &str) -> ApiResult<SuccessResponse> {
        self.post_json(
            &self.phone_path("messages"),
            &ReadReceipt::new(message_id).with_typing_indicator(),
        )
        .await
    }
}

fn reply_buttons(body: &str, buttons: Vec<ReplyButton>) -> Interactive {
    let action = InteractiveAction {
        buttons,
        ..Default::default()
    };
    Interactive::new("button", Some(body.to_string()), action)
}

fn list(
    header: Option<&str>,
    body: &str,
    button_text: &str,
    sections: Vec<InteractiveSection>,
) -> Interactive {
    let action = InteractiveAction {
        button: Some(button_text.to_string()),
        sections,
        ..Default::default()
    };
    let interactive = Interactive::new("list", Some(body.to_string()), action);

    match header {
        Some(header) => interactive.with_header(InteractiveHeader::text(header)),
        None => interactive,
    }
}

fn cta_url(body: &str, display_text: &str, url: &str) -> Interactive {
    let action = InteractiveAction {
        name: Some("cta_url".to_string()),
        parameters: Some(serde_json::json!({
            "display_text": display_text,
            "url": url,
        })),
        ..Default::default()
    };
    Interactive::new("cta_url", Some(body.to_string()), action)
}

/// One-section list from `(id, title)` pairs
pub fn single_section(rows: impl IntoIterator<Item = (String, String)>) -> Vec<InteractiveSection> {
    vec![InteractiveSection::rows(
        None,
        rows.into_iter()
            .map(|(id, title)| InteractiveRow::new(id, title))
            .collect(),
    )]
}
