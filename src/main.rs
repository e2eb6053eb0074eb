//! # WhatsApp Webhook Receiver
//!
//! Serves `GET /webhook` (subscription handshake) and `POST /webhook`
//! (signed deliveries). Inbound messages and statuses are logged, and
//! optionally acknowledged with a read receipt.

use anyhow::Context;
use async_trait::async_trait;
use envconfig::Envconfig;
use logfire::config::MetricsOptions;
use ntex::web;
use std::sync::Arc;
use wacloud::{
    client::WhatsAppClient,
    config::AppConfig,
    logger,
    webhook::{
        EventHandler, Message, Status,
        routes::{self, WebhookState},
        schemas::ChangeValue,
    },
};

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let app_config = AppConfig::init_from_env().context("failed to load app config")?;

    // Initialize logging and metrics
    let shutdown_handler = match &app_config.logfire_token {
        Some(token) => Some(
            logfire::configure()
                .install_panic_handler()
                .with_metrics(Some(MetricsOptions::default()))
                .send_to_logfire(logfire::config::SendToLogfire::Yes)
                .with_token(token)
                .finish()?,
        ),
        None => {
            let level = if app_config.is_prod() {
                log::LevelFilter::Info
            } else {
                log::LevelFilter::Debug
            };
            logger::setup_simple_logger(level)?;
            None
        }
    };

    let state = WebhookState {
        config: app_config.webhook_config(),
        dispatch: app_config.dispatch_mode()?,
        handler: Arc::new(ReceiptHandler {
            client: WhatsAppClient::new(app_config.client_config()),
            mark_as_read: app_config.webhook_mark_as_read,
        }),
    };

    log::info!(
        "listening on {host}:{port} ({dispatch} dispatch)",
        host = app_config.web_server_host,
        port = app_config.web_server_port,
        dispatch = state.dispatch
    );

    web::server(move || {
        web::App::new()
            .wrap(web::middleware::Logger::default())
            .state(state.clone())
            .configure(routes::webhook)
    })
    .bind(app_config.server_addr())?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    if let Some(handler) = shutdown_handler {
        handler.shutdown()?;
    }

    Ok(())
}

/// Logs every event and, when enabled, marks inbound messages as read.
struct ReceiptHandler {
    client: WhatsAppClient,
    mark_as_read: bool,
}

#[async_trait]
impl EventHandler for ReceiptHandler {
    async fn on_message(&self, message: &Message, value: &ChangeValue) -> anyhow::Result<()> {
        let sender = value
            .contact_for(message)
            .and_then(|contact| contact.profile.as_ref())
            .map_or(message.from.as_str(), |profile| profile.name.as_str());

        tracing::info!(
            "message {id} ({kind}) from {sender}",
            id = message.id,
            kind = message.msg_type
        );

        if self.mark_as_read {
            self.client
                .mark_as_read(&message.id)
                .await
                .with_context(|| format!("failed to mark {} as read", message.id))?;
        }

        Ok(())
    }

    async fn on_status(&self, status: &Status, _value: &ChangeValue) -> anyhow::Result<()> {
        tracing::info!(
            "message {id} to {recipient} is {kind:?}",
            id = status.id,
            recipient = status.recipient_id,
            kind = status.status
        );

        for error in &status.errors {
            tracing::warn!("message {id} failed: {error:?}", id = status.id);
        }

        Ok(())
    }
}
