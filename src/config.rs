//! Webhook receiver configuration.
//!
//! Everything is read from environment variables by the binary. The library
//! itself never touches the environment: [`AppConfig`] hands out explicit
//! [`WebhookConfig`] and [`ClientConfig`] values instead.
//!
//! # Security Notes
//! - Sensitive fields are marked and must never be logged
//! - `Debug` is implemented by hand and masks them

use crate::{client::ClientConfig, webhook::DispatchMode, webhook::WebhookConfig};
use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(from = "ENV", default = "local")]
    pub env: String,

    /// 🔒 SENSITIVE: Cloud API access token
    #[envconfig(from = "WHATSAPP_ACCESS_TOKEN")]
    pub access_token: String,

    /// Sender phone number ID (SEMI-SENSITIVE)
    #[envconfig(from = "WHATSAPP_PHONE_NUMBER_ID")]
    pub phone_number_id: String,

    /// WhatsApp Business Account ID (SEMI-SENSITIVE)
    #[envconfig(from = "WHATSAPP_BUSINESS_ACCOUNT_ID")]
    pub business_account_id: Option<String>,

    /// Graph API version (NON-SENSITIVE)
    #[envconfig(from = "WHATSAPP_API_VERSION", default = "v22.0")]
    pub api_version: String,

    /// 🔒 SENSITIVE: App secret used to sign webhook deliveries
    #[envconfig(from = "WHATSAPP_APP_SECRET")]
    pub app_secret: String,

    /// 🔒 SENSITIVE: Token echoed back by the subscription handshake
    #[envconfig(from = "WHATSAPP_VERIFY_TOKEN")]
    pub verify_token: String,

    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(from = "WEB_SERVER_HOST", default = "0.0.0.0")]
    pub web_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(from = "WEB_SERVER_PORT", default = "8080")]
    pub web_server_port: u16,

    /// "first" or "all" events per delivery
    #[envconfig(from = "WEBHOOK_DISPATCH", default = "first")]
    pub webhook_dispatch: String,

    /// Send a read receipt for every inbound message
    #[envconfig(from = "WEBHOOK_MARK_AS_READ", default = "false")]
    pub webhook_mark_as_read: bool,

    /// 🔒 SENSITIVE: Logfire write token, console logging when unset
    #[envconfig(from = "LOGFIRE_TOKEN")]
    pub logfire_token: Option<String>,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    pub fn webhook_config(&self) -> WebhookConfig {
        WebhookConfig::new(&self.app_secret, &self.verify_token)
    }

    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.access_token, &self.phone_number_id)
            .with_api_version(&self.api_version);

        match &self.business_account_id {
            Some(id) => config.with_business_account(id),
            None => config,
        }
    }

    /// Parsed `WEBHOOK_DISPATCH`
    pub fn dispatch_mode(&self) -> anyhow::Result<DispatchMode> {
        self.webhook_dispatch
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid WEBHOOK_DISPATCH: {e}"))
    }

    pub fn server_addr(&self) -> (String, u16) {
        (self.web_server_host.clone(), self.web_server_port)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("access_token", &"***")
            .field("phone_number_id", &self.phone_number_id)
            .field("business_account_id", &self.business_account_id)
            .field("api_version", &self.api_version)
            .field("app_secret", &"***")
            .field("verify_token", &"***")
            .field("web_server_host", &self.web_server_host)
            .field("web_server_port", &self.web_server_port)
            .field("webhook_dispatch", &self.webhook_dispatch)
            .field("webhook_mark_as_read", &self.webhook_mark_as_read)
            .field("logfire_token", &self.logfire_token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env() -> HashMap<String, String> {
        HashMap::from([
            ("WHATSAPP_ACCESS_TOKEN".to_string(), "EAAG-token".to_string()),
            ("WHATSAPP_PHONE_NUMBER_ID".to_string(), "106540352242922".to_string()),
            ("WHATSAPP_APP_SECRET".to_string(), "app-secret".to_string()),
            ("WHATSAPP_VERIFY_TOKEN".to_string(), "verify-me".to_string()),
        ])
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::init_from_hashmap(&env()).unwrap();

        assert_eq!(config.env, "local");
        assert!(!config.is_prod());
        assert_eq!(config.server_addr(), ("0.0.0.0".to_string(), 8080));
        assert_eq!(config.api_version, "v22.0");
        assert_eq!(config.dispatch_mode().unwrap(), DispatchMode::FirstEvent);
        assert!(!config.webhook_mark_as_read);
        assert!(config.business_account_id.is_none());
        assert!(config.logfire_token.is_none());
    }

    #[test]
    fn test_missing_secret_fails() {
        let mut vars = env();
        vars.remove("WHATSAPP_APP_SECRET");

        assert!(AppConfig::init_from_hashmap(&vars).is_err());
    }

    #[test]
    fn test_derived_configs() {
        let mut vars = env();
        vars.insert("WHATSAPP_BUSINESS_ACCOUNT_ID".into(), "102290129340398".into());
        vars.insert("WEBHOOK_DISPATCH".into(), "all".into());
        let config = AppConfig::init_from_hashmap(&vars).unwrap();

        let client = config.client_config();
        assert_eq!(client.business_account_id.as_deref(), Some("102290129340398"));
        assert_eq!(client.phone_number_id, "106540352242922");
        assert_eq!(config.dispatch_mode().unwrap(), DispatchMode::AllEvents);

        let webhook = config.webhook_config();
        assert_eq!(webhook.verify_token, "verify-me");
    }

    #[test]
    fn test_invalid_dispatch_mode() {
        let mut vars = env();
        vars.insert("WEBHOOK_DISPATCH".into(), "sometimes".into());
        let config = AppConfig::init_from_hashmap(&vars).unwrap();

        assert!(config.dispatch_mode().is_err());
    }

    #[test]
    fn test_debug_masks_secrets() {
        let config = AppConfig::init_from_hashmap(&env()).unwrap();
        let rendered = format!("{config:?}");

        assert!(!rendered.contains("EAAG-token"));
        assert!(!rendered.contains("app-secret"));
        assert!(!rendered.contains("verify-me"));
    }
}
