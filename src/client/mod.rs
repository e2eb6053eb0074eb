//! # WhatsApp Cloud API Client
//!
//! Thin wrapper over the Graph API. Every operation builds one request,
//! attaches the bearer token, sends it, and returns the parsed JSON response
//! or an [`ApiError`] carrying the provider's error body verbatim. There is no
//! retry, backoff or rate limiting here.
//!
//! Operations are grouped by API area:
//!
//! - [`messages`] - sending messages, read receipts, typing indicator
//! - [`media`] - upload, lookup, download and deletion of media
//! - [`templates`] - message template management
//! - [`flows`] - WhatsApp Flows management
//! - [`analytics`] - messaging, conversation and template analytics
//! - [`qr`] - QR codes with prefilled messages
//! - [`commerce`] - commerce settings and catalog products
//! - [`account`] - business profile, phone numbers, app subscriptions,
//!   credit lines and official business account

pub mod account;
pub mod analytics;
pub mod commerce;
pub mod error;
pub mod flows;
pub mod media;
pub mod messages;
pub mod qr;
pub mod schemas;
pub mod templates;

pub use error::{ApiError, ApiResult, GraphError};
pub use schemas::*;

use crate::{consts, metric};
use serde::{Serialize, de::DeserializeOwned};

/// Connection settings for [`WhatsAppClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// 🔒 SENSITIVE: system user or temporary access token
    pub access_token: String,
    /// Sender phone number ID
    pub phone_number_id: String,
    /// WhatsApp Business Account ID, needed by template, flow, analytics and
    /// phone number listing operations
    pub business_account_id: Option<String>,
    /// Graph API version, e.g. "v22.0"
    pub api_version: String,
    /// Graph API host, without trailing slash
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(access_token: impl Into<String>, phone_number_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            phone_number_id: phone_number_id.into(),
            business_account_id: None,
            api_version: consts::GRAPH_API_VERSION.to_string(),
            base_url: consts::GRAPH_API_BASE_URL.to_string(),
        }
    }

    pub fn with_business_account(mut self, business_account_id: impl Into<String>) -> Self {
        self.business_account_id = Some(business_account_id.into());
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_token", &"***")
            .field("phone_number_id", &self.phone_number_id)
            .field("business_account_id", &self.business_account_id)
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// WhatsApp API client for sending messages and managing the account
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    /// HTTP client for making API requests
    client: reqwest::Client,
    config: ClientConfig,
}

impl WhatsAppClient {
    /// Creates a new client with a default `reqwest::Client`
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    /// Creates a new client on top of an existing `reqwest::Client` (proxy,
    /// timeouts and TLS settings stay with the caller)
    pub fn with_http_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Versioned Graph API URL for `path` (no leading slash).
    pub fn url(&self, path: &str) -> String {
        format!(
            "{base}/{version}/{path}",
            base = self.config.base_url,
            version = self.config.api_version
        )
    }

    /// `{phone_number_id}/{suffix}`, or the phone number node itself when
    /// `suffix` is empty.
    fn phone_path(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            return self.config.phone_number_id.clone();
        }
        format!("{}/{suffix}", self.config.phone_number_id)
    }

    /// `{business_account_id}/{suffix}`
    fn business_path(&self, suffix: &str) -> ApiResult<String> {
        let id = self
            .config
            .business_account_id
            .as_deref()
            .ok_or(ApiError::MissingBusinessAccount)?;

        if suffix.is_empty() {
            return Ok(id.to_string());
        }
        Ok(format!("{id}/{suffix}"))
    }

    /// Request builder for `path` with the bearer token attached.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(&self.config.access_token)
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<R> {
        self.send(self.request(reqwest::Method::GET, path).query(query))
            .await
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(self.request(reqwest::Method::POST, path).json(body))
            .await
    }

    /// POST whose parameters travel in the query string (no body)
    async fn post_query<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<R> {
        self.send(self.request(reqwest::Method::POST, path).query(query))
            .await
    }

    async fn post_multipart<R: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> ApiResult<R> {
        self.send(self.request(reqwest::Method::POST, path).multipart(form))
            .await
    }

    async fn delete_json<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<R> {
        self.send(self.request(reqwest::Method::DELETE, path).query(query))
            .await
    }

    /// Sends the request and maps a non-2xx status to [`ApiError::Provider`].
    async fn send<R: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ApiResult<R> {
        let raw = self.send_raw(request).await?.bytes().await?;

        Ok(serde_json::from_slice(&raw)?)
    }

    async fn send_raw(&self, request: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = request.send().await.inspect_err(|e| {
            metric::incr_api_call_statds("transport_error");
            tracing::warn!("WhatsApp API request failed: {e}");
        })?;

        let status = response.status();
        tracing::debug!(
            "WhatsApp API {path} -> {status}",
            path = response.url().path()
        );

        if status.is_success() {
            metric::incr_api_call_statds("success");
            return Ok(response);
        }

        metric::incr_api_call_statds("provider_error");
        let raw = response.bytes().await?;
        let body = serde_json::from_slice(&raw)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&raw).into()));

        Err(ApiError::Provider {
            status: status.as_u16(),
            body,
        })
    }
}
