//! # wacloud
//!
//! WhatsApp Cloud API integration: webhook signature validation, the
//! subscription handshake, extraction of messages and statuses from
//! deliveries, an ntex receiver for both endpoints, and an outbound client
//! for the Graph API.

pub mod client;
pub mod config;
pub mod consts;
pub mod logger;
pub mod metric;
pub mod webhook;
