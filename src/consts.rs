pub const GRAPH_API_BASE_URL: &str = "https://graph.facebook.com";
pub const GRAPH_API_VERSION: &str = "v22.0";
pub const MESSAGING_PRODUCT: &str = "whatsapp";

pub const WEBHOOK_PATH: &str = "/webhook";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
