use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use serenity::{async_trait, constants::MESSAGE_CODE_LIMIT};
use tracing::{error, info, warn};

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookReply {
    pub status: u16,
    pub body: String,
}

/// The single HTTP call the notifier needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post_json(&self, url: &str, body: Value) -> Result<WebhookReply>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: Value) -> Result<WebhookReply> {
        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(WebhookReply { status, body })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Skipped,
    Delivered,
    Rejected { status: u16, body: String },
    Failed(String),
}

pub struct Notifier<T = ReqwestTransport> {
    webhook_url: Option<String>,
    transport: T,
}

impl Notifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self::with_transport(webhook_url, ReqwestTransport::new())
    }
}

impl<T: WebhookTransport> Notifier<T> {
    pub fn with_transport(webhook_url: Option<String>, transport: T) -> Self {
        Self {
            webhook_url: webhook_url.filter(|url| !url.is_empty()),
            transport,
        }
    }

    /// Posts `content` to the webhook. Failures are logged and reported, never raised.
    pub async fn send(&self, content: &str) -> Delivery {
        let Some(url) = &self.webhook_url else {
            info!("No Discord webhook URL set.");
            return Delivery::Skipped;
        };

        if content.chars().count() > MESSAGE_CODE_LIMIT {
            warn!(
                "Message is {} characters, Discord may reject anything over {MESSAGE_CODE_LIMIT}",
                content.chars().count()
            );
        }

        let body = match serde_json::to_value(WebhookMessage { content }) {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to send to Discord: {e}");
                return Delivery::Failed(e.to_string());
            }
        };

        match self.transport.post_json(url, body).await {
            Ok(WebhookReply { status: 204, .. }) => {
                info!("Message sent to Discord.");
                Delivery::Delivered
            }
            Ok(WebhookReply { status, body }) => {
                warn!("Discord webhook error: {body}");
                Delivery::Rejected { status, body }
            }
            Err(e) => {
                error!("Failed to send to Discord: {e:#}");
                Delivery::Failed(format!("{e:#}"))
            }
        }
    }
}
