use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::WebhookTarget;
use crate::types::Giveaway;

/// Embed accent color (green).
pub const EMBED_COLOR: u32 = 5_763_719;

pub const FOOTER_TEXT: &str = "Free Game Alert • GamerPower API";

// Discord embed limits, in characters.
const MAX_TITLE_CHARS: usize = 256;
const MAX_DESCRIPTION_CHARS: usize = 4096;
const MAX_FIELD_VALUE_CHARS: usize = 1024;

/// Delivers one alert per newly discovered giveaway.
#[async_trait]
pub trait Notifier {
    async fn send(&self, giveaway: &Giveaway) -> Result<()>;
}

/// Discord webhook execute body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookMessage {
    pub username: String,
    pub avatar_url: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub url: String,
    pub color: u32,
    pub image: EmbedImage,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl EmbedField {
    fn inline(name: &str, value: Option<&str>, fallback: &str) -> Self {
        let value = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(fallback);
        Self {
            name: name.to_string(),
            value: clip(value, MAX_FIELD_VALUE_CHARS),
            inline: true,
        }
    }
}

/// Format a giveaway as a single-embed webhook message.
pub fn build_message(giveaway: &Giveaway, username: &str, avatar_url: &str) -> WebhookMessage {
    let embed = Embed {
        title: clip(&giveaway.title, MAX_TITLE_CHARS),
        description: clip(&giveaway.description, MAX_DESCRIPTION_CHARS),
        url: giveaway.url.clone(),
        color: EMBED_COLOR,
        image: EmbedImage {
            url: giveaway.image_url.clone(),
        },
        fields: vec![
            EmbedField::inline("Worth", giveaway.worth.as_deref(), "N/A"),
            EmbedField::inline("Platform", Some(giveaway.platforms.as_str()), "N/A"),
            EmbedField::inline("End Date", giveaway.end_date.as_deref(), "Unknown"),
        ],
        footer: EmbedFooter {
            text: FOOTER_TEXT.to_string(),
        },
    };

    WebhookMessage {
        username: username.to_string(),
        avatar_url: avatar_url.to_string(),
        embeds: vec![embed],
    }
}

/// Cut `s` to at most `max` chars, marking the cut with `…`.
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Posts alerts to a Discord webhook.
pub struct DiscordWebhook {
    http: reqwest::Client,
    target: WebhookTarget,
}

impl DiscordWebhook {
    pub fn new(target: WebhookTarget, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, target })
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn send(&self, giveaway: &Giveaway) -> Result<()> {
        let message = build_message(giveaway, &self.target.username, &self.target.avatar_url);
        let resp = self
            .http
            .post(self.target.url.clone())
            .json(&message)
            .send()
            .await
            .context("webhook request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<body unreadable: {e}>"));
            anyhow::bail!("webhook returned {status}: {body}");
        }
        debug!("Webhook accepted giveaway {} ({status})", giveaway.id);
        Ok(())
    }
}

/// Dry-run notifier: logs the payload it would have posted.
pub struct LogNotifier {
    username: String,
    avatar_url: String,
}

impl LogNotifier {
    pub fn new(target: &WebhookTarget) -> Self {
        Self {
            username: target.username.clone(),
            avatar_url: target.avatar_url.clone(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, giveaway: &Giveaway) -> Result<()> {
        let message = build_message(giveaway, &self.username, &self.avatar_url);
        let json = serde_json::to_string(&message).context("failed to serialize message")?;
        info!("[dry-run] would post giveaway {}: {json}", giveaway.id);
        Ok(())
    }
}
