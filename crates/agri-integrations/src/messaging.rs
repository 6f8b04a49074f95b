//! LINE messaging: outbound push notifications and the signed inbound
//! webhook.
//!
//! Pushes are recorded in a per-tenant outbox instead of being sent to
//! the LINE platform.

use std::sync::Arc;

use agri_core::models::tenant::TenantId;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::IntegrationError;
use crate::store::{self, TenantStore};

type HmacSha256 = Hmac<Sha256>;

const OUTBOX_KEY: &str = "line:outbox";

/// Example user id shipped in sample configuration. Never a real user.
pub const PLACEHOLDER_USER_ID: &str = "Udeadbeefdeadbeefdeadbeefdeadbeef";

/// Header carrying the webhook body signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub channel_access_token: Option<String>,
    pub channel_secret: Option<String>,
}

impl LineConfig {
    fn usable(value: &Option<String>, placeholder: &str) -> Option<String> {
        value
            .as_deref()
            .filter(|v| !v.is_empty() && !v.contains(placeholder))
            .map(str::to_string)
    }

    /// Both credentials are set to something other than the sample
    /// placeholders.
    pub fn is_configured(&self) -> bool {
        Self::usable(&self.channel_access_token, "your_line_channel_access_token").is_some()
            && Self::usable(&self.channel_secret, "your_line_channel_secret").is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushedMessage {
    pub id: Uuid,
    pub user_id: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

/// A reply the bot would post back for one inbound event.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineReply {
    pub reply_token: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(default)]
    events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "replyToken", default)]
    reply_token: Option<String>,
    #[serde(default)]
    message: Option<WebhookMessage>,
}

#[derive(Debug, Deserialize)]
struct WebhookMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

fn acknowledgement(text: &str) -> String {
    format!("您好！我們已收到您的訊息：'{text}'。謝謝您的回覆！")
}

/// Base64 HMAC-SHA256 of `body` under `secret`, as LINE computes it.
pub fn sign_body(secret: &str, body: &[u8]) -> Result<String, IntegrationError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| IntegrationError::InvalidSignature)?;
    mac.update(body);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Pushed messages kept per tenant; older ones are dropped first.
pub const MAX_OUTBOX_PER_TENANT: usize = 1_000;

pub struct LineMessenger {
    store: Arc<dyn TenantStore>,
    access_token: Option<String>,
    channel_secret: Option<String>,
    retention: usize,
}

impl LineMessenger {
    pub fn new(store: Arc<dyn TenantStore>, config: &LineConfig) -> Self {
        Self {
            store,
            access_token: LineConfig::usable(
                &config.channel_access_token,
                "your_line_channel_access_token",
            ),
            channel_secret: LineConfig::usable(&config.channel_secret, "your_line_channel_secret"),
            retention: MAX_OUTBOX_PER_TENANT,
        }
    }

    /// Keep at most `retention` pushed messages per tenant.
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention.max(1);
        self
    }

    pub fn push_enabled(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn send(
        &self,
        tenant_id: TenantId,
        user_id: &str,
        message: &str,
    ) -> Result<PushedMessage, IntegrationError> {
        if self.access_token.is_none() {
            return Err(IntegrationError::NotConfigured("LINE messaging"));
        }
        if !user_id.starts_with('U') || user_id == PLACEHOLDER_USER_ID {
            warn!(tenant_id, user_id, "Rejected LINE push to invalid user id");
            return Err(IntegrationError::InvalidInput(format!(
                "invalid LINE user id: {user_id}"
            )));
        }
        if message.trim().is_empty() {
            return Err(IntegrationError::InvalidInput(
                "message must not be empty".into(),
            ));
        }

        let pushed = PushedMessage {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            message: message.to_string(),
            sent_at: Utc::now(),
        };
        store::modify(
            self.store.as_ref(),
            tenant_id,
            OUTBOX_KEY,
            |outbox: &mut Vec<PushedMessage>| {
                outbox.push(pushed.clone());
                store::retain_latest(outbox, self.retention);
                Ok(())
            },
        )?;

        info!(tenant_id, user_id, message_id = %pushed.id, "LINE push recorded");
        Ok(pushed)
    }

    /// Messages pushed on behalf of a tenant, oldest first.
    pub fn outbox(&self, tenant_id: TenantId) -> Result<Vec<PushedMessage>, IntegrationError> {
        store::load(self.store.as_ref(), tenant_id, OUTBOX_KEY)
    }

    /// Check the signature of a raw webhook body.
    pub fn verify_signature(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<(), IntegrationError> {
        let secret = self
            .channel_secret
            .as_deref()
            .ok_or(IntegrationError::NotConfigured("LINE webhook"))?;
        let signature = signature.ok_or(IntegrationError::InvalidSignature)?;
        let expected = STANDARD
            .decode(signature.trim())
            .map_err(|_| IntegrationError::InvalidSignature)?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| IntegrationError::InvalidSignature)?;
        mac.update(body);
        mac.verify_slice(&expected)
            .map_err(|_| IntegrationError::InvalidSignature)
    }

    /// Verify and dispatch a webhook delivery. Text messages get a canned
    /// acknowledgement; every other event is ignored.
    pub fn handle_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<Vec<LineReply>, IntegrationError> {
        self.verify_signature(body, signature)?;

        let parsed: WebhookBody = serde_json::from_slice(body)
            .map_err(|e| IntegrationError::InvalidInput(format!("malformed webhook body: {e}")))?;

        let replies: Vec<LineReply> = parsed
            .events
            .into_iter()
            .filter(|e| e.kind == "message")
            .filter_map(|e| {
                let message = e.message?;
                if message.kind != "text" {
                    return None;
                }
                Some(LineReply {
                    reply_token: e.reply_token?,
                    text: acknowledgement(&message.text.unwrap_or_default()),
                })
            })
            .collect();

        info!(replies = replies.len(), "LINE webhook handled");
        Ok(replies)
    }
}
