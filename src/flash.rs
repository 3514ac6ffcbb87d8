//! # Flash Messages
//!
//! One-shot notifications carried across a POST → redirect → GET cycle in a
//! signed cookie. A queue is read from the request, grows while the handler
//! runs, and is either written back (redirect) or drained into the rendered
//! page (render), after which the cookie is cleared.
//!
//! Cookie value: `base64url(json(messages)) "." base64url(hmac_sha256(payload))`.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::warn;

/// Cookie carrying pending flash messages
pub const FLASH_COOKIE: &str = "dashboard_flash";

/// Flash severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Warning,
    Error,
}

impl FlashLevel {
    /// CSS class used by the page layout
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Warning => "warning",
            FlashLevel::Error => "error",
        }
    }
}

/// A single flash message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub text: String,
}

impl Flash {
    pub fn new(level: FlashLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(FlashLevel::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(FlashLevel::Error, text)
    }
}

/// Messages pending for the next render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashQueue {
    messages: Vec<Flash>,
    from_cookie: bool,
}

impl FlashQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, flash: Flash) {
        self.messages.push(flash);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(Flash::success(text));
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(Flash::warning(text));
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Flash::error(text));
    }

    pub fn messages(&self) -> &[Flash] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True if the request carried a flash cookie that must be cleared
    pub fn came_from_cookie(&self) -> bool {
        self.from_cookie
    }

    /// Drain every message for rendering
    pub fn take(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.messages)
    }
}

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies the flash cookie
#[derive(Clone)]
pub struct FlashCodec {
    key: Vec<u8>,
}

impl FlashCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(&self.key).ok()
    }

    /// Serialize and sign a set of messages
    pub fn encode(&self, messages: &[Flash]) -> Option<String> {
        let json = serde_json::to_vec(messages).ok()?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Some(format!("{}.{}", payload, signature))
    }

    /// Verify and decode a cookie value; `None` if tampered or malformed
    pub fn decode(&self, value: &str) -> Option<Vec<Flash>> {
        let (payload, signature) = value.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;
        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }

    /// Queue seeded from the request's flash cookie
    pub fn read(&self, headers: &HeaderMap) -> FlashQueue {
        let Some(raw) = find_cookie(headers, FLASH_COOKIE) else {
            return FlashQueue::new();
        };
        let messages = self.decode(&raw).unwrap_or_else(|| {
            warn!("discarding flash cookie with bad signature");
            Vec::new()
        });
        FlashQueue {
            messages,
            from_cookie: true,
        }
    }

    /// `Set-Cookie` value carrying the queue to the next request
    pub fn store_cookie(&self, queue: &FlashQueue) -> Option<HeaderValue> {
        if queue.is_empty() {
            return if queue.came_from_cookie() {
                Some(clear_cookie())
            } else {
                None
            };
        }
        let value = self.encode(queue.messages())?;
        HeaderValue::from_str(&format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            FLASH_COOKIE, value
        ))
        .ok()
    }
}

/// `Set-Cookie` value expiring the flash cookie
pub fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("dashboard_flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
