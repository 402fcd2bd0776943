//! Log-only channel for dry runs.
//!
//! Nothing leaves the machine: every message is written to the log and kept
//! in a shared [`Outbox`] so callers can inspect what would have been sent.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wishbot_core::error::{Result, WishbotError};
use wishbot_core::traits::Channel;

/// A message accepted by a [`LogChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub body: String,
}

/// Shared view of a [`LogChannel`]'s state. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    messages: Arc<Mutex<Vec<SentMessage>>>,
    connected: Arc<AtomicBool>,
}

impl Outbox {
    /// Snapshot of accepted messages in send order.
    pub fn messages(&self) -> Vec<SentMessage> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the owning channel is currently connected.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn push(&self, message: SentMessage) {
        if let Ok(mut m) = self.messages.lock() {
            m.push(message);
        }
    }
}

/// Dry-run transport.
#[derive(Debug, Default)]
pub struct LogChannel {
    outbox: Outbox,
    failing: HashSet<String>,
    stalling: HashSet<String>,
}

impl LogChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every send to `address`.
    pub fn failing_for(mut self, address: impl Into<String>) -> Self {
        self.failing.insert(address.into());
        self
    }

    /// Never complete a send to `address`, like a transport that hangs.
    pub fn stalling_for(mut self, address: impl Into<String>) -> Self {
        self.stalling.insert(address.into());
        self
    }

    pub fn outbox(&self) -> Outbox {
        self.outbox.clone()
    }
}

#[async_trait]
impl Channel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    async fn connect(&mut self) -> Result<()> {
        self.outbox.connected.store(true, Ordering::SeqCst);
        tracing::info!("📝 Log channel: connected (dry run, nothing is delivered)");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.outbox.connected.store(false, Ordering::SeqCst);
        tracing::info!("📝 Log channel: disconnected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.outbox.is_connected()
    }

    async fn send_text(&self, to: &str, body: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(WishbotError::NotConnected(self.name().into()));
        }
        if self.failing.contains(to) {
            return Err(WishbotError::Channel(format!("delivery to {to} rejected")));
        }
        if self.stalling.contains(to) {
            tracing::debug!("Log channel: send to {to} stalled");
            std::future::pending::<()>().await;
        }

        tracing::info!("📤 [dry-run] → {to}\n{body}");
        self.outbox.push(SentMessage {
            to: to.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
