//! # Wishbot Channels
//! Messaging transports behind the [`Channel`] trait.
//!
//! - `whatsapp`: WhatsApp Business Cloud API
//! - `dry_run`: log-only transport for dry runs

pub mod dry_run;
pub mod whatsapp;

use std::time::Duration;

use wishbot_core::config::{ChannelConfig, ChannelKind};
use wishbot_core::error::{Result, WishbotError};
use wishbot_core::traits::Channel;

pub use dry_run::{LogChannel, Outbox, SentMessage};
pub use whatsapp::WhatsAppChannel;

/// Build the configured transport. `dry_run` forces the log channel.
pub fn build_channel(config: &ChannelConfig, dry_run: bool) -> Box<dyn Channel> {
    let kind = if dry_run { ChannelKind::Log } else { config.kind };
    match kind {
        ChannelKind::Whatsapp => Box::new(WhatsAppChannel::new(config.whatsapp.clone())),
        ChannelKind::Log => Box::new(LogChannel::new()),
    }
}

/// Connect and wait until the transport reports itself ready.
///
/// Polls `is_connected` once per second up to `ready_timeout`, then pauses
/// for `settle` so the session can finish syncing before the first send.
pub async fn connect_and_wait(
    channel: &mut dyn Channel,
    ready_timeout: Duration,
    settle: Duration,
) -> Result<()> {
    channel.connect().await?;

    tracing::info!("⏳ Waiting for {} to be ready...", channel.name());
    let deadline = tokio::time::Instant::now() + ready_timeout;
    while !channel.is_connected() {
        if tokio::time::Instant::now() >= deadline {
            return Err(WishbotError::Timeout(format!(
                "{} not ready after {}s",
                channel.name(),
                ready_timeout.as_secs()
            )));
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    if !settle.is_zero() {
        tracing::info!("🔄 Allowing {}s for session sync...", settle.as_secs());
        tokio::time::sleep(settle).await;
    }

    tracing::info!("✅ {} is ready", channel.name());
    Ok(())
}
