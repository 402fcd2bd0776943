//! Messaging transport boundary.

use async_trait::async_trait;

use crate::error::Result;

/// A messaging transport able to deliver plain text to a canonical address.
///
/// The core only ever talks to a transport through these operations; session
/// storage, pairing and reconnection are the implementation's business.
/// Callers bound `send_text` with their own timeout.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Establish (or verify) the session.
    async fn connect(&mut self) -> Result<()>;

    /// Release the session.
    async fn disconnect(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;

    /// Send `body` to the canonical address `to`.
    async fn send_text(&self, to: &str, body: &str) -> Result<()>;
}
