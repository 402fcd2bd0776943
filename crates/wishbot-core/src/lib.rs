//! # Wishbot Core
//! Shared building blocks for the Wishbot workspace: configuration, error
//! types, the `Person` record, and the transport/clock traits that the
//! scheduler depends on.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::WishbotConfig;
pub use error::{Result, WishbotError};
pub use types::{Person, SenderIdentity};
