//! # Wishbot Roster
//! Loads the member roster from a CSV export into canonical [`Person`] records.
//!
//! ```text
//! birthdays.csv ──► RosterLoader ──► Roster (ordered, immutable)
//!                     ├── parse_birthday     (ordered date layouts, 2-digit year window)
//!                     └── normalize_contact  (strip punctuation, add country code)
//! ```
//!
//! [`Person`]: wishbot_core::types::Person

pub mod bootstrap;
pub mod loader;
pub mod normalize;

pub use bootstrap::{load_or_bootstrap, write_example_roster};
pub use loader::{Roster, RosterLoader, RosterSchema, SkipReason, SkippedRow};
pub use normalize::{DATE_LAYOUTS, normalize_contact, parse_birthday};
