//! Shared value types.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One roster entry.
///
/// The year of `birthday` may come from a windowed two-digit year, so only
/// the month and day are authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub birthday: NaiveDate,
    /// Canonical contact address: digits only, country-code prefixed.
    pub contact: String,
}

impl Person {
    pub fn new(name: impl Into<String>, birthday: NaiveDate, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birthday,
            contact: contact.into(),
        }
    }

    /// Whether `today` is this person's birthday. The stored year is ignored.
    pub fn is_birthday_on(&self, today: NaiveDate) -> bool {
        self.birthday.day() == today.day() && self.birthday.month() == today.month()
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.contact)
    }
}

/// Who the greetings are signed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderIdentity {
    pub name: String,
    pub number: String,
}
