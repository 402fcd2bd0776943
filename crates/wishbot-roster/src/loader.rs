//! Roster loading from CSV exports.
//!
//! Columns are positional. The header row is only checked for the expected
//! names so that a reordered export shows up as a warning in the log instead
//! of silently reading the wrong fields.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use wishbot_core::error::{Result, WishbotError};
use wishbot_core::types::Person;

use crate::normalize::{normalize_contact, parse_birthday};

/// Fixed column positions of the roster export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterSchema {
    pub name: usize,
    pub primary_contact: usize,
    pub secondary_contact: usize,
    pub birthday: usize,
    /// Rows shorter than this are skipped.
    pub min_fields: usize,
}

impl Default for RosterSchema {
    fn default() -> Self {
        Self {
            name: 5,
            primary_contact: 14,
            secondary_contact: 15,
            birthday: 17,
            min_fields: 18,
        }
    }
}

impl RosterSchema {
    /// Header names expected at each used position.
    pub fn expected_headers(&self) -> [(usize, &'static str); 4] {
        [
            (self.name, "Member Name(Eng.)"),
            (self.primary_contact, "Mobile No. 1"),
            (self.secondary_contact, "Whatsapp No. 2"),
            (self.birthday, "DOB"),
        ]
    }

    /// Compare a header row against the expected names. Returns one message per mismatch.
    pub fn check_header(&self, header: &[String]) -> Vec<String> {
        self.expected_headers()
            .iter()
            .filter_map(|(idx, expected)| {
                let found = header
                    .get(*idx)
                    .map(|h| h.trim_start_matches('\u{feff}').trim())
                    .unwrap_or("");
                if found.eq_ignore_ascii_case(expected) {
                    None
                } else {
                    Some(format!(
                        "column {} expected '{}', found '{}'",
                        idx + 1,
                        expected,
                        found
                    ))
                }
            })
            .collect()
    }
}

/// Why a data row was left out of the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The CSV reader could not decode the record.
    Malformed(String),
    TooFewFields { found: usize },
    EmptyName,
    EmptyBirthday,
    InvalidBirthday(String),
    NoContact,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Malformed(e) => write!(f, "malformed record: {e}"),
            SkipReason::TooFewFields { found } => {
                write!(f, "not enough columns (got {found})")
            }
            SkipReason::EmptyName => write!(f, "empty name"),
            SkipReason::EmptyBirthday => write!(f, "empty birthday"),
            SkipReason::InvalidBirthday(raw) => write!(f, "invalid date format '{raw}'"),
            SkipReason::NoContact => write!(f, "no phone number available"),
        }
    }
}

/// A skipped data row. `row` is 1-based and counts the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: usize,
    pub name: Option<String>,
    pub reason: SkipReason,
}

/// The loaded, immutable roster in source row order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    people: Vec<Person>,
    skipped: Vec<SkippedRow>,
    header_warnings: Vec<String>,
    rows_read: usize,
}

impl Roster {
    pub fn from_people(people: Vec<Person>) -> Self {
        Self {
            rows_read: people.len(),
            people,
            ..Self::default()
        }
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }

    /// Data rows read from the source, header excluded.
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn rows_skipped(&self) -> usize {
        self.skipped.len()
    }

    pub fn header_warnings(&self) -> &[String] {
        &self.header_warnings
    }

    /// People whose birthday (day and month) falls on `today`.
    pub fn birthdays_on(&self, today: NaiveDate) -> impl Iterator<Item = &Person> {
        self.people.iter().filter(move |p| p.is_birthday_on(today))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Person> {
        self.people.iter()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Person;
    type IntoIter = std::slice::Iter<'a, Person>;

    fn into_iter(self) -> Self::IntoIter {
        self.people.iter()
    }
}

/// Turns raw rows into a [`Roster`].
#[derive(Debug, Clone)]
pub struct RosterLoader {
    schema: RosterSchema,
    country_code: String,
}

impl RosterLoader {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            schema: RosterSchema::default(),
            country_code: country_code.into(),
        }
    }

    pub fn with_schema(mut self, schema: RosterSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn schema(&self) -> &RosterSchema {
        &self.schema
    }

    /// Load a roster file. A missing or unreadable file is an error; bad rows are not.
    pub fn load(&self, path: &Path) -> Result<Roster> {
        let file = std::fs::File::open(path)?;
        let roster = self.load_from_reader(file)?;
        tracing::info!(
            "📇 Loaded {} people from {} ({} of {} rows skipped)",
            roster.len(),
            path.display(),
            roster.rows_skipped(),
            roster.rows_read()
        );
        Ok(roster)
    }

    /// Load a roster from any CSV byte source.
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<Roster> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let rows: Vec<std::result::Result<Vec<String>, String>> = rdr
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(str::to_string).collect())
                    .map_err(|e| e.to_string())
            })
            .collect();

        if rows.is_empty() {
            return Err(WishbotError::Roster("roster source is empty".into()));
        }

        tracing::debug!("Parsing roster: {} rows found", rows.len());
        Ok(self.parse_rows(rows))
    }

    /// Build a roster from already split rows. Row 0 is the header.
    pub fn parse_rows<I>(&self, rows: I) -> Roster
    where
        I: IntoIterator<Item = std::result::Result<Vec<String>, String>>,
    {
        let mut roster = Roster::default();

        for (idx, row) in rows.into_iter().enumerate() {
            let row_no = idx + 1;
            if idx == 0 {
                match row {
                    Ok(header) => {
                        for warning in self.schema.check_header(&header) {
                            tracing::warn!("⚠️ Roster header mismatch: {warning}");
                            roster.header_warnings.push(warning);
                        }
                    }
                    Err(e) => {
                        let warning = format!("unreadable header row: {e}");
                        tracing::warn!("⚠️ Roster header mismatch: {warning}");
                        roster.header_warnings.push(warning);
                    }
                }
                continue;
            }

            roster.rows_read += 1;
            let parsed = row
                .map_err(|e| (None, SkipReason::Malformed(e)))
                .and_then(|fields| self.parse_row(&fields));

            match parsed {
                Ok(person) => roster.people.push(person),
                Err((name, reason)) => {
                    match &name {
                        Some(name) => tracing::warn!("Skipping {name} (row {row_no}): {reason}"),
                        None => tracing::warn!("Skipping row {row_no}: {reason}"),
                    }
                    roster.skipped.push(SkippedRow {
                        row: row_no,
                        name,
                        reason,
                    });
                }
            }
        }

        roster
    }

    fn parse_row(
        &self,
        fields: &[String],
    ) -> std::result::Result<Person, (Option<String>, SkipReason)> {
        let s = &self.schema;
        if fields.len() < s.min_fields {
            return Err((None, SkipReason::TooFewFields { found: fields.len() }));
        }

        let name = fields[s.name].trim();
        if name.is_empty() {
            return Err((None, SkipReason::EmptyName));
        }
        let skip = |reason: SkipReason| Err((Some(name.to_string()), reason));

        let raw_birthday = fields[s.birthday].trim();
        if raw_birthday.is_empty() {
            return skip(SkipReason::EmptyBirthday);
        }

        let secondary = fields[s.secondary_contact].trim();
        let primary = fields[s.primary_contact].trim();
        let raw_contact = if secondary.is_empty() { primary } else { secondary };
        let Some(contact) = normalize_contact(raw_contact, &self.country_code) else {
            return skip(SkipReason::NoContact);
        };

        let Some(birthday) = parse_birthday(raw_birthday) else {
            return skip(SkipReason::InvalidBirthday(raw_birthday.to_string()));
        };

        Ok(Person {
            name: name.to_string(),
            birthday,
            contact,
        })
    }
}
