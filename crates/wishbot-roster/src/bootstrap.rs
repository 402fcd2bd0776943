//! First-run bootstrap: write an example roster when none exists.

use std::path::Path;

use wishbot_core::error::{Result, WishbotError};

use crate::loader::{Roster, RosterLoader};

/// Header of the member-register export the loader is built around.
pub const EXAMPLE_HEADER: [&str; 23] = [
    "Serial",
    "S.N.",
    "Member ID",
    "Family ID",
    "Member Count",
    "Member Name(Eng.)",
    "Member Name(Hindi)",
    "Father/Husband Name(Eng.)",
    "Father/Husband Name(Hindi)",
    "Age(Yrs.)",
    "Gotra",
    "Chokari",
    "Zone",
    "Birth Place",
    "Mobile No. 1",
    "Whatsapp No. 2",
    "Email",
    "DOB",
    "Gender",
    "Status",
    "Address",
    "Address Hindi",
    "Pincode",
];

pub const EXAMPLE_ROWS: [[&str; 23]; 2] = [
    [
        "1", "10790", "409", "109", "1", "John Doe", "जॉन डो", "Late. Father Name",
        "स्व. पिता जी", "35 Yrs.", "Gotra", "Area", "Zone-4", "Jaipur", "9123456789",
        "9123456789", "john@email.com", "15/1/89", "Male", "Head of family",
        "Address Line 1", "पता लाइन 1", "302021",
    ],
    [
        "2", "10791", "410", "109", "2", "Jane Smith", "जेन स्मिथ", "John Doe", "जॉन डो",
        "32 Yrs.", "Gotra", "Area", "Zone-4", "Jaipur", "9876543210", "9876543210",
        "jane@email.com", "22/12/92", "Female", "Member", "Address Line 2",
        "पता लाइन 2", "302021",
    ],
];

/// Write the example roster to `path`, creating parent directories.
pub fn write_example_roster(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| WishbotError::Roster(format!("Failed to create {}: {e}", path.display())))?;
    let write_err = |e: csv::Error| WishbotError::Roster(format!("Failed to write example roster: {e}"));

    writer.write_record(EXAMPLE_HEADER).map_err(write_err)?;
    for row in EXAMPLE_ROWS {
        writer.write_record(row).map_err(write_err)?;
    }
    writer.flush()?;

    tracing::info!(
        "📝 Created example roster at {}. Replace it with your member export.",
        path.display()
    );
    Ok(())
}

/// Load the roster, writing the example file and retrying once if the first load fails.
///
/// An error from the retry is returned to the caller, which treats it as fatal.
pub fn load_or_bootstrap(loader: &RosterLoader, path: &Path) -> Result<Roster> {
    match loader.load(path) {
        Ok(roster) => Ok(roster),
        Err(e) => {
            tracing::warn!("⚠️ Could not load roster {}: {e}", path.display());
            if !path.exists() {
                write_example_roster(path)?;
            }
            loader.load(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_creates_example_and_loads_it() {
        let dir = std::env::temp_dir().join("wishbot-test-bootstrap");
        std::fs::remove_dir_all(&dir).ok();
        let path = dir.join("birthdays.csv");

        let roster = load_or_bootstrap(&RosterLoader::new("91"), &path).unwrap();
        assert!(path.exists());
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.people()[1].name, "Jane Smith");
        assert_eq!(roster.people()[1].contact, "919876543210");
        assert!(roster.header_warnings().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_existing_roster_is_not_overwritten() {
        let dir = std::env::temp_dir().join("wishbot-test-existing");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("birthdays.csv");
        let mut data = EXAMPLE_HEADER.join(",");
        data.push('\n');
        std::fs::write(&path, &data).unwrap();

        let roster = load_or_bootstrap(&RosterLoader::new("91"), &path).unwrap();
        assert!(roster.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), data);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_second_failure_is_returned() {
        let dir = std::env::temp_dir().join("wishbot-test-empty-roster");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("birthdays.csv");
        std::fs::write(&path, "").unwrap();

        let result = load_or_bootstrap(&RosterLoader::new("91"), &path);
        assert!(result.is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
