//! Per-run report and its delivery to the report address.

use std::time::Duration;

use chrono::NaiveDate;
use wishbot_core::traits::Channel;
use wishbot_core::types::Person;

pub const REPORT_HEADING: &str = "Birthday messages sent today:";
pub const NOTHING_SENT: &str = "(No messages sent)";

/// What happened during one run. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub date: NaiveDate,
    pub matched_count: usize,
    /// People greeted successfully, in roster order.
    pub sent_people: Vec<Person>,
    /// People whose greeting could not be delivered, with the reason.
    pub failed_people: Vec<(Person, String)>,
}

impl RunReport {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            matched_count: 0,
            sent_people: Vec::new(),
            failed_people: Vec::new(),
        }
    }

    /// The summary message, or `None` when nobody had a birthday.
    pub fn summary(&self) -> Option<String> {
        if self.matched_count == 0 {
            return None;
        }

        let mut msg = format!("{REPORT_HEADING}\n");
        for person in &self.sent_people {
            msg.push_str(&format!("{} ({})\n", person.name, person.contact));
        }
        if self.sent_people.is_empty() {
            msg.push_str(NOTHING_SENT);
        }
        Some(msg)
    }
}

/// Result of handing the summary to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDelivery {
    /// No birthdays, only logged.
    NothingToReport,
    Sent,
    Failed(String),
}

/// Send the run summary to `destination`.
///
/// Failures are logged and returned, never retried.
pub async fn deliver_report(
    channel: &dyn Channel,
    destination: &str,
    report: &RunReport,
    timeout: Duration,
) -> ReportDelivery {
    let Some(summary) = report.summary() else {
        tracing::info!("📅 No birthdays today ({})", report.date);
        return ReportDelivery::NothingToReport;
    };

    tracing::info!(
        "🎉 Found {} birthday(s) today, {} greeted",
        report.matched_count,
        report.sent_people.len()
    );

    match tokio::time::timeout(timeout, channel.send_text(destination, &summary)).await {
        Ok(Ok(())) => {
            tracing::info!("✅ Sent report to {destination}");
            ReportDelivery::Sent
        }
        Ok(Err(e)) => {
            tracing::warn!("❌ Error sending report to {destination}: {e}");
            ReportDelivery::Failed(e.to_string())
        }
        Err(_) => {
            let reason = format!("report send timed out after {}s", timeout.as_secs());
            tracing::warn!("❌ Error sending report to {destination}: {reason}");
            ReportDelivery::Failed(reason)
        }
    }
}
