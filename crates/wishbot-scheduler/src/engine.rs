//! Birthday engine: one pass over the roster per run.
//!
//! Matches on day and month only, picks a greeting by age, sends it, pauses,
//! and moves on. A failed send is logged and never stops the run.

use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wishbot_core::config::WishbotConfig;
use wishbot_core::traits::Channel;
use wishbot_core::types::{Person, SenderIdentity};
use wishbot_roster::Roster;

use crate::report::{ReportDelivery, RunReport, deliver_report};
use crate::templates::{TemplateBook, render};

/// Result of one scheduled run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The transport was not connected, nothing was attempted.
    Skipped,
    Completed {
        report: RunReport,
        delivery: ReportDelivery,
    },
}

impl RunOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Skipped => None,
            RunOutcome::Completed { report, .. } => Some(report),
        }
    }
}

/// Age in whole calendar years, from a birth year that may be windowed.
pub fn age_on(person: &Person, today: NaiveDate) -> i32 {
    today.year() - person.birthday.year()
}

/// Settings and state for dispatch runs.
pub struct BirthdayEngine {
    templates: TemplateBook,
    sender: SenderIdentity,
    report_to: String,
    send_delay: Duration,
    send_timeout: Duration,
    rng: StdRng,
}

impl BirthdayEngine {
    pub fn new(sender: SenderIdentity, report_to: impl Into<String>) -> Self {
        Self {
            templates: TemplateBook::default(),
            sender,
            report_to: report_to.into(),
            send_delay: Duration::from_secs(3),
            send_timeout: Duration::from_secs(30),
            rng: StdRng::from_entropy(),
        }
    }

    /// Build from configuration. `report_to` is the canonical report address.
    pub fn from_config(config: &WishbotConfig, report_to: impl Into<String>) -> Self {
        Self::new(config.sender_identity(), report_to)
            .with_templates(TemplateBook::from_config(
                &config.templates,
                config.dispatch.age_threshold,
            ))
            .with_send_delay(config.dispatch.send_delay())
            .with_send_timeout(config.dispatch.send_timeout())
    }

    pub fn with_templates(mut self, templates: TemplateBook) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Replace the randomness source, e.g. with a seeded one in tests.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn report_to(&self) -> &str {
        &self.report_to
    }

    /// Greet everyone whose birthday is `today`, then deliver the summary.
    pub async fn run(&mut self, roster: &Roster, channel: &dyn Channel, today: NaiveDate) -> RunOutcome {
        tracing::info!("🔎 Checking birthdays for {today} ({} people loaded)", roster.len());

        if !channel.is_connected() {
            tracing::warn!(
                "❌ Channel '{}' is not connected, skipping this run",
                channel.name()
            );
            return RunOutcome::Skipped;
        }

        let mut report = RunReport::new(today);

        for person in roster.birthdays_on(today) {
            report.matched_count += 1;
            tracing::info!("🎂 Found birthday for {}: {}", person.name, person.birthday);

            let age = age_on(person, today);
            let (set, template) = self.templates.pick(age, &mut self.rng);
            tracing::info!("📝 Using {set} template for {} (age {age})", person.name);
            let message = render(template, &person.name, &self.sender);

            match self.send(channel, &person.contact, &message).await {
                Ok(()) => {
                    tracing::info!("✅ Sent birthday message to {person}");
                    report.sent_people.push(person.clone());
                }
                Err(reason) => {
                    tracing::warn!("❌ Error sending birthday message to {person}: {reason}");
                    report.failed_people.push((person.clone(), reason));
                }
            }

            if !self.send_delay.is_zero() {
                tokio::time::sleep(self.send_delay).await;
            }
        }

        let delivery = deliver_report(channel, &self.report_to, &report, self.send_timeout).await;
        RunOutcome::Completed { report, delivery }
    }

    async fn send(&self, channel: &dyn Channel, to: &str, body: &str) -> Result<(), String> {
        match tokio::time::timeout(self.send_timeout, channel.send_text(to, body)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("timed out after {}s", self.send_timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::REPORT_HEADING;
    use crate::templates::{PRIMARY_TEMPLATES, SECONDARY_TEMPLATES};
    use wishbot_channels::LogChannel;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sender() -> SenderIdentity {
        SenderIdentity {
            name: "Ravi".into(),
            number: "9000000000".into(),
        }
    }

    fn engine() -> BirthdayEngine {
        BirthdayEngine::new(sender(), "919111111111")
            .with_send_delay(Duration::ZERO)
            .with_send_timeout(Duration::from_secs(1))
            .with_rng(StdRng::seed_from_u64(3))
    }

    async fn connected(channel: LogChannel) -> LogChannel {
        let mut channel = channel;
        channel.connect().await.unwrap();
        channel
    }

    /// Render a template the same way the engine does and check it belongs to `set`.
    fn rendered_from(body: &str, name: &str, set: &[&str]) -> bool {
        set.iter().any(|t| render(t, name, &sender()) == body)
    }

    #[test]
    fn test_age_uses_stored_year() {
        let p = Person::new("A", ymd(1949, 7, 5), "91");
        assert_eq!(age_on(&p, ymd(2026, 7, 5)), 77);
        let p = Person::new("B", ymd(2006, 1, 2), "91");
        assert_eq!(age_on(&p, ymd(2026, 1, 2)), 20);
    }

    #[tokio::test]
    async fn test_end_to_end_single_match() {
        let roster = Roster::from_people(vec![
            Person::new("Someone Else", ymd(1990, 3, 4), "919000000001"),
            Person::new("Test User", ymd(2006, 1, 2), "919999999999"),
        ]);
        let channel = connected(LogChannel::new()).await;

        let outcome = engine().run(&roster, &channel, ymd(2026, 1, 2)).await;

        let report = outcome.report().unwrap();
        assert_eq!(report.matched_count, 1);
        assert_eq!(report.sent_people.len(), 1);
        assert_eq!(report.sent_people[0].name, "Test User");

        let sent = channel.outbox().messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "919999999999");
        assert!(rendered_from(&sent[0].body, "Test User", PRIMARY_TEMPLATES));
        assert_eq!(sent[1].to, "919111111111");
        assert!(sent[1].body.starts_with(REPORT_HEADING));
        assert!(sent[1].body.lines().any(|l| l == "Test User (919999999999)"));
    }

    #[tokio::test]
    async fn test_older_person_gets_secondary_template() {
        let roster = Roster::from_people(vec![Person::new("Elder", ymd(1950, 1, 2), "919000000001")]);
        let channel = connected(LogChannel::new()).await;

        engine().run(&roster, &channel, ymd(2026, 1, 2)).await;

        let sent = channel.outbox().messages();
        assert!(rendered_from(&sent[0].body, "Elder", SECONDARY_TEMPLATES));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_run() {
        let roster = Roster::from_people(vec![
            Person::new("First", ymd(1990, 1, 2), "919000000001"),
            Person::new("Broken", ymd(1991, 1, 2), "919000000002"),
            Person::new("Third", ymd(1992, 1, 2), "919000000003"),
        ]);
        let channel = connected(LogChannel::new().failing_for("919000000002")).await;

        let outcome = engine().run(&roster, &channel, ymd(2026, 1, 2)).await;
        let RunOutcome::Completed { report, delivery } = outcome else {
            panic!("run should not be skipped");
        };

        assert_eq!(report.matched_count, 3);
        let sent: Vec<_> = report.sent_people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(sent, vec!["First", "Third"]);
        assert_eq!(report.failed_people.len(), 1);
        assert_eq!(report.failed_people[0].0.name, "Broken");
        assert_eq!(delivery, ReportDelivery::Sent);

        let summary = channel.outbox().messages().last().unwrap().body.clone();
        assert!(summary.contains("First (919000000001)"));
        assert!(summary.contains("Third (919000000003)"));
        assert!(!summary.contains("Broken"));
    }

    #[tokio::test]
    async fn test_all_failures_still_report() {
        let roster = Roster::from_people(vec![Person::new("Broken", ymd(1991, 1, 2), "919000000002")]);
        let channel = connected(LogChannel::new().failing_for("919000000002")).await;

        let outcome = engine().run(&roster, &channel, ymd(2026, 1, 2)).await;
        assert_eq!(outcome.report().unwrap().sent_people.len(), 0);

        let sent = channel.outbox().messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("(No messages sent)"));
    }

    #[tokio::test]
    async fn test_no_birthdays_sends_nothing() {
        let roster = Roster::from_people(vec![Person::new("A", ymd(1990, 3, 4), "919000000001")]);
        let channel = connected(LogChannel::new()).await;

        let outcome = engine().run(&roster, &channel, ymd(2026, 1, 2)).await;
        let RunOutcome::Completed { report, delivery } = outcome else {
            panic!("run should not be skipped");
        };
        assert_eq!(report.matched_count, 0);
        assert_eq!(delivery, ReportDelivery::NothingToReport);
        assert!(channel.outbox().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_send_times_out_and_run_continues() {
        let roster = Roster::from_people(vec![
            Person::new("First", ymd(1990, 1, 2), "919000000001"),
            Person::new("Hung", ymd(1991, 1, 2), "919000000002"),
            Person::new("Third", ymd(1992, 1, 2), "919000000003"),
        ]);
        let channel = connected(LogChannel::new().stalling_for("919000000002")).await;
        let mut engine = engine().with_send_timeout(Duration::from_secs(30));

        let outcome = engine.run(&roster, &channel, ymd(2026, 1, 2)).await;
        let RunOutcome::Completed { report, delivery } = outcome else {
            panic!("run should not be skipped");
        };

        let sent: Vec<_> = report.sent_people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(sent, vec!["First", "Third"]);
        assert_eq!(report.failed_people.len(), 1);
        assert_eq!(report.failed_people[0].0.name, "Hung");
        assert!(report.failed_people[0].1.contains("timed out after 30s"));
        assert_eq!(delivery, ReportDelivery::Sent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_after_every_attempt() {
        let roster = Roster::from_people(vec![
            Person::new("First", ymd(1990, 1, 2), "919000000001"),
            Person::new("Broken", ymd(1991, 1, 2), "919000000002"),
            Person::new("Third", ymd(1992, 1, 2), "919000000003"),
        ]);
        let channel = connected(LogChannel::new().failing_for("919000000002")).await;
        let mut engine = engine().with_send_delay(Duration::from_secs(3));

        let started = tokio::time::Instant::now();
        engine.run(&roster, &channel, ymd(2026, 1, 2)).await;
        let elapsed = started.elapsed();

        // Three attempts, failed one included, each followed by the pause.
        assert!(elapsed >= Duration::from_secs(9), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(12), "elapsed {elapsed:?}");
        assert_eq!(channel.outbox().len(), 3);
    }

    #[tokio::test]
    async fn test_disconnected_channel_skips_run() {
        let roster = Roster::from_people(vec![Person::new("A", ymd(1990, 1, 2), "919000000001")]);
        let channel = LogChannel::new();

        let outcome = engine().run(&roster, &channel, ymd(2026, 1, 2)).await;
        assert_eq!(outcome, RunOutcome::Skipped);
        assert!(channel.outbox().is_empty());
    }

    #[tokio::test]
    async fn test_send_order_follows_roster() {
        let roster = Roster::from_people(vec![
            Person::new("Zed", ymd(1990, 1, 2), "919000000009"),
            Person::new("Amy", ymd(1990, 1, 2), "919000000001"),
        ]);
        let channel = connected(LogChannel::new()).await;

        engine().run(&roster, &channel, ymd(2026, 1, 2)).await;
        let to: Vec<_> = channel.outbox().messages().into_iter().map(|m| m.to).collect();
        assert_eq!(to, vec!["919000000009", "919000000001", "919111111111"]);
    }
}
