//! # Wishbot: Daily Birthday Greetings
//!
//! Loads a member roster from CSV, greets everyone whose birthday is today at
//! a fixed local time, and sends a summary to a report number.
//!
//! Usage:
//!   wishbot                      # Run the daily scheduler (default)
//!   wishbot once                 # One check for today, then exit
//!   wishbot check                # Show the roster and today's birthdays, send nothing
//!   wishbot --dry-run            # Log messages instead of sending them

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wishbot_core::WishbotConfig;
use wishbot_core::traits::{Clock, SystemClock};
use wishbot_roster::{Roster, RosterLoader, load_or_bootstrap, normalize_contact};
use wishbot_scheduler::{BirthdayEngine, BirthdayScheduler, RunOutcome, age_on};

#[derive(Parser)]
#[command(
    name = "wishbot",
    version,
    about = "🎂 Wishbot: daily birthday greetings from a CSV roster"
)]
struct Cli {
    /// Config file (default: ~/.wishbot/config.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log messages instead of delivering them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the daily scheduler until interrupted
    Run,
    /// Check today's birthdays once and exit
    Once,
    /// Print the roster and today's birthdays without sending anything
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "wishbot=debug,wishbot_core=debug,wishbot_roster=debug,wishbot_scheduler=debug,wishbot_channels=debug"
    } else {
        "wishbot=info,wishbot_core=info,wishbot_roster=info,wishbot_scheduler=info,wishbot_channels=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => WishbotConfig::load_from(path)?,
        None => WishbotConfig::load()?,
    };
    config.apply_env();

    let command = cli.command.unwrap_or(Command::Run);
    let roster_path = config.roster.resolved_path();
    let roster = prepare_roster(&config, command)?;

    if command == Command::Check {
        print_check(&roster, &SystemClock);
        return Ok(());
    }

    let anchor = config.schedule.anchor_time()?;
    let report_to = normalize_contact(&config.report.number, &config.roster.country_code)
        .context("REPORT_NUMBER is not a usable address")?;

    let mut channel = wishbot_channels::build_channel(&config.channel, cli.dry_run);
    wishbot_channels::connect_and_wait(
        channel.as_mut(),
        Duration::from_secs(config.channel.ready_timeout_secs),
        Duration::from_secs(config.channel.settle_secs),
    )
    .await
    .with_context(|| format!("Failed to connect {} channel", channel.name()))?;

    println!("🎂 Wishbot v{}", env!("CARGO_PKG_VERSION"));
    println!("   📇 Roster:   {} ({} people)", roster_path.display(), roster.len());
    println!("   📡 Channel:  {}", channel.name());
    println!("   ⏰ Anchor:   {anchor} daily");
    println!("   📨 Reports:  {report_to}");
    println!();

    let engine = BirthdayEngine::from_config(&config, report_to);
    let mut scheduler = BirthdayScheduler::new(
        roster,
        channel,
        engine,
        Box::new(SystemClock),
        anchor,
    )
    .with_run_on_startup(config.schedule.run_on_startup);

    match command {
        Command::Once => {
            if scheduler.run_once().await == RunOutcome::Skipped {
                tracing::warn!("Birthday check skipped: channel not connected");
            }
            scheduler.shutdown().await?;
        }
        _ => {
            tracing::info!("Birthday bot is running... press Ctrl+C to stop");
            scheduler.run_until(shutdown_signal()).await?;
        }
    }

    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("⚠️ Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Validate the configuration (except for `check`), then load the roster.
///
/// Validation comes first so a misconfigured daemon exits before it writes
/// an example roster.
fn prepare_roster(config: &WishbotConfig, command: Command) -> Result<Roster> {
    if command != Command::Check {
        config.validate()?;
    }

    let loader = RosterLoader::new(config.roster.country_code.clone());
    let roster_path = config.roster.resolved_path();
    load_or_bootstrap(&loader, &roster_path)
        .with_context(|| format!("Failed to load roster {}", roster_path.display()))
}

fn print_check(roster: &Roster, clock: &dyn Clock) {
    let today = clock.now().date_naive();

    println!(
        "📇 {} people loaded, {} of {} rows skipped",
        roster.len(),
        roster.rows_skipped(),
        roster.rows_read()
    );
    for warning in roster.header_warnings() {
        println!("   ⚠️  header: {warning}");
    }
    for skipped in roster.skipped() {
        println!(
            "   ⏭️  row {}: {}{}",
            skipped.row,
            skipped.name.as_deref().map(|n| format!("{n}: ")).unwrap_or_default(),
            skipped.reason
        );
    }

    println!();
    println!("🎂 Birthdays on {today}:");
    let mut any = false;
    for person in roster.birthdays_on(today) {
        any = true;
        println!(
            "   {} ({}), turning {}",
            person.name,
            person.contact,
            age_on(person, today)
        );
    }
    if !any {
        println!("   (none)");
    }
}
