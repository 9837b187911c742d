use std::path::PathBuf;
use std::process;

use clap::error::{ContextKind, ErrorKind};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use showdate::types::DateToken;
use showdate::{Config, DateMonitor};

#[derive(Parser)]
#[command(name = "showdate")]
#[command(about = "Watches a cinema screenings page for new show dates", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        short = 'c',
        long = "config",
        default_value = "config.json",
        global = true,
        help = "Path to the JSON configuration file"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single check and exit
    Check,
    /// Test whether a specific date is currently listed, e.g. `test 24.09`
    Test {
        #[arg(value_name = "D.MM", help = "Date to look for")]
        date: String,
    },
}

fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::InvalidSubcommand => {
            env_logger::Builder::new()
                .filter_level(LevelFilter::Info)
                .init();
            let command = e
                .get(ContextKind::InvalidSubcommand)
                .map(|c| c.to_string())
                .unwrap_or_default();
            log::error!("Unknown command: {}", command);
            let _ = e.print();
            process::exit(0);
        }
        Err(e) => e.exit(),
    }
}

#[tokio::main]
async fn main() {
    let cli = parse_cli();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    log::info!("Screening date monitor starting...");

    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        log::error!("Failed to load configuration: {}", e);
        process::exit(1);
    });

    log::info!("Loaded configuration from {}", cli.config.display());
    log::info!("Monitoring URL: {}", config.page_url);
    log::info!("Check interval: {} minutes", config.check_interval_minutes);

    if config.discord_webhook_url.is_none() {
        log::warn!("No webhook URL configured. Notifications will be logged only.");
    } else {
        log::info!("Webhook configured");
    }

    let mut monitor = DateMonitor::new(config).unwrap_or_else(|e| {
        log::error!("Error creating monitor: {}", e);
        process::exit(1);
    });

    match cli.command {
        Some(Commands::Check) => {
            if let Err(e) = monitor.check_for_new_dates().await {
                log::error!("Error during check: {}", e);
            }
        }

        Some(Commands::Test { date }) => {
            if let Err(e) = monitor.test_specific_date(&DateToken::from(date)).await {
                log::error!("Error scraping dates: {}", e);
            }
        }

        None => {
            log::info!("Starting continuous monitoring mode...");
            log::info!(
                "Monitoring for dates after: {}",
                monitor.config().current_newest_date
            );

            match monitor.send_startup_notification().await {
                Ok(()) if monitor.config().discord_webhook_url.is_some() => {
                    log::info!("Startup notification sent")
                }
                Ok(()) => {}
                Err(e) => log::warn!("Failed to send startup notification: {}", e),
            }

            log::info!(
                "Monitoring every {} minutes. Press Ctrl+C to stop.",
                monitor.config().check_interval_minutes
            );

            tokio::select! {
                _ = monitor.run() => {}
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        log::error!("Failed to listen for Ctrl+C: {}", e);
                    }
                    log::info!("Stopping monitor");
                }
            }
        }
    }
}
