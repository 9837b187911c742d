pub mod config;
pub mod monitor;
pub mod notifier;
pub mod parser;
pub mod scraper;
pub mod types;
pub mod utils;

pub use config::{Config, ConfigError};
pub use monitor::{CycleOutcome, DateMonitor, MonitorError};
pub use crate::scraper::{ScraperError, ShowtimeScraper};
