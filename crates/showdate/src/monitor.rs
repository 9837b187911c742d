use crate::config::Config;
use crate::notifier::{DiscordNotifier, Notification, NotifyError};
use crate::scraper::{ScraperError, ShowtimeScraper};
use crate::types::{DateSet, DateToken};
use crate::utils::{is_after, select_newest};

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Failed to scrape dates: {0}")]
    Fetch(#[from] ScraperError),
    #[error("Failed to set up notifier: {0}")]
    Notifier(#[from] NotifyError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The page listed no showtimes at all.
    NoDates,
    Unchanged {
        newest: DateToken,
    },
    NewDate {
        new_date: DateToken,
        previous_date: DateToken,
    },
}

/// Owns the reference date and runs check cycles one after another.
#[derive(Debug)]
pub struct DateMonitor {
    config: Config,
    scraper: ShowtimeScraper,
    notifier: DiscordNotifier,
    last_known_date: DateToken,
}

impl DateMonitor {
    pub fn new(config: Config) -> Result<Self, MonitorError> {
        let scraper = ShowtimeScraper::new(
            &config.page_url,
            &config.user_agent,
            config.request_timeout(),
            config.year,
        )?;
        let notifier = DiscordNotifier::new(
            config.discord_webhook_url.clone(),
            config.request_timeout(),
            config.subject(),
        )?;

        Ok(Self {
            last_known_date: config.current_newest_date.clone(),
            config,
            scraper,
            notifier,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn last_known_date(&self) -> &DateToken {
        &self.last_known_date
    }

    pub async fn send_startup_notification(&self) -> Result<(), NotifyError> {
        self.notifier
            .notify(&Notification::Startup {
                interval_minutes: self.config.check_interval_minutes,
                reference_date: self.config.current_newest_date.clone(),
                source_url: self.config.page_url.clone(),
            })
            .await
    }

    /// Decides what a set of dates means for the reference date, and moves the
    /// reference forward when a strictly newer date shows up.
    pub fn evaluate(&mut self, dates: &DateSet) -> CycleOutcome {
        let Some(newest) = select_newest(dates, self.config.year) else {
            return CycleOutcome::NoDates;
        };

        log::info!(
            "Current newest date: {}, last known date: {}",
            newest,
            self.last_known_date
        );

        if is_after(&newest, &self.last_known_date, self.config.year) {
            let previous_date = std::mem::replace(&mut self.last_known_date, newest.clone());
            CycleOutcome::NewDate {
                new_date: newest,
                previous_date,
            }
        } else {
            CycleOutcome::Unchanged { newest }
        }
    }

    pub async fn check_for_new_dates(&mut self) -> Result<CycleOutcome, MonitorError> {
        log::info!("Checking for new dates...");

        let dates = self.scraper.fetch_dates().await?;
        log::info!("Found dates: {}", dates);

        let outcome = self.evaluate(&dates);
        match &outcome {
            CycleOutcome::NoDates => log::info!("No dates found"),
            CycleOutcome::Unchanged { newest } => {
                log::info!("No new dates found. Latest date is still {}", newest)
            }
            CycleOutcome::NewDate {
                new_date,
                previous_date,
            } => {
                let notification = Notification::NewDateFound {
                    new_date: new_date.clone(),
                    previous_date: previous_date.clone(),
                    source_url: self.config.page_url.clone(),
                };
                match self.notifier.notify(&notification).await {
                    Ok(()) if self.notifier.is_configured() => {
                        log::info!("Notification sent for new date {}", new_date)
                    }
                    Ok(()) => {}
                    Err(e) => log::warn!("Failed to send new date notification: {}", e),
                }
            }
        }

        Ok(outcome)
    }

    /// Reports whether `target` is currently listed and sends the result as a
    /// test notification.
    pub async fn test_specific_date(&self, target: &DateToken) -> Result<bool, MonitorError> {
        log::info!("Testing for specific date: {}", target);

        let dates = self.scraper.fetch_dates().await?;
        log::info!("All found dates: {}", dates);

        let found = dates.contains(target);
        if found {
            log::info!("Date {} was found!", target);
        } else {
            log::info!("Date {} was NOT found.", target);
        }

        let notification = Notification::TestResult {
            target_date: target.clone(),
            found,
            observed: dates,
            source_url: self.config.page_url.clone(),
        };
        if let Err(e) = self.notifier.notify(&notification).await {
            log::warn!("Failed to send test notification: {}", e);
        }

        Ok(found)
    }

    /// Checks now, then again one interval after each check finishes. Never returns.
    pub async fn run(&mut self) {
        let interval = self.config.check_interval();
        loop {
            if let Err(e) = self.check_for_new_dates().await {
                log::error!("Monitoring check failed: {}", e);
            }
            log::debug!("Next check in {} minutes", self.config.check_interval_minutes);
            tokio::time::sleep(interval).await;
        }
    }
}
