//! Discord-style webhook notifications.
//!
//! Every [`Notification`] renders to one message with a single embed. Without a
//! webhook URL the notifier only logs what it would have sent.

use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::types::{DateSet, DateToken};

pub const COLOR_GREEN: u32 = 0x00ff00;
pub const COLOR_RED: u32 = 0xff0000;
pub const COLOR_BLUE: u32 = 0x0099ff;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Webhook rejected with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to encode webhook payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: String, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// What is being watched. Only used to make messages readable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    pub year: i32,
    pub movie_title: Option<String>,
    pub cinema_name: Option<String>,
}

impl Subject {
    fn full_date(&self, token: &DateToken) -> String {
        format!("**{}.{}**", token, self.year)
    }

    fn movie(&self) -> &str {
        self.movie_title.as_deref().unwrap_or("The movie")
    }

    fn location_suffix(&self) -> String {
        match &self.cinema_name {
            Some(cinema) => format!(" at {}", cinema),
            None => String::new(),
        }
    }

    fn subject_fields(&self) -> Vec<EmbedField> {
        let mut fields = Vec::new();
        if let Some(movie) = &self.movie_title {
            fields.push(EmbedField::new("Movie", format!("**{}**", movie), true));
        }
        if let Some(cinema) = &self.cinema_name {
            fields.push(EmbedField::new("Cinema", format!("**{}**", cinema), true));
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Startup {
        interval_minutes: u64,
        reference_date: DateToken,
        source_url: String,
    },
    NewDateFound {
        new_date: DateToken,
        previous_date: DateToken,
        source_url: String,
    },
    TestResult {
        target_date: DateToken,
        found: bool,
        observed: DateSet,
        source_url: String,
    },
}

impl Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notification::Startup {
                interval_minutes,
                reference_date,
                ..
            } => write!(
                f,
                "startup (every {} minutes, watching for dates after {})",
                interval_minutes, reference_date
            ),
            Notification::NewDateFound {
                new_date,
                previous_date,
                ..
            } => write!(f, "new date {} (previously {})", new_date, previous_date),
            Notification::TestResult {
                target_date, found, ..
            } => write!(
                f,
                "test result for {}: {}",
                target_date,
                if *found { "found" } else { "not found" }
            ),
        }
    }
}

impl Notification {
    pub fn to_payload(&self, subject: &Subject, now: DateTime<Utc>) -> WebhookPayload {
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);

        match self {
            Notification::Startup {
                interval_minutes,
                reference_date,
                source_url,
            } => {
                let mut fields = subject.subject_fields();
                fields.push(EmbedField::new(
                    "Check Interval",
                    format!("Every **{} minutes**", interval_minutes),
                    true,
                ));
                fields.push(EmbedField::new(
                    "Reference Date",
                    format!("Watching for dates after {}", subject.full_date(reference_date)),
                    true,
                ));

                WebhookPayload {
                    content: format!(
                        "**Monitor activated!** New dates will be reported here.\n[**Current Screenings**]({})",
                        source_url
                    ),
                    embeds: vec![Embed {
                        title: "Screening Monitor Started".to_string(),
                        description: format!(
                            "{}{} is now being watched for new screening dates.",
                            subject.movie(),
                            subject.location_suffix()
                        ),
                        color: COLOR_GREEN,
                        timestamp,
                        fields,
                        footer: EmbedFooter {
                            text: "You'll be notified when new dates become available".to_string(),
                        },
                    }],
                }
            }
            Notification::NewDateFound {
                new_date,
                previous_date,
                source_url,
            } => {
                let mut fields = vec![
                    EmbedField::new("New Latest Date", subject.full_date(new_date), true),
                    EmbedField::new("Previous Latest Date", subject.full_date(previous_date), true),
                    EmbedField::new(
                        "Action Required",
                        "Book your tickets now before they sell out!".to_string(),
                        false,
                    ),
                ];
                fields.extend(subject.subject_fields());

                WebhookPayload {
                    content: format!(
                        "**ALERT:** New dates detected!\n[**Book Tickets Here**]({})",
                        source_url
                    ),
                    embeds: vec![Embed {
                        title: "New Movie Dates Available!".to_string(),
                        description: format!(
                            "{} has new screening dates{}!",
                            subject.movie(),
                            subject.location_suffix()
                        ),
                        color: COLOR_BLUE,
                        timestamp,
                        fields,
                        footer: EmbedFooter {
                            text: "Screening date monitor".to_string(),
                        },
                    }],
                }
            }
            Notification::TestResult {
                target_date,
                found,
                observed,
                source_url,
            } => {
                let mut fields = vec![EmbedField::new(
                    "Target Date",
                    subject.full_date(target_date),
                    true,
                )];

                let embed = if *found {
                    fields.push(EmbedField::new("Status", "**Available**".to_string(), true));
                    fields.push(EmbedField::new(
                        "Next Step",
                        "This date has screenings available!".to_string(),
                        false,
                    ));
                    Embed {
                        title: "Test Result: SUCCESS!".to_string(),
                        description: format!(
                            "The date {} was found on the screenings page.",
                            subject.full_date(target_date)
                        ),
                        color: COLOR_GREEN,
                        timestamp,
                        fields,
                        footer: EmbedFooter {
                            text: "Test completed successfully".to_string(),
                        },
                    }
                } else {
                    let observed_dates = if observed.is_empty() {
                        "No dates found".to_string()
                    } else {
                        observed
                            .iter()
                            .map(|d| subject.full_date(d))
                            .collect::<Vec<_>>()
                            .join(", ")
                    };
                    fields.push(EmbedField::new("Status", "**Not Available**".to_string(), true));
                    fields.push(EmbedField::new("Available Dates", observed_dates, false));
                    Embed {
                        title: "Test Result: NOT FOUND".to_string(),
                        description: format!(
                            "The date {} was not found on the screenings page.",
                            subject.full_date(target_date)
                        ),
                        color: COLOR_RED,
                        timestamp,
                        fields,
                        footer: EmbedFooter {
                            text: "Keep monitoring for updates".to_string(),
                        },
                    }
                };

                let content = if *found {
                    format!("**Test completed!** [**View Screenings**]({})", source_url)
                } else {
                    format!("**Test completed!** [**Check Website**]({})", source_url)
                };

                WebhookPayload {
                    content,
                    embeds: vec![embed],
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: Option<String>,
    subject: Subject,
}

impl DiscordNotifier {
    pub fn new(
        webhook_url: Option<String>,
        timeout: Duration,
        subject: Subject,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            webhook_url,
            subject,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    pub async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let Some(url) = &self.webhook_url else {
            log::info!("No webhook URL configured, logging notification only: {notification}");
            return Ok(());
        };

        let payload = notification.to_payload(&self.subject, Utc::now());
        let body = serde_json::to_vec(&payload)?;

        log::debug!("Posting {notification} to webhook");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
