use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::types::{CalendarInstant, DateParseError, DateSet, DateToken};

static RE_CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("invalid regex: clock time"));

/// Parses a `"D.M"` token into an instant of `year`.
///
/// Anything that is not exactly two dot separated base-10 numbers is rejected.
/// Day and month are not checked against the calendar; overflowing values roll
/// over into the following month or year.
pub fn try_parse_date(token: &str, year: i32) -> Result<CalendarInstant, DateParseError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(DateParseError::InvalidFormat(token.to_string()));
    }

    let number = |part: &str| {
        part.parse::<u32>()
            .map_err(|source| DateParseError::InvalidNumber {
                token: token.to_string(),
                part: part.to_string(),
                source,
            })
    };

    let day = number(parts[0])?;
    let month = number(parts[1])?;

    CalendarInstant::new(year, month, day)
        .ok_or_else(|| DateParseError::OutOfRange(token.to_string()))
}

/// Like [`try_parse_date`], but a malformed token becomes [`CalendarInstant::MIN`].
///
/// This keeps an empty or garbled reference date "older than everything", so the
/// first valid date seen afterwards is reported as new.
pub fn parse_date(token: &str, year: i32) -> CalendarInstant {
    try_parse_date(token, year).unwrap_or_else(|e| {
        log::warn!("{e}; treating it as the earliest possible date");
        CalendarInstant::MIN
    })
}

/// Pulls screening dates of one year out of a showtimes page.
///
/// A showtime is a `<time datetime="YYYY-MM-DDThh:mm:ss">hh:mm</time>` element.
/// Only the date part is kept, so several showtimes on one day yield one token.
#[derive(Debug, Clone)]
pub struct DateExtractor {
    year: i32,
    datetime_pattern: Regex,
}

impl DateExtractor {
    pub fn new(year: i32) -> Self {
        let datetime_pattern = Regex::new(&format!(
            r"^{:04}-(\d{{2}})-(\d{{2}})T\d{{2}}:\d{{2}}:\d{{2}}$",
            year
        ))
        .expect("invalid regex: showtime datetime");

        Self {
            year,
            datetime_pattern,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn extract(&self, html: &str) -> DateSet {
        let document = Html::parse_document(html);
        let time_sel = Selector::parse("time[datetime]").unwrap();

        let mut seen = HashSet::new();
        let mut tokens = Vec::new();

        for element in document.select(&time_sel) {
            if !direct_text(element).is_some_and(|clock| RE_CLOCK_TIME.is_match(clock)) {
                continue;
            }

            let Some(token) = element
                .value()
                .attr("datetime")
                .and_then(|datetime| self.token_from_datetime(datetime))
            else {
                continue;
            };

            if seen.insert(token.clone()) {
                tokens.push(token);
            }
        }

        tokens.sort_by_key(|token| parse_date(token.as_str(), self.year));
        log::debug!("Extracted {} unique dates", tokens.len());

        DateSet::from_sorted(tokens)
    }

    fn token_from_datetime(&self, datetime: &str) -> Option<DateToken> {
        let caps = self.datetime_pattern.captures(datetime)?;
        let month = caps.get(1)?.as_str().parse::<u32>().ok()?;
        let day = caps.get(2)?.as_str().parse::<u32>().ok()?;
        Some(DateToken::new(day, month))
    }
}

/// The element's text when it is the only child, so `<time><span>17:30</span></time>`
/// does not count as a showtime.
fn direct_text(element: ElementRef<'_>) -> Option<&str> {
    let mut children = element.children();
    match (children.next(), children.next()) {
        (Some(child), None) => child.value().as_text().map(|text| &**text),
        _ => None,
    }
}

pub fn extract_dates(html: &str, year: i32) -> DateSet {
    DateExtractor::new(year).extract(html)
}
