use crate::parser::DateExtractor;
use crate::types::DateSet;

use reqwest::Client;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub(crate) fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone)]
pub struct ShowtimeScraper {
    client: Client,
    url: String,
    extractor: DateExtractor,
}

impl ShowtimeScraper {
    pub fn new(
        url: &str,
        user_agent: &str,
        timeout: Duration,
        year: i32,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
            extractor: DateExtractor::new(year),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch_page(&self) -> Result<String, ScraperError> {
        log::info!("Fetching showtimes page {}...", self.url);

        let html = self
            .client
            .get(&self.url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?;

        log::debug!("Fetched {} bytes", html.len());
        Ok(html)
    }

    pub async fn fetch_dates(&self) -> Result<DateSet, ScraperError> {
        let html = self.fetch_page().await?;
        Ok(self.extractor.extract(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DateToken;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<ul>
        <li><time datetime="2025-09-30T20:00:00">20:00</time></li>
        <li><time datetime="2025-09-24T17:30:00">17:30</time></li>
    </ul>"#;

    fn scraper_for(server: &MockServer) -> ShowtimeScraper {
        ShowtimeScraper::new(
            &format!("{}/programm", server.uri()),
            "showdate-test/1.0",
            Duration::from_secs(5),
            2025,
        )
        .expect("Failed to build scraper")
    }

    #[tokio::test]
    async fn test_fetch_dates_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/programm"))
            .and(header("user-agent", "showdate-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let dates = scraper_for(&server).fetch_dates().await.unwrap();

        assert_eq!(
            dates.as_slice(),
            &[DateToken::from("24.09"), DateToken::from("30.09")]
        );
    }

    #[tokio::test]
    async fn test_fetch_page_fails_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/programm"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = scraper_for(&server).fetch_page().await.unwrap_err();

        let ScraperError::Http(e) = err;
        assert_eq!(e.status().map(|s| s.as_u16()), Some(503));
    }

    #[tokio::test]
    async fn test_fetch_page_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(PAGE)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let scraper = ShowtimeScraper::new(
            &server.uri(),
            "showdate-test/1.0",
            Duration::from_millis(200),
            2025,
        )
        .unwrap();

        let ScraperError::Http(e) = scraper.fetch_page().await.unwrap_err();
        assert!(e.is_timeout());
    }
}
