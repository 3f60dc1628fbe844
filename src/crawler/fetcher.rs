//! Rate-limited HTTP transport
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the browser-like header set
//! - A single timeout policy shared by listing and detail requests
//! - Classifying failures into timeout, status and connection errors
//! - The politeness pause issued after every remote call

use crate::config::{Config, UserAgentConfig};
use crate::{ConfigError, ScraperError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION};
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with the fixed header set and timeout
///
/// # Arguments
///
/// * `config` - The request header configuration
/// * `timeout` - Timeout applied to every request made with the client
///
/// # Example
///
/// ```no_run
/// use rep_harvest::config::UserAgentConfig;
/// use rep_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, ScraperError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value("accept", &config.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept-language", &config.accept_language)?,
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(ScraperError::from)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value)
        .map_err(|_| ConfigError::Validation(format!("{} is not a valid header value", name)))
}

/// Maps a reqwest failure for `url` onto the crate's error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> ScraperError {
    if error.is_timeout() {
        ScraperError::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = error.status() {
        ScraperError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else {
        ScraperError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

/// HTTP client paired with the mandatory inter-request pause
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    politeness_delay: Duration,
}

impl Transport {
    pub fn new(client: Client, politeness_delay: Duration) -> Self {
        Self {
            client,
            politeness_delay,
        }
    }

    /// Builds the client and pause from the crawler configuration
    pub fn from_config(config: &Config) -> Result<Self, ScraperError> {
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
        Ok(Self::new(client, config.crawler.politeness_delay()))
    }

    /// GETs a page and returns its body; any non-2xx status is an error
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify_error(url, e))
    }

    /// Waits out the politeness delay before control returns to the caller
    pub async fn pause(&self) {
        if !self.politeness_delay.is_zero() {
            tokio::time::sleep(self.politeness_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_regex, headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport() -> Transport {
        let client =
            build_http_client(&UserAgentConfig::default(), Duration::from_secs(2)).unwrap();
        Transport::new(client, Duration::ZERO)
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn test_invalid_header_value_rejected() {
        let config = UserAgentConfig {
            accept_language: "en\nUS".to_string(),
            ..UserAgentConfig::default()
        };
        let result = build_http_client(&config, Duration::from_secs(10));
        assert!(matches!(result, Err(ScraperError::Config(_))));
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("cache-control", "max-age=0"))
            .and(header("connection", "keep-alive"))
            .and(header("upgrade-insecure-requests", "1"))
            // Comma-separated values are matched element by element
            .and(headers("accept-language", vec!["en-US", "en;q=0.5"]))
            .and(header_regex("user-agent", r"Chrome/91\.0\.4472\.124"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let body = transport()
            .fetch_html(&format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = transport().fetch_html(&format!("{}/down", server.uri())).await;
        assert!(matches!(result, Err(ScraperError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client =
            build_http_client(&UserAgentConfig::default(), Duration::from_millis(200)).unwrap();
        let transport = Transport::new(client, Duration::ZERO);
        let result = transport.fetch_html(&format!("{}/slow", server.uri())).await;
        assert!(matches!(result, Err(ScraperError::Timeout { .. })));
    }
}
