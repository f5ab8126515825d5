use reqwest::{
    blocking::Client,
    header::{self, HeaderMap, HeaderValue},
    redirect,
};
use std::{
    error::Error,
    fmt,
    sync::{
        atomic::{AtomicU16, Ordering},
        mpsc, Arc,
    },
    thread,
    time::Duration,
};
use url::Url;

use crate::config::FetchConfig;

pub struct FetchedPage {
    pub body: String,
    pub status: u16,
}

/// A failed fetch. `status` is `None` when no HTTP response was received
/// (DNS, refused connection, timeout, TLS, redirect loop).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub status: Option<u16>,
    pub error: String,
}

impl FetchError {
    pub fn status(code: u16) -> Self {
        Self {
            status: Some(code),
            error: String::new(),
        }
    }

    pub fn transport(status: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to fetch content from URL. HTTP Code: {} Error: {}",
            self.status.unwrap_or(0),
            self.error
        )
    }
}

impl Error for FetchError {}

/// Retrieves the raw document behind a URL.
pub trait PageFetcher {
    /// Single attempt, no retries.
    fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        (**self).fetch(url)
    }
}

fn get_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => e.to_string(),
            None => e.to_string(),
        },
        None => error.to_string(),
    }
}

pub fn browser_headers(config: &FetchConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let pairs = [
        (header::ACCEPT, config.accept.as_str()),
        (header::ACCEPT_LANGUAGE, config.accept_language.as_str()),
        (header::CONNECTION, "keep-alive"),
        (header::UPGRADE_INSECURE_REQUESTS, "1"),
    ];

    for (name, value) in pairs {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(err) => log::warn!("skipping header {name}: {err}"),
        }
    }

    headers
}

pub struct ReqwestFetcher {
    client: Client,
    timeout: Duration,
}

impl ReqwestFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(browser_headers(config))
            .redirect(redirect::Policy::limited(config.max_redirects))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, timeout })
    }
}

/// One GET. `seen` receives the final status as soon as headers arrive.
fn fetch_once(
    client: &Client,
    url: Url,
    iden: &str,
    seen: &AtomicU16,
) -> Result<FetchedPage, FetchError> {
    let resp = match client.get(url).send() {
        Ok(r) => r,
        Err(err) => {
            log::error!("{iden}: {err}: {:#?}", get_error(&err));
            let status = err.status().map(|s| s.as_u16());
            return Err(FetchError::transport(status, get_error(&err)));
        }
    };

    let status = resp.status();
    seen.store(status.as_u16(), Ordering::SeqCst);

    if status.as_u16() >= 400 {
        log::debug!("{iden}: {:?}", status.to_string());
        return Err(FetchError::status(status.as_u16()));
    }

    let body = resp.text().map_err(|err| {
        log::debug!("{iden}: timeout={}", err.is_timeout());
        FetchError::transport(Some(status.as_u16()), get_error(&err))
    })?;

    log::debug!("{iden}: {} bytes, status {}", body.len(), status.as_u16());

    Ok(FetchedPage {
        body,
        status: status.as_u16(),
    })
}

impl PageFetcher for ReqwestFetcher {
    // The blocking client restarts its timeout for the body read, so the
    // whole exchange runs on a worker and the caller waits at most `timeout`.
    fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let iden = format!("{}{}", url.host_str().unwrap_or_default(), url.path());

        log::debug!("{iden}: requesting");

        let client = self.client.clone();
        let url = url.clone();
        let seen = Arc::new(AtomicU16::new(0));
        let (tx, rx) = mpsc::channel();

        {
            let iden = iden.clone();
            let seen = seen.clone();
            thread::spawn(move || {
                let _ = tx.send(fetch_once(&client, url, &iden, &seen));
            });
        }

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                log::error!("{iden}: no complete response within {:?}", self.timeout);
                let status = Some(seen.load(Ordering::SeqCst)).filter(|code| *code != 0);
                Err(FetchError::transport(status, "operation timed out"))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(FetchError::transport(None, "fetch worker stopped unexpectedly"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_carries_status() {
        let err = FetchError::status(404);
        assert_eq!(
            err.to_string(),
            "Failed to fetch content from URL. HTTP Code: 404 Error: "
        );
    }

    #[test]
    fn test_failure_message_without_status() {
        let err = FetchError::transport(None, "dns error: failed to lookup address");
        assert_eq!(
            err.to_string(),
            "Failed to fetch content from URL. HTTP Code: 0 Error: dns error: failed to lookup address"
        );
    }

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers(&FetchConfig::default());
        assert_eq!(headers[header::CONNECTION], "keep-alive");
        assert_eq!(headers[header::UPGRADE_INSECURE_REQUESTS], "1");
        assert_eq!(headers[header::ACCEPT_LANGUAGE], "en-US,en;q=0.5");
        assert!(headers[header::ACCEPT]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
    }

    #[test]
    fn test_invalid_header_value_is_skipped() {
        let config = FetchConfig {
            accept_language: "en\nUS".to_string(),
            ..Default::default()
        };
        let headers = browser_headers(&config);
        assert!(!headers.contains_key(header::ACCEPT_LANGUAGE));
        assert!(headers.contains_key(header::ACCEPT));
    }
}
