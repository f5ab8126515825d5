use url::Url;

use crate::config::{CardConfig, Config};
use crate::errors::CardError;
use crate::metadata::{extract_card, CardMetadata, Document, ResultEnvelope};
use crate::scrape::{PageFetcher, ReqwestFetcher};

/// Accept only absolute http(s) URLs with a host. Nothing else is ever
/// handed to a fetcher.
pub fn validate_url(input: &str) -> Result<Url, CardError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CardError::InvalidUrl);
    }

    let url = Url::parse(input).map_err(|_| CardError::InvalidUrl)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CardError::InvalidUrl);
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(CardError::InvalidUrl),
    }
}

/// Turns a URL into a card: validate, fetch, parse, extract.
pub struct CardService<F> {
    fetcher: F,
    config: CardConfig,
}

impl<F: PageFetcher> CardService<F> {
    pub fn new(fetcher: F, config: CardConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn try_generate(&self, input: &str) -> Result<CardMetadata, CardError> {
        let url = validate_url(input)?;

        let page = self.fetcher.fetch(&url)?;
        log::debug!("{url}: got {} bytes (status {})", page.body.len(), page.status);

        let doc = Document::parse(&page.body);
        extract_card(&doc, input.trim(), &url, &self.config)
    }

    /// Never fails: every outcome is folded into the envelope.
    pub fn generate(&self, input: &str) -> ResultEnvelope {
        match self.try_generate(input) {
            Ok(card) => {
                log::info!("card generated for {}", card.original_url);
                ResultEnvelope::success(card)
            }
            Err(err) => {
                if err.is_internal() {
                    log::error!("Error processing URL {input}: {err}");
                } else {
                    log::warn!("{input}: {err}");
                }
                ResultEnvelope::failure(err.to_string())
            }
        }
    }
}

/// One request with a fresh HTTP client.
pub fn generate_card(config: &Config, input: &str) -> ResultEnvelope {
    match ReqwestFetcher::new(&config.fetch) {
        Ok(fetcher) => CardService::new(fetcher, config.card.clone()).generate(input),
        Err(err) => {
            let err = CardError::from(err);
            log::error!("Error processing URL {input}: {err}");
            ResultEnvelope::failure(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/a/b?c=d#e").is_ok());
        assert!(validate_url("  https://example.com/padded  ").is_ok());
        assert!(validate_url("http://127.0.0.1:8080/").is_ok());
    }

    #[test]
    fn test_invalid_urls() {
        for input in [
            "",
            "   ",
            "example.com",
            "example.com/page",
            "not a url",
            "https://",
            "mailto:someone@example.com",
            "ftp://example.com/file",
            "javascript:alert(1)",
        ] {
            assert!(
                matches!(validate_url(input), Err(CardError::InvalidUrl)),
                "accepted {input:?}"
            );
        }
    }
}
