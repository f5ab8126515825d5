pub mod document;
pub mod resolve;
pub mod strategies;
pub mod types;

pub use document::Document;
pub use types::{CardMetadata, ResultEnvelope};

use url::{form_urlencoded, Url};

use crate::config::CardConfig;
use crate::errors::CardError;
use strategies::Strategy;

/// Walk `chain` in order and return the first value produced, with the name
/// of the strategy that produced it.
pub fn run_chain(
    chain: &[Strategy],
    doc: &Document,
    url: &Url,
    skip_blank: bool,
) -> Result<Option<(&'static str, String)>, CardError> {
    for strategy in chain {
        match (strategy.run)(doc, url)? {
            Some(value) if skip_blank && value.is_empty() => {
                log::debug!("{}: blank, falling through", strategy.name);
            }
            Some(value) => return Ok(Some((strategy.name, value))),
            None => {}
        }
    }

    Ok(None)
}

/// Favicon lookup through a third-party service, derived from the URL alone.
pub fn favicon_url(service: &str, page_url: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(page_url.as_bytes()).collect();
    format!("{service}{encoded}")
}

/// Build the card for a page.
///
/// `page_url` is the validated request as the caller typed it and is echoed
/// back verbatim; `url` is its parsed form.
pub fn extract_card(
    doc: &Document,
    page_url: &str,
    url: &Url,
    config: &CardConfig,
) -> Result<CardMetadata, CardError> {
    let skip_blank = config.fall_through_empty_og;

    let pick = |field: &str, chain: &[Strategy]| -> Result<Option<String>, CardError> {
        let found = run_chain(chain, doc, url, skip_blank)?;
        match &found {
            Some((source, _)) => log::debug!("{field}: taken from {source}"),
            None => log::debug!("{field}: using default"),
        }
        Ok(found.map(|(_, value)| value))
    };

    let headline = pick("headline", strategies::HEADLINE)?
        .unwrap_or_else(|| config.no_headline.clone());
    let card_image = pick("card_image", strategies::IMAGE)?
        .unwrap_or_else(|| config.placeholder_image.clone());
    let website_name = pick("website_name", strategies::SITE_NAME)?
        .unwrap_or_else(|| "Unknown Website".to_string());

    Ok(CardMetadata {
        headline,
        card_image,
        website_name,
        original_url: page_url.to_string(),
        favicon: favicon_url(&config.favicon_service, page_url),
    })
}
