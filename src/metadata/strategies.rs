//! Ordered sources for each card field.
//!
//! Every strategy is a pure function of the parsed page and the request URL.
//! The extractor walks a chain front to back and keeps the first value found,
//! so reordering or adding a source is a one-line change to the lists below.

use url::Url;

use crate::errors::CardError;
use crate::metadata::document::Document;
use crate::metadata::resolve::resolve_image_url;

pub type StrategyFn = fn(&Document, &Url) -> Result<Option<String>, CardError>;

pub struct Strategy {
    pub name: &'static str,
    pub run: StrategyFn,
}

pub const HEADLINE: &[Strategy] = &[
    Strategy {
        name: "og:title",
        run: og_title,
    },
    Strategy {
        name: "title",
        run: title_tag,
    },
];

pub const IMAGE: &[Strategy] = &[
    Strategy {
        name: "og:image",
        run: og_image,
    },
    Strategy {
        name: "body img",
        run: first_content_image,
    },
];

pub const SITE_NAME: &[Strategy] = &[
    Strategy {
        name: "og:site_name",
        run: og_site_name,
    },
    Strategy {
        name: "host",
        run: request_host,
    },
];

fn og(doc: &Document, property: &str) -> Result<Option<String>, CardError> {
    Ok(doc
        .meta_property(property)?
        .map(|content| content.trim().to_string()))
}

pub fn og_title(doc: &Document, _url: &Url) -> Result<Option<String>, CardError> {
    og(doc, "og:title")
}

pub fn title_tag(doc: &Document, _url: &Url) -> Result<Option<String>, CardError> {
    Ok(doc.title()?.map(|title| title.trim().to_string()))
}

/// `og:image` is expected to be absolute already and is not resolved.
pub fn og_image(doc: &Document, _url: &Url) -> Result<Option<String>, CardError> {
    og(doc, "og:image")
}

/// First body image that doesn't look like an icon: neither dimension
/// mentions 32 and the class doesn't mention "icon".
pub fn first_content_image(doc: &Document, url: &Url) -> Result<Option<String>, CardError> {
    for img in doc.body_images()? {
        let attr = |name: &str| img.attr(name).unwrap_or_default();

        if attr("width").contains("32")
            || attr("height").contains("32")
            || attr("class").contains("icon")
        {
            continue;
        }

        return Ok(img
            .attr("src")
            .map(|src| resolve_image_url(src.trim(), url)));
    }

    Ok(None)
}

pub fn og_site_name(doc: &Document, _url: &Url) -> Result<Option<String>, CardError> {
    og(doc, "og:site_name")
}

pub fn request_host(_doc: &Document, url: &Url) -> Result<Option<String>, CardError> {
    Ok(url.host_str().map(str::to_string))
}
