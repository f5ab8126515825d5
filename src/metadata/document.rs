use scraper::{ElementRef, Html, Selector};

use crate::errors::CardError;

/// A parsed page.
///
/// Parsing never fails: html5ever repairs unclosed tags and bad nesting the
/// way browsers do, and an empty or garbage input simply matches nothing.
pub struct Document {
    html: Html,
}

fn selector(css: &str) -> Result<Selector, CardError> {
    Selector::parse(css)
        .map_err(|err| CardError::extraction(format!("invalid selector {css:?}: {err}")))
}

impl Document {
    pub fn parse(resp_text: &str) -> Self {
        let html = Html::parse_document(resp_text);

        if !html.errors.is_empty() {
            log::trace!("ignored {} html parse errors", html.errors.len());
        }

        Self { html }
    }

    /// `content` of the first `<meta property="{property}">` carrying one.
    pub fn meta_property(&self, property: &str) -> Result<Option<&str>, CardError> {
        let meta_selector = selector(&format!(r#"meta[property="{property}"][content]"#))?;

        Ok(self
            .html
            .select(&meta_selector)
            .next()
            .and_then(|element| element.attr("content")))
    }

    /// Text of the first `<title>`, wherever it sits.
    pub fn title(&self) -> Result<Option<String>, CardError> {
        let title_selector = selector("title")?;

        Ok(self
            .html
            .select(&title_selector)
            .next()
            .map(|element| element.text().collect::<String>()))
    }

    /// Every `<img>` below `<body>`, in document order.
    ///
    /// Parsing runs with scripting enabled, so `<noscript>` content is raw
    /// text and images inside it are never returned.
    pub fn body_images(&self) -> Result<Vec<ElementRef<'_>>, CardError> {
        let img_selector = selector("body img")?;

        Ok(self.html.select(&img_selector).collect())
    }
}
