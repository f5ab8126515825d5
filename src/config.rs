use anyhow::{bail, Context};
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path};

const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

const FETCH_TIMEOUT_SECS: u64 = 15;
const FETCH_MAX_REDIRECTS: usize = 5;
const USER_AGENT_DEFAULT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_DEFAULT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_DEFAULT: &str = "en-US,en;q=0.5";

const NO_HEADLINE: &str = "No Headline Found";
const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/600x400?text=No+Image+Available";
const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons?domain=";

/// Outbound request settings. Defaults mimic a desktop browser to get past
/// naive bot filters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Redirect hops followed before giving up
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept")]
    pub accept: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: FETCH_TIMEOUT_SECS,
            max_redirects: FETCH_MAX_REDIRECTS,
            user_agent: USER_AGENT_DEFAULT.to_string(),
            accept: ACCEPT_DEFAULT.to_string(),
            accept_language: ACCEPT_LANGUAGE_DEFAULT.to_string(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    FETCH_TIMEOUT_SECS
}

fn default_max_redirects() -> usize {
    FETCH_MAX_REDIRECTS
}

fn default_user_agent() -> String {
    USER_AGENT_DEFAULT.to_string()
}

fn default_accept() -> String {
    ACCEPT_DEFAULT.to_string()
}

fn default_accept_language() -> String {
    ACCEPT_LANGUAGE_DEFAULT.to_string()
}

/// Defaults used when a card field can't be recovered from the document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(default = "default_no_headline")]
    pub no_headline: String,

    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,

    /// Prefix the url-encoded page URL is appended to
    #[serde(default = "default_favicon_service")]
    pub favicon_service: String,

    /// Treat `og:*` tags with blank content as missing and move on to the
    /// next source.
    ///
    /// *Off by default: a present tag wins even when empty*
    #[serde(default)]
    pub fall_through_empty_og: bool,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            no_headline: NO_HEADLINE.to_string(),
            placeholder_image: PLACEHOLDER_IMAGE.to_string(),
            favicon_service: FAVICON_SERVICE.to_string(),
            fall_through_empty_og: false,
        }
    }
}

fn default_no_headline() -> String {
    NO_HEADLINE.to_string()
}

fn default_placeholder_image() -> String {
    PLACEHOLDER_IMAGE.to_string()
}

fn default_favicon_service() -> String {
    FAVICON_SERVICE.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub card: CardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            fetch: FetchConfig::default(),
            card: CardConfig::default(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.listen.parse::<SocketAddr>().is_err() {
            bail!("listen must be a socket address, got {:?}", self.listen);
        }

        let fetch = &self.fetch;
        if fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be greater than 0");
        }

        for (name, value) in [
            ("fetch.user_agent", &fetch.user_agent),
            ("fetch.accept", &fetch.accept),
            ("fetch.accept_language", &fetch.accept_language),
        ] {
            if HeaderValue::from_str(value).is_err() {
                bail!("{name} is not a valid header value: {value:?}");
            }
        }

        let card = &self.card;
        for (name, value) in [
            ("card.no_headline", &card.no_headline),
            ("card.placeholder_image", &card.placeholder_image),
            ("card.favicon_service", &card.favicon_service),
        ] {
            if value.trim().is_empty() {
                bail!("{name} must not be empty");
            }
        }

        Ok(())
    }

    pub fn from_yaml(config_str: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yml::from_str(config_str).context("config is malformed")?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::from_yaml(&config_str).with_context(|| format!("in {}", path.display()))
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yml::to_string(self)?)
    }
}
