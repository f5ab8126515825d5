use serde::{Deserialize, Serialize};

/// Everything a link-preview card needs. Always fully populated: fields
/// that can't be recovered from the page carry a default instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMetadata {
    pub headline: String,
    pub card_image: String,
    pub website_name: String,
    pub original_url: String,
    pub favicon: String,
}

/// The response of a card request.
///
/// Serialized flat: on success the card fields sit next to `success`
/// instead of being nested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: Option<CardMetadata>,
}

impl ResultEnvelope {
    pub fn success(card: CardMetadata) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(card),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}
