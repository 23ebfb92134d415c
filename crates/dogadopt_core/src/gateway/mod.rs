//! Random dog photo lookup.
//!
//! # Responsibility
//! - Define the port through which callers ask for random dog photos.
//! - Normalize provider image URLs into breed/sub-breed labels.
//!
//! # Invariants
//! - Gateway failures are opaque to the core: callers treat any
//!   `GatewayError` as "photo unavailable". Nothing here retries.
//! - URL normalization never fails; unrecognized URLs yield empty labels.

mod dog_ceo;

pub use dog_ceo::{DogCeoGateway, DOG_CEO_BASE_URL, DOG_CEO_PROVIDER};

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

/// One normalized photo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DogPhoto {
    pub image_url: String,
    pub breed: String,
    pub sub_breed: String,
    pub provider: String,
}

impl DogPhoto {
    /// Builds a record from a provider image URL.
    pub fn from_url(image_url: impl Into<String>, provider: impl Into<String>) -> Self {
        let image_url = image_url.into();
        let (breed, sub_breed) = parse_breed_labels(&image_url);
        Self {
            image_url,
            breed,
            sub_breed,
            provider: provider.into(),
        }
    }
}

/// Port for random photo providers.
pub trait PhotoGateway {
    fn get_random(&self) -> Result<DogPhoto, GatewayError>;

    /// Returns up to `count` photos; `count` below 1 is treated as 1.
    fn get_random_many(&self, count: u32) -> Result<Vec<DogPhoto>, GatewayError>;
}

#[derive(Debug)]
pub enum GatewayError {
    /// Request could not be sent or the response could not be read.
    Transport(reqwest::Error),
    /// Provider answered with a non-success HTTP status.
    Status(reqwest::StatusCode),
    /// Provider body is not the expected JSON shape.
    Decode(reqwest::Error),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "photo provider unreachable: {err}"),
            Self::Status(status) => write!(f, "photo provider returned {status}"),
            Self::Decode(err) => write!(f, "invalid photo provider response: {err}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) | Self::Decode(err) => Some(err),
            Self::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value)
        } else {
            Self::Transport(value)
        }
    }
}

/// Extracts `(breed, sub_breed)` from an image URL.
///
/// The segment after `breeds` is split on `-`: the first part is the breed,
/// the rest joined by spaces is the sub-breed.
pub fn parse_breed_labels(image_url: &str) -> (String, String) {
    let Ok(url) = Url::parse(image_url.trim()) else {
        return (String::new(), String::new());
    };
    let Some(segments) = url.path_segments() else {
        return (String::new(), String::new());
    };

    let mut segments = segments.skip_while(|segment| !segment.eq_ignore_ascii_case("breeds"));
    let Some(raw) = segments.nth(1) else {
        return (String::new(), String::new());
    };

    let mut parts = raw.split('-').filter(|part| !part.is_empty());
    let breed = parts.next().unwrap_or_default().to_string();
    let sub_breed = parts.collect::<Vec<_>>().join(" ");
    (breed, sub_breed)
}
