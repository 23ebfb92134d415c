//! dog.ceo adapter for `PhotoGateway`.

use super::{DogPhoto, GatewayError, PhotoGateway};
use log::{info, warn};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};

pub const DOG_CEO_BASE_URL: &str = "https://dog.ceo/api";
pub const DOG_CEO_PROVIDER: &str = "dog.ceo";

#[derive(Deserialize)]
struct RandomImage {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct RandomImages {
    #[serde(default)]
    message: Option<Vec<String>>,
}

/// Blocking client for `{base_url}/breeds/image/random[/{count}]`.
pub struct DogCeoGateway {
    client: Client,
    base_url: String,
}

impl DogCeoGateway {
    /// # Errors
    /// - `Transport` when the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let started_at = Instant::now();
        let url = format!("{}{path}", self.base_url);

        let result = self
            .client
            .get(&url)
            .send()
            .map_err(GatewayError::Transport)
            .and_then(|response| {
                let status = response.status();
                if status.is_success() {
                    response.json::<T>().map_err(GatewayError::Decode)
                } else {
                    Err(GatewayError::Status(status))
                }
            });

        match &result {
            Ok(_) => info!(
                "event=photo_fetch module=gateway status=ok path={path} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=photo_fetch module=gateway status=error path={path} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

impl PhotoGateway for DogCeoGateway {
    fn get_random(&self) -> Result<DogPhoto, GatewayError> {
        let body: RandomImage = self.fetch("/breeds/image/random")?;
        Ok(DogPhoto::from_url(
            body.message.unwrap_or_default(),
            DOG_CEO_PROVIDER,
        ))
    }

    fn get_random_many(&self, count: u32) -> Result<Vec<DogPhoto>, GatewayError> {
        let count = count.max(1);
        let body: RandomImages = self.fetch(&format!("/breeds/image/random/{count}"))?;
        Ok(body
            .message
            .unwrap_or_default()
            .into_iter()
            .map(|url| DogPhoto::from_url(url, DOG_CEO_PROVIDER))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::DogCeoGateway;
    use crate::gateway::{GatewayError, PhotoGateway};
    use httpmock::prelude::*;
    use std::time::Duration;

    fn gateway(server: &MockServer) -> DogCeoGateway {
        DogCeoGateway::new(server.url("/api/"), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn get_random_normalizes_message_url() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/breeds/image/random");
            then.status(200).json_body(serde_json::json!({
                "message": "https://images.dog.ceo/breeds/spaniel-cocker/n02102318_1.jpg",
                "status": "success"
            }));
        });

        let photo = gateway(&server).get_random().unwrap();

        mock.assert();
        assert_eq!(photo.breed, "spaniel");
        assert_eq!(photo.sub_breed, "cocker");
        assert_eq!(photo.provider, "dog.ceo");
    }

    #[test]
    fn get_random_many_clamps_count_to_one() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/breeds/image/random/1");
            then.status(200).json_body(serde_json::json!({
                "message": ["https://images.dog.ceo/breeds/pug/p.jpg"],
                "status": "success"
            }));
        });

        let photos = gateway(&server).get_random_many(0).unwrap();

        mock.assert();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].breed, "pug");
    }

    #[test]
    fn missing_message_yields_empty_photo() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/breeds/image/random");
            then.status(200).json_body(serde_json::json!({ "status": "success" }));
        });

        let photo = gateway(&server).get_random().unwrap();
        assert!(photo.image_url.is_empty());
        assert!(photo.breed.is_empty());
    }

    #[test]
    fn error_status_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/breeds/image/random/3");
            then.status(503);
        });

        let err = gateway(&server).get_random_many(3).unwrap_err();
        assert!(matches!(err, GatewayError::Status(status) if status.as_u16() == 503));
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/breeds/image/random");
            then.status(200).body("<html>not json</html>");
        });

        let err = gateway(&server).get_random().unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }
}
