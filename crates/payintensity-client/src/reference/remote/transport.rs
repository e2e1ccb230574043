use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("unreadable response: {0}")]
    Decode(String),
}

pub trait Transport {
    fn get_text(&self, url: &str) -> Result<String, TransportError>;

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Network(error.to_string()))?;
        Ok(Self { client })
    }

    fn send(&self, url: &str) -> Result<reqwest::blocking::Response, TransportError> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .header(
                USER_AGENT,
                concat!("payintensity/", env!("CARGO_PKG_VERSION")),
            )
            .send()
            .map_err(|error| TransportError::Network(error.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn get_text(&self, url: &str) -> Result<String, TransportError> {
        self.send(url)?
            .text()
            .map_err(|error| TransportError::Decode(error.to_string()))
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.send(url)?
            .bytes()
            .map(|body| body.to_vec())
            .map_err(|error| TransportError::Decode(error.to_string()))
    }
}
