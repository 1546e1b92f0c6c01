//! Bounded-retry HTTP GET used by the download workers.
use std::fmt::Debug;
use std::sync::Arc;

use bytes::Bytes;
use log::{debug, warn};
use reqwest::blocking::Client;

use crate::error::FetchError;

/// Default number of GET attempts per task.
pub const DEFAULT_ATTEMPTS: u32 = 10;

/// Anything able to perform one GET and hand back the whole body.
///
/// Shared between all worker threads, so implementations must be thread-safe.
pub trait Transport: Send + Sync + Debug {
    fn get(&self, url: &str) -> Result<Bytes, FetchError>;
}

impl Transport for Client {
    fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        let res = Client::get(self, url).send()?;

        if !res.status().is_success() {
            return Err(FetchError::BadStatus {
                status: res.status().as_u16(),
            });
        }

        Ok(res.bytes()?)
    }
}

/// Builds the blocking client used for media downloads.
///
/// The user-agent always follows the version declared inside `Cargo.toml`.
pub fn default_client() -> Result<Client, FetchError> {
    let ua = format!("Rust VK Media Downloader/{}", env!("CARGO_PKG_VERSION"));
    debug!("Using user-agent: {}", ua);
    Ok(Client::builder().user_agent(ua).build()?)
}

/// Retries a [`Transport`] up to `max_attempts` times, back to back.
#[derive(Debug, Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    max_attempts: u32,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            max_attempts: DEFAULT_ATTEMPTS,
        }
    }

    /// Fetcher over a fresh [`default_client`].
    pub fn with_default_client() -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(default_client()?)))
    }

    /// A budget of zero still makes one attempt.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let mut attempt = 1;
        loop {
            match self.transport.get(url) {
                Ok(bytes) => {
                    debug!("Fetched {} ({} bytes) on attempt {}", url, bytes.len(), attempt);
                    return Ok(bytes);
                }
                Err(error) => {
                    warn!("{} ({}) [attempt {}/{}]", error, url, attempt, self.max_attempts);
                    if attempt >= self.max_attempts {
                        return Err(FetchError::AttemptsExhausted {
                            url: url.to_string(),
                            attempts: attempt,
                            last: Box::new(error),
                        });
                    }
                }
            }
            attempt += 1;
        }
    }
}
