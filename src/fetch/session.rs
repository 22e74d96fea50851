// src/fetch/session.rs

use reqwest::blocking::Client;
use tracing::{debug, warn};
use url::Url;

use super::{PageSource, ResponseCache};
use crate::error::{Result, ScrapeError};

/// One blocking HTTP client reused for every request of a run, optionally
/// backed by an on-disk response cache.
pub struct Session {
    client: Client,
    cache: Option<ResponseCache>,
}

impl Session {
    pub fn new(user_agent: &str, cache: Option<ResponseCache>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(ScrapeError::Client)?;
        Ok(Self { client, cache })
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    fn get(&self, url: &Url) -> Result<Vec<u8>> {
        debug!(%url, "GET");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| ScrapeError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().map_err(|source| ScrapeError::Transport {
            url: url.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }
}

impl PageSource for Session {
    fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        if let Some(cache) = &self.cache {
            match cache.get(url) {
                Ok(Some(body)) => {
                    debug!(%url, bytes = body.len(), "cache hit");
                    return Ok(body);
                }
                Ok(None) => {}
                Err(e) => warn!(%url, error = %e, "cache read failed, refetching"),
            }
        }

        let body = self.get(url)?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(url, &body) {
                warn!(%url, error = %e, "cache write failed");
            }
        }
        Ok(body)
    }
}
