// src/core/net.rs
// Blocking HTTP with a pinned User-Agent, per-request timeout and one
// bounded retry after a fixed backoff. A body that will not read (or
// parse, for JSON) counts as a transient failure like a bad status does.

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::FetchPolicy;
use crate::error::{Error, Result};

pub struct Http {
    client: Client,
    retries: u32,
    backoff: Duration,
}

impl Http {
    pub fn new(policy: &FetchPolicy) -> Result<Self> {
        let client = Client::builder()
            .user_agent(policy.user_agent.clone())
            .timeout(policy.timeout)
            .build()?;
        Ok(Self {
            client,
            retries: policy.retries,
            backoff: policy.backoff,
        })
    }

    /// GET returning the response body as text.
    pub fn get_text(&self, url: &str) -> Result<String> {
        self.get_with(url, &[], |resp| Ok(resp.text()?))
    }

    /// GET with query parameters, parsing the body as JSON.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        self.get_with(url, query, |resp| Ok(resp.json()?))
    }

    fn send(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let resp = self.client.get(url).query(query).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp)
    }

    fn get_with<T>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        read: impl Fn(Response) -> Result<T>,
    ) -> Result<T> {
        let mut tries = 0;
        loop {
            match self.send(url, query).and_then(&read) {
                Ok(value) => return Ok(value),
                Err(e) if tries < self.retries => {
                    tries += 1;
                    warn!(url, error = %e, attempt = tries, "request failed, retrying after backoff");
                    thread::sleep(self.backoff);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
