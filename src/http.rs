//! Generic HTTP fetch capability used by version search, catalog download and POM reads

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use reqwest::Url;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::repository::Authentication;

const USER_AGENT: &str = "cuba-sdk";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}

/// A GET request description, independent of the transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub auth: Option<Authentication>,
}

impl HttpRequest {
    pub fn get(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn auth(mut self, auth: Option<&Authentication>) -> Self {
        self.auth = auth.cloned();
        self
    }

    /// Full URL including the encoded query string
    pub fn full_url(&self) -> Result<Url, FetchError> {
        let parsed = if self.query.is_empty() {
            Url::parse(&self.url)
        } else {
            Url::parse_with_params(&self.url, &self.query)
        };
        parsed.map_err(|e| FetchError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })
    }
}

/// Trait for fetching raw response bodies
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Performs a GET request and returns the body on a 2xx response
    async fn get(&self, request: HttpRequest) -> Result<String, FetchError>;
}

/// reqwest-backed fetcher with a bounded request timeout
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, request: HttpRequest) -> Result<String, FetchError> {
        let url = request.full_url()?;
        debug!("GET {}", url);

        let mut builder = self.client.get(url.clone());
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(auth) = &request.auth {
            builder = builder.basic_auth(&auth.login, Some(&auth.password));
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!("{} returned status {}", url, status);
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
