use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::core::config::ServiceConfig;
use crate::{MapError, Result};

/// Ordered query parameters. A key that is not present is never sent, which
/// is distinct from sending it with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    pairs: Vec<(String, String)>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Appends the parameter only when `value` is present
    pub fn push_opt(&mut self, key: impl Into<String>, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// A fully read HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, reason: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            reason: reason.into(),
            content_type: None,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx response into [`MapError::Status`]
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(MapError::Status {
                status: self.status,
                reason: self.reason,
            })
        }
    }
}

/// Issues blocking GET requests on behalf of the service clients.
pub trait Transport {
    fn get(&self, url: &str, params: &RequestParams) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, params: &RequestParams) -> Result<HttpResponse> {
        (**self).get(url, params)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str, params: &RequestParams) -> Result<HttpResponse> {
        (**self).get(url, params)
    }
}

/// Transport backed by a blocking `reqwest` client. The client is built on
/// first use so TLS and connection pool setup happen once.
#[derive(Debug)]
pub struct HttpTransport {
    user_agent: String,
    timeout: Duration,
    client: OnceCell<Client>,
}

impl HttpTransport {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| {
            Client::builder()
                .user_agent(self.user_agent.as_str())
                .timeout(self.timeout)
                .build()
                .map_err(MapError::from)
        })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(&ServiceConfig::default())
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, params: &RequestParams) -> Result<HttpResponse> {
        log::debug!("GET {} {:?}", url, params.pairs());
        let response = self.client()?.get(url).query(params.pairs()).send()?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes()?.to_vec();

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            content_type,
            body,
        })
    }
}
