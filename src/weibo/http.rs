//! HTTP transport for Weibo endpoints
//!
//! Resources never talk to reqwest directly: they build a [`Request`] and hand
//! it to a borrowed [`Transport`]. [`HttpTransport`] is the production
//! implementation; tests plug in their own.

use crate::config::Config;
use crate::error::{truncate_body, Error, Result, TransportError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, REFERER};
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 13_2_3 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.0.3 Mobile/15E148 Safari/604.1";

pub const DEFAULT_MOBILE_BASE: &str = "https://m.weibo.cn";
pub const DEFAULT_CARD_BASE: &str = "https://card.weibo.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    truncate_body(body, MAX_LOG_BODY_LENGTH).replace(|c: char| c.is_control(), "")
}

/// Base URLs the resource URL templates are built on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Mobile site serving profiles, posts and container listings
    pub mobile: String,
    /// Card site serving articles
    pub card: String,
}

impl Endpoints {
    /// The public Weibo hosts
    pub fn weibo() -> &'static Endpoints {
        static WEIBO: OnceLock<Endpoints> = OnceLock::new();
        WEIBO.get_or_init(Endpoints::default)
    }

    /// Point both sites at one host (handy for a local mock server)
    pub fn single(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            mobile: base.clone(),
            card: base,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            mobile: DEFAULT_MOBILE_BASE.to_string(),
            card: DEFAULT_CARD_BASE.to_string(),
        }
    }
}

/// A fully described HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Append a query parameter
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a query parameter
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// URL with the query string applied, for logs and error messages
    pub fn full_url(&self) -> String {
        if self.params.is_empty() {
            return self.url.clone();
        }
        match url::Url::parse_with_params(&self.url, &self.params) {
            Ok(url) => url.to_string(),
            Err(_) => self.url.clone(),
        }
    }
}

/// Status and undecoded body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes requests on behalf of resources.
///
/// Implementations are shared by many resources at once and must not change
/// per-request state such as headers or cookies.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &Request) -> std::result::Result<RawResponse, TransportError>;

    /// Hosts used to build resource URLs
    fn endpoints(&self) -> &Endpoints {
        Endpoints::weibo()
    }
}

/// reqwest-backed transport with the mobile-site default headers
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoints: Endpoints,
}

impl HttpTransport {
    /// Create a transport, optionally carrying a session cookie
    pub fn new(cookie: Option<&str>) -> Result<Self> {
        Self::build(cookie, DEFAULT_USER_AGENT, DEFAULT_TIMEOUT, Endpoints::default())
    }

    /// Create a transport from user configuration
    pub fn from_config(config: &Config, cookie: Option<&str>) -> Result<Self> {
        let endpoints = Endpoints {
            mobile: config
                .mobile_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_MOBILE_BASE.to_string()),
            card: config
                .card_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_CARD_BASE.to_string()),
        };
        let timeout = config
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

        Self::build(cookie, user_agent, timeout, endpoints)
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    fn build(cookie: Option<&str>, user_agent: &str, timeout: Duration, endpoints: Endpoints) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static("https://m.weibo.cn/"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));

        if let Some(cookie) = cookie.filter(|c| !c.is_empty()) {
            let mut value = HeaderValue::from_str(cookie).map_err(Error::transport)?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(Error::transport)?;

        Ok(Self { client, endpoints })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &Request) -> std::result::Result<RawResponse, TransportError> {
        tracing::debug!("{} {}", request.method, request.full_url());

        let mut builder = self.client.request(request.method.clone(), &request.url);
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::warn!("API error: {} - {}", status, sanitize_for_log(&body));
        }

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }

    fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}
