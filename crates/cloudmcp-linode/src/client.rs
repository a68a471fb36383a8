//! HTTP client bound to a single Linode account.

use crate::error::LinodeError;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Public Linode API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.linode.com";

/// Largest page size the API accepts.
const PAGE_SIZE: u32 = 500;

/// Receives one notification per API request.
///
/// Implemented by the metrics registry so the client stays free of any
/// metrics dependency.
pub trait RequestObserver: Send + Sync {
    /// Called before the request is sent. `endpoint` is the path template,
    /// e.g. `/v4/linode/instances/{id}`.
    fn begin(&self, method: &str, endpoint: &str) -> Box<dyn RequestSpan>;
}

/// An in-flight request started by [`RequestObserver::begin`].
pub trait RequestSpan: Send {
    /// Called once with the HTTP status code, or `"error"` when no response
    /// was received.
    fn finish(self: Box<Self>, status: &str);
}

struct NoopObserver;

struct NoopSpan;

impl RequestObserver for NoopObserver {
    fn begin(&self, _method: &str, _endpoint: &str) -> Box<dyn RequestSpan> {
        Box::new(NoopSpan)
    }
}

impl RequestSpan for NoopSpan {
    fn finish(self: Box<Self>, _status: &str) {}
}

/// Check an identifier that will be placed in a request path.
///
/// `/` may separate segments since image IDs look like `private/42`. Every
/// segment must be non-empty, must not be `.` or `..`, and must not contain
/// `?`, `#`, `%`, `\`, whitespace or control characters. Returns the reason
/// the value was refused.
pub fn check_path_identifier(value: &str) -> Result<(), &'static str> {
    if value.is_empty() {
        return Err("must not be empty");
    }
    for segment in value.split('/') {
        match segment {
            "" => return Err("must not contain empty path segments"),
            "." | ".." => return Err("must not contain '.' or '..' segments"),
            _ => {}
        }
        let forbidden = |c: char| {
            matches!(c, '?' | '#' | '%' | '\\') || c.is_whitespace() || c.is_control()
        };
        if segment.chars().any(forbidden) {
            return Err("contains characters not allowed in a path");
        }
    }
    Ok(())
}

/// A request path together with the template it was rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub(crate) path: String,
    pub(crate) template: &'static str,
}

impl Endpoint {
    /// An endpoint without placeholders.
    pub(crate) fn fixed(template: &'static str) -> Self {
        Self {
            path: template.to_string(),
            template,
        }
    }

    /// Fill `{...}` placeholders in order with `values`.
    pub(crate) fn render(template: &'static str, values: &[&(dyn fmt::Display + Sync)]) -> Self {
        let mut path = String::with_capacity(template.len() + 16);
        let mut values = values.iter();
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            path.push_str(&rest[..start]);
            let Some(end) = rest[start..].find('}') else {
                break;
            };
            match values.next() {
                Some(value) => path.push_str(&value.to_string()),
                None => path.push_str(&rest[start..start + end + 1]),
            }
            rest = &rest[start + end + 1..];
        }
        path.push_str(rest);

        Self { path, template }
    }

    /// Render a template with a single caller-supplied string identifier.
    pub(crate) fn identified(template: &'static str, id: &str) -> Result<Self, LinodeError> {
        check_path_identifier(id).map_err(|reason| LinodeError::InvalidIdentifier {
            value: id.to_string(),
            reason,
        })?;
        Ok(Self::render(template, &[&id]))
    }

    fn with_page(&self, page: u32) -> Self {
        Self {
            path: format!("{}?page={page}&page_size={PAGE_SIZE}", self.path),
            template: self.template,
        }
    }
}

/// One page of a paginated collection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub pages: u32,
    #[serde(default)]
    pub results: u32,
}

fn first_page() -> u32 {
    1
}

/// Builder for [`LinodeClient`].
pub struct LinodeClientBuilder {
    token: String,
    base_url: Option<String>,
    user_agent: String,
    observer: Option<Arc<dyn RequestObserver>>,
}

impl LinodeClientBuilder {
    /// Override the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the `User-Agent` header.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Report every request to `observer`.
    pub fn observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<LinodeClient, LinodeError> {
        let token = self.token.trim().to_string();
        if token.is_empty() {
            return Err(LinodeError::MissingToken);
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(LinodeError::InvalidBaseUrl(base_url));
        }

        let http = reqwest::Client::builder()
            .user_agent(self.user_agent)
            .build()?;

        Ok(LinodeClient {
            http,
            base_url,
            token,
            observer: self.observer.unwrap_or_else(|| Arc::new(NoopObserver)),
        })
    }
}

/// Linode API client for one account.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct LinodeClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    observer: Arc<dyn RequestObserver>,
}

impl fmt::Debug for LinodeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinodeClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl LinodeClient {
    /// Create a client against the public API.
    pub fn new(token: impl Into<String>) -> Result<Self, LinodeError> {
        Self::builder(token).build()
    }

    /// Start building a client.
    pub fn builder(token: impl Into<String>) -> LinodeClientBuilder {
        LinodeClientBuilder {
            token: token.into(),
            base_url: None,
            user_agent: concat!("cloudmcp/", env!("CARGO_PKG_VERSION")).to_string(),
            observer: None,
        }
    }

    /// The API base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, LinodeError> {
        self.send(Method::GET, endpoint, None).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: &impl Serialize,
    ) -> Result<T, LinodeError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, endpoint, Some(body)).await
    }

    /// POST without a request body (boot, reboot, credential reset, ...).
    pub(crate) async fn post_empty(&self, endpoint: Endpoint) -> Result<(), LinodeError> {
        let _: serde::de::IgnoredAny = self
            .send(Method::POST, endpoint, Some(serde_json::json!({})))
            .await?;
        Ok(())
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: &impl Serialize,
    ) -> Result<T, LinodeError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, endpoint, Some(body)).await
    }

    pub(crate) async fn delete(&self, endpoint: Endpoint) -> Result<(), LinodeError> {
        let _: serde::de::IgnoredAny = self.send(Method::DELETE, endpoint, None).await?;
        Ok(())
    }

    /// Fetch every page of a collection.
    pub(crate) async fn list_all<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
    ) -> Result<Vec<T>, LinodeError> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let current: Page<T> = self.get(endpoint.with_page(page)).await?;
            let pages = current.pages;
            items.extend(current.data);
            if page >= pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: Endpoint,
        body: Option<serde_json::Value>,
    ) -> Result<T, LinodeError> {
        let url = format!("{}{}", self.base_url, endpoint.path);
        tracing::debug!(method = %method, endpoint = endpoint.template, "Linode API request");

        let span = self.observer.begin(method.as_str(), endpoint.template);
        let mut request = self.http.request(method, &url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                span.finish("error");
                return Err(LinodeError::Http(e));
            }
        };

        let status = response.status();
        span.finish(status.as_str());

        let bytes = response.bytes().await?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            return Err(LinodeError::from_response(status.as_u16(), &body));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}
