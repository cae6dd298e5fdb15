//! Outbound HTTP with a persistent header and cookie identity.
//!
//! One [`FetchClient`] is built at startup and shared through application
//! state. Its default headers and cookie jar live for the whole process and
//! are lock-guarded, so they can be changed while requests are in flight.

pub mod cookies;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use quick_xml::events::Event;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use scraper::Html;
use serde::de::{DeserializeOwned, IgnoredAny};
use thiserror::Error;
use url::Url;

pub use cookies::CookieJar;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const BOT_USER_AGENT: &str = "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; Googlebot/2.1; +http://www.google.com/bot.html) Chrome/W.X.Y.Z Safari/537.36";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid cookie: {0}")]
    InvalidCookie(String),

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(reqwest::Error),

    #[error("could not read response body: {0}")]
    Body(reqwest::Error),

    #[error("invalid json body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid xml body: {0}")]
    Xml(#[from] quick_xml::DeError),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(e)
        }
    }
}

pub struct FetchClient {
    http: reqwest::Client,
    headers: RwLock<HeaderMap>,
    cookies: Arc<CookieJar>,
}

impl FetchClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let cookies = Arc::new(CookieJar::new());
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_provider(Arc::clone(&cookies))
            .build()?;

        Ok(FetchClient {
            http,
            headers: RwLock::new(HeaderMap::new()),
            cookies,
        })
    }

    /// A client that identifies itself as a search engine crawler. Many shops
    /// only serve their Open Graph tags to crawlers.
    pub fn bot(timeout: Duration) -> Result<Self, FetchError> {
        let client = Self::new(timeout)?;
        client.add_header(USER_AGENT.as_str(), BOT_USER_AGENT)?;
        Ok(client)
    }

    /// Add a default header, sent with every request until removed.
    pub fn add_header(&self, name: &str, value: &str) -> Result<(), FetchError> {
        let (name, value) = header_pair(name, value)?;
        self.headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
        Ok(())
    }

    pub fn remove_header(&self, name: &str) {
        self.headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }

    pub fn default_headers(&self) -> HeaderMap {
        self.headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Add a cookie for the host and path of `url`. It is only attached to
    /// requests whose URL falls inside that scope.
    pub fn add_cookie(
        &self,
        url: &str,
        name: &str,
        value: &str,
        max_age: Option<Duration>,
    ) -> Result<(), FetchError> {
        let url = Url::parse(url)?;
        self.cookies.insert(&url, name, value, max_age)
    }

    pub fn remove_cookie(&self, url: &str, name: &str) -> Result<(), FetchError> {
        let url = Url::parse(url)?;
        self.cookies.remove(&url, name);
        Ok(())
    }

    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookies
    }

    /// Send a request, inferring the body's `Content-Type`. Pass an empty
    /// body for none.
    pub async fn fetch(
        &self,
        method: Method,
        url: &str,
        body: &str,
    ) -> Result<FetchResponse, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = infer_content_type(body) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        self.fetch_with_headers(method, url, body, &headers).await
    }

    /// Send a request with extra headers. `headers` override the client's
    /// defaults for this call only.
    pub async fn fetch_with_headers(
        &self,
        method: Method,
        url: &str,
        body: &str,
        headers: &HeaderMap,
    ) -> Result<FetchResponse, FetchError> {
        let url = Url::parse(url)?;

        let mut merged = self.default_headers();
        for (name, value) in headers {
            merged.insert(name.clone(), value.clone());
        }

        let mut request = self.http.request(method.clone(), url.clone()).headers(merged);
        if !body.is_empty() {
            request = request.body(body.to_string());
        }

        tracing::debug!(%method, %url, "Sending request");
        let response = request.send().await?;
        tracing::debug!(status = %response.status(), %url, "Received response");

        Ok(FetchResponse { response })
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), FetchError> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| FetchError::InvalidHeader(format!("bad header name '{name}'")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| FetchError::InvalidHeader(format!("bad value for header '{name}'")))?;
    Ok((name, value))
}

/// `Content-Type` for a request body: JSON, then XML, then plain text.
/// Empty bodies get none.
pub fn infer_content_type(body: &str) -> Option<&'static str> {
    if body.is_empty() {
        None
    } else if serde_json::from_str::<IgnoredAny>(body).is_ok() {
        Some("application/json")
    } else if is_xml(body) {
        Some("application/xml")
    } else {
        Some("text/plain")
    }
}

/// Whether `data` is a well-formed XML document with at least one element.
pub fn is_xml(data: &str) -> bool {
    let mut reader = quick_xml::Reader::from_str(data);
    let mut depth = 0usize;
    let mut saw_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                depth += 1;
                saw_element = true;
            }
            Ok(Event::End(_)) => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            Ok(Event::Empty(_)) => saw_element = true,
            Ok(Event::Text(text)) if depth == 0 => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    return false;
                }
            }
            Ok(Event::Eof) => return saw_element && depth == 0,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
}

/// A response whose body has not been read yet.
///
/// The body stream can be consumed once: every reader takes `self`, so a
/// second read does not compile. Dropping the response on any path releases
/// the connection.
#[derive(Debug)]
pub struct FetchResponse {
    response: reqwest::Response,
}

impl FetchResponse {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// Final URL after redirects.
    pub fn url(&self) -> &Url {
        self.response.url()
    }

    pub async fn text(self) -> Result<String, FetchError> {
        self.response.text().await.map_err(FetchError::Body)
    }

    pub async fn json<T: DeserializeOwned>(self) -> Result<T, FetchError> {
        let text = self.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn xml<T: DeserializeOwned>(self) -> Result<T, FetchError> {
        let text = self.text().await?;
        Ok(quick_xml::de::from_str(&text)?)
    }

    /// Parse the body as an HTML document. Malformed markup still yields a
    /// best-effort tree.
    pub async fn html(self) -> Result<Html, FetchError> {
        let text = self.text().await?;
        Ok(Html::parse_document(&text))
    }
}
