use std::sync::PoisonError;
use std::time::Duration;

use cookie_store::RawCookie;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use reqwest_cookie_store::CookieStoreRwLock;
use url::Url;

use super::FetchError;

/// Cookie store shared by every request a [`FetchClient`](super::FetchClient)
/// makes.
///
/// Storage and `Set-Cookie` handling (domain and path scoping, `Expires`,
/// `Max-Age`, `Secure`) are done by `cookie_store`; this type adds the
/// name/value API the client exposes.
pub struct CookieJar {
    store: CookieStoreRwLock,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    pub fn new() -> Self {
        CookieJar {
            store: CookieStoreRwLock::new(cookie_store::CookieStore::default()),
        }
    }

    /// Store a host-only cookie for the host and path of `url`, replacing any
    /// cookie with the same name in that scope. A zero `max_age` removes it.
    pub fn insert(
        &self,
        url: &Url,
        name: &str,
        value: &str,
        max_age: Option<Duration>,
    ) -> Result<(), FetchError> {
        if max_age == Some(Duration::ZERO) {
            self.remove(url, name);
            return Ok(());
        }

        let mut header = format!("{name}={value}; Path={}", scope_path(url));
        if let Some(age) = max_age {
            header.push_str(&format!("; Max-Age={}", age.as_secs().max(1)));
        }
        let cookie =
            RawCookie::parse(header).map_err(|e| FetchError::InvalidCookie(e.to_string()))?;

        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert_raw(&cookie, url)
            .map_err(|e| FetchError::InvalidCookie(e.to_string()))?;
        Ok(())
    }

    /// Remove the cookie called `name` stored for the host and path of `url`.
    pub fn remove(&self, url: &Url, name: &str) {
        let Some(host) = url.host_str() else {
            return;
        };
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&host.to_ascii_lowercase(), scope_path(url), name);
    }

    /// Unexpired `(name, value)` pairs that would be sent to `url`.
    pub fn matching(&self, url: &Url) -> Vec<(String, String)> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_request_values(url)
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

impl CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.store.set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.store.cookies(url)
    }
}

fn scope_path(url: &Url) -> &str {
    match url.path() {
        "" => "/",
        path => path,
    }
}
