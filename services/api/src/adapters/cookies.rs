//! services/api/src/adapters/cookies.rs
//!
//! A per-request cookie jar implementing the `SessionStorage` port. Values are read
//! from the incoming `Cookie` header; writes are queued as `Set-Cookie` lines that
//! the session middleware attaches to the response.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use axum::http::{header, HeaderMap};
use hogarzen_core::auth::COOKIE_CONSENT_KEY;
use hogarzen_core::ports::{Retention, SessionStorage};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

pub struct CookieJar {
    values: Mutex<HashMap<String, String>>,
    pending: Mutex<BTreeMap<String, String>>,
    secure: bool,
}

impl CookieJar {
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        let values = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|raw| raw.to_str().ok())
            .flat_map(parse_cookie_header)
            .collect();
        Self {
            values: Mutex::new(values),
            pending: Mutex::new(BTreeMap::new()),
            secure,
        }
    }

    /// The `Set-Cookie` values queued during this request, one per cookie name.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    fn attributes(&self, key: &str) -> String {
        let mut attributes = String::from("; Path=/; SameSite=Lax");
        // The consent flag is read by the browser banner.
        if key != COOKIE_CONSENT_KEY {
            attributes.push_str("; HttpOnly");
        }
        if self.secure {
            attributes.push_str("; Secure");
        }
        attributes
    }

    fn queue(&self, key: &str, line: String) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), line);
    }
}

/// Splits a `Cookie` header into decoded name/value pairs, skipping malformed parts.
pub fn parse_cookie_header(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|part| part.split_once('='))
        .map(|(name, value)| {
            let value = percent_decode_str(value.trim().trim_matches('"'))
                .decode_utf8_lossy()
                .into_owned();
            (name.trim().to_string(), value)
        })
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

impl SessionStorage for CookieJar {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str, retention: Retention) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());

        let encoded = utf8_percent_encode(value, NON_ALPHANUMERIC);
        let mut line = format!("{key}={encoded}{}", self.attributes(key));
        if let Retention::Persistent(duration) = retention {
            line.push_str(&format!("; Max-Age={}", duration.as_secs()));
        }
        self.queue(key, line);
    }

    fn remove(&self, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        let line = format!("{key}={}; Max-Age=0", self.attributes(key));
        self.queue(key, line);
    }
}
