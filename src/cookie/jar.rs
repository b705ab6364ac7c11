use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, error, info};

/// Ordered cookie name/value mapping. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieJar(Vec<(String, String)>);

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a cookie, keeping its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `name=value` pairs joined with `; `, empty string for an empty jar.
    pub fn header_value(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Collect every `Set-Cookie` line of a raw response (headers included).
    ///
    /// Each capture is split on its first `=`; pairs with an empty name or
    /// value are dropped.
    pub fn from_set_cookie_headers(raw: &str) -> Self {
        static SET_COOKIE_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = SET_COOKIE_REGEX
            .get_or_init(|| Regex::new(r"(?i)Set-Cookie:\s(.+?=.+?);").unwrap());

        let mut jar = CookieJar::new();
        for caps in re.captures_iter(raw) {
            let Some((name, value)) = caps[1].split_once('=') else {
                error!("Error extracting cookie from {:?}", &caps[1]);
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() || value.is_empty() {
                error!("Error extracting cookie name or value from {:?}", &caps[1]);
                continue;
            }
            debug!("Found cookie {}: {}", name, value);
            jar.insert(name, value);
        }

        info!("Cookies found: {}", jar.len());
        jar
    }
}

impl<K, V> FromIterator<(K, V)> for CookieJar
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut jar = CookieJar::new();
        for (k, v) in iter {
            jar.insert(k, v);
        }
        jar
    }
}
