use crate::cookie::CookieJar;
use crate::http::types::{HeaderList, Method};

/// Everything needed to build one curl invocation.
#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    pub url: String,
    /// `None` leaves the choice to curl (GET, or POST when data is sent).
    pub method: Option<Method>,
    pub headers: HeaderList,
    pub cookies: CookieJar,
    /// Raw body sent as `--data-binary`. Wins over `form` when both are set.
    pub body: Option<String>,
    /// Form fields, one `-d` (or `--data-urlencode`) flag each.
    pub form: Vec<String>,
    pub url_encode_form: bool,
    /// Passed to `--proxy` verbatim.
    pub proxy: Option<String>,
    pub follow_redirects: bool,
    pub include_headers: bool,
    pub compressed: bool,
    /// `-O`: curl saves the body under the remote file name.
    pub save_to_file: bool,
}

impl RequestSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn with_headers(mut self, headers: HeaderList) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_cookies(mut self, cookies: CookieJar) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_owned());
        self
    }

    pub fn with_form_field(mut self, field: &str) -> Self {
        self.form.push(field.to_owned());
        self
    }

    pub fn with_form(mut self, fields: Vec<String>) -> Self {
        self.form = fields;
        self
    }

    pub fn url_encoded(mut self) -> Self {
        self.url_encode_form = true;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn follow_redirects(mut self) -> Self {
        self.follow_redirects = true;
        self
    }

    pub fn include_headers(mut self) -> Self {
        self.include_headers = true;
        self
    }

    pub fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }

    pub fn save_to_file(mut self) -> Self {
        self.save_to_file = true;
        self
    }
}

/// `http://host:port` form of a bare `host:port` proxy.
pub fn format_proxy(proxy: Option<&str>) -> Option<String> {
    proxy
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("http://{}", p.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let spec = RequestSpec::new("https://www.fedex.com/trackingCal/track");
        assert_eq!(spec.url, "https://www.fedex.com/trackingCal/track");
        assert!(spec.method.is_none());
        assert!(spec.headers.is_empty());
        assert!(spec.cookies.is_empty());
        assert!(spec.body.is_none());
        assert!(spec.form.is_empty());
        assert!(!spec.follow_redirects);
        assert!(!spec.save_to_file);
    }

    #[test]
    fn test_builder_chain() {
        let spec = RequestSpec::new("https://example.com")
            .with_method(Method::Post)
            .with_header("Accept", "*/*")
            .with_form_field("action=trackpackages")
            .with_proxy(Some("http://127.0.0.1:8080".to_string()))
            .follow_redirects()
            .include_headers();

        assert_eq!(spec.method, Some(Method::Post));
        assert_eq!(spec.headers.get("Accept"), Some("*/*"));
        assert_eq!(spec.form, vec!["action=trackpackages".to_string()]);
        assert_eq!(spec.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert!(spec.follow_redirects && spec.include_headers);
    }

    #[test]
    fn test_format_proxy() {
        assert_eq!(
            format_proxy(Some("38.109.22.251:21270")),
            Some("http://38.109.22.251:21270".to_string())
        );
        assert_eq!(format_proxy(Some("  ")), None);
        assert_eq!(format_proxy(None), None);
    }
}
