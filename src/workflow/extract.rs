use crate::cookie::CookieJar;
use crate::http::types::HeaderList;
use crate::http::{CommandBuilder, RequestSpec, Transport};
use regex::Regex;
use tracing::{error, info};

/// Generic desktop-browser headers for requests without a site template.
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("authority", "www.google.com"),
    (
        "sec-ch-ua",
        r#""Google Chrome";v="87", " Not;A Brand";v="99", "Chromium";v="87""#,
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("upgrade-insecure-requests", "1"),
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.88 Safari/537.36",
    ),
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9",
    ),
    ("sec-fetch-site", "none"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-dest", "document"),
    ("accept-language", "en-US,en;q=0.9"),
];

pub fn browser_headers() -> HeaderList {
    BROWSER_HEADERS.iter().copied().collect()
}

/// Value of a hidden `<input name="..." value="...">` field.
///
/// A missing field is logged and comes back as an empty string.
pub fn extract_form_field(text: &str, name: &str) -> String {
    let pattern = format!(r#"name="{}"\s+value="(.+?)""#, regex::escape(name));
    let value = Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(text).map(|caps| caps[1].to_string()));

    match value {
        Some(value) => {
            info!("{} value found: {}", name, value);
            value
        }
        None => {
            error!("Could not get {} value", name);
            String::new()
        }
    }
}

/// First capture group of `re` in `text`, or an empty string.
pub fn extract_first(re: &Regex, text: &str, label: &str) -> String {
    match re.captures(text).and_then(|caps| caps.get(1)) {
        Some(found) => {
            info!("{} found: {}", label, found.as_str());
            found.as_str().to_string()
        }
        None => {
            error!("Could not get {}", label);
            String::new()
        }
    }
}

/// Fetch `url` with redirects and response headers and collect its cookies.
pub async fn bootstrap_cookies<T: Transport>(
    transport: &T,
    url: &str,
    proxy: Option<&str>,
) -> CookieJar {
    let spec = RequestSpec::new(url)
        .with_headers(browser_headers())
        .with_proxy(proxy.map(str::to_string))
        .follow_redirects()
        .include_headers();
    let command = CommandBuilder::default().build(&spec);

    let response = transport.execute(&command).await;
    match response.text() {
        Some(text) => CookieJar::from_set_cookie_headers(&text),
        None => {
            error!("Cookie bootstrap from {} returned no data", url);
            CookieJar::new()
        }
    }
}
