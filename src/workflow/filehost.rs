use crate::Result;
use crate::cookie::CookieJar;
use crate::error::CurlwrapError;
use crate::http::request::format_proxy;
use crate::http::types::HeaderList;
use crate::http::{CommandBuilder, NormalizedResponse, RequestSpec, Transport};
use crate::variable::{VariableContext, VariableResolver};
use crate::workflow::captcha::CaptchaSolver;
use crate::workflow::extract::{bootstrap_cookies, browser_headers, extract_first, extract_form_field};
use regex::Regex;
use tracing::{error, info};
use url::Url;

/// Site-specific bits of a file host.
#[derive(Debug, Clone)]
pub struct FileHostProfile {
    /// Bare host name, e.g. `dropapk.to`.
    pub host: String,
    /// Captures the captcha image URL in the stage-two page.
    pub captcha_pattern: String,
    /// Captures the final download link in the stage-three page.
    pub link_pattern: String,
}

impl FileHostProfile {
    pub fn dropapk() -> Self {
        Self {
            host: "dropapk.to".to_string(),
            captcha_pattern: r"(https://dropapk\.to/captchas/.+?jpg)".to_string(),
            link_pattern: r#"(https://s\d+.dropapk.+?)""#.to_string(),
        }
    }
}

/// Hidden fields of the item page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOneFields {
    pub fname: String,
    pub id: String,
    pub op: String,
}

/// Hidden fields and captcha of the free-download page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageTwoFields {
    pub rand: String,
    pub id: String,
    pub op: String,
    pub captcha_link: String,
}

const STAGE_ONE_HEADERS: &[(&str, &str)] = &[
    ("authority", "{{host}}"),
    (
        "sec-ch-ua",
        r#""Google Chrome";v="88", " Not;A Brand";v="99", "Chromium";v="88""#,
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
    ("content-type", "application/json; charset=UTF-8"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-user", "?1"),
    ("sec-fetch-dest", "document"),
    ("accept-language", "en-US,en;q=0.9"),
];

/// Stage-one headers with these applied on top, in place.
const FORM_POST_HEADERS: &[(&str, &str)] = &[
    ("cache-control", "max-age=0"),
    ("origin", "https://{{host}}"),
    ("content-type", "application/x-www-form-urlencoded"),
    ("sec-fetch-site", "same-origin"),
    ("referer", "https://{{host}}/{{file_id}}"),
];

const METHOD_FREE: &str = "Free+Download+%3E%3E";

/// Three-stage free download: item page, captcha page, link page.
pub struct FileHostClient<T, C> {
    profile: FileHostProfile,
    captcha_regex: Regex,
    link_regex: Regex,
    transport: T,
    solver: C,
    proxy: Option<String>,
}

impl<T: Transport, C: CaptchaSolver> FileHostClient<T, C> {
    pub fn new(transport: T, solver: C, proxy: Option<&str>) -> Result<Self> {
        Self::with_profile(FileHostProfile::dropapk(), transport, solver, proxy)
    }

    pub fn with_profile(
        profile: FileHostProfile,
        transport: T,
        solver: C,
        proxy: Option<&str>,
    ) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                CurlwrapError::ConfigError(format!("Invalid pattern {:?}: {}", pattern, e))
            })
        };
        Ok(Self {
            captcha_regex: compile(&profile.captcha_pattern)?,
            link_regex: compile(&profile.link_pattern)?,
            profile,
            transport,
            solver,
            proxy: format_proxy(proxy),
        })
    }

    fn context(&self, file_id: &str) -> VariableContext {
        VariableContext::new()
            .with("host", self.profile.host.as_str())
            .with("file_id", file_id)
    }

    pub fn stage_one_headers(&self) -> HeaderList {
        VariableResolver::substitute_headers(STAGE_ONE_HEADERS, &self.context(""))
    }

    pub fn form_post_headers(&self, file_id: &str) -> HeaderList {
        let ctx = self.context(file_id);
        let mut headers = self.stage_one_headers();
        for (name, value) in FORM_POST_HEADERS {
            headers.insert(*name, VariableResolver::substitute(value, &ctx));
        }
        headers
    }

    async fn send(&self, spec: RequestSpec) -> NormalizedResponse {
        let command = CommandBuilder::default().build(&spec.with_proxy(self.proxy.clone()));
        self.transport.execute(&command).await
    }

    /// Session cookies for one item. Not cached: the session belongs to the item.
    pub async fn session(&self, item_url: &str) -> CookieJar {
        info!("Obtaining session cookies from {}", item_url);
        bootstrap_cookies(&self.transport, item_url, self.proxy.as_deref()).await
    }

    /// Fetch the item page and pull `fname`, `id` and `op`.
    pub async fn stage_one(&self, item_url: &str, cookies: &CookieJar) -> StageOneFields {
        let spec = RequestSpec::new(item_url)
            .with_headers(self.stage_one_headers())
            .with_cookies(cookies.clone());
        let response = self.send(spec).await;
        let page = response.text().unwrap_or_default();

        let fields = StageOneFields {
            fname: extract_form_field(&page, "fname"),
            id: extract_form_field(&page, "id"),
            op: extract_form_field(&page, "op"),
        };
        info!("Stage one fields: {:?}", fields);
        fields
    }

    pub fn stage_two_form(fields: &StageOneFields) -> String {
        format!(
            "op={}&usr_login=&id={}&fname={}&referer=&method_free={}",
            fields.op, fields.id, fields.fname, METHOD_FREE
        )
    }

    /// Post the stage-one fields and pull the captcha link plus `rand`, `id`, `op`.
    pub async fn stage_two(
        &self,
        item_url: &str,
        cookies: &CookieJar,
        fields: &StageOneFields,
    ) -> StageTwoFields {
        let spec = RequestSpec::new(item_url)
            .with_headers(self.form_post_headers(&fields.id))
            .with_cookies(cookies.clone())
            .with_form_field(&Self::stage_two_form(fields));
        let response = self.send(spec).await;
        let page = response.text().unwrap_or_default();

        let fields = StageTwoFields {
            captcha_link: extract_first(&self.captcha_regex, &page, "captcha link"),
            rand: extract_form_field(&page, "rand"),
            id: extract_form_field(&page, "id"),
            op: extract_form_field(&page, "op"),
        };
        info!("Stage two fields: {:?}", fields);
        fields
    }

    pub fn stage_three_form(&self, fields: &StageTwoFields, code: &str) -> String {
        format!(
            "op={}&id={}&rand={}&referer=https%3A%2F%2F{}%2F{}&method_free={}&method_premium=&adblock_detected=0&code={}",
            fields.op, fields.id, fields.rand, self.profile.host, fields.id, METHOD_FREE, code
        )
    }

    /// Have the captcha solved and post it. Without a captcha link the item
    /// has expired and nothing else can be done.
    pub async fn stage_three(
        &self,
        item_url: &str,
        cookies: &CookieJar,
        fields: &StageTwoFields,
    ) -> Result<NormalizedResponse> {
        if fields.captcha_link.is_empty() {
            error!("Download link might have expired!");
            return Err(CurlwrapError::CaptchaExpired(item_url.to_string()));
        }

        let code = self.solver.solve(&fields.captcha_link).await?;
        let spec = RequestSpec::new(item_url)
            .with_headers(self.form_post_headers(&fields.id))
            .with_cookies(cookies.clone())
            .with_form_field(&self.stage_three_form(fields, &code));
        Ok(self.send(spec).await)
    }

    /// Item pages must be absolute http(s) URLs on the profile's host.
    pub fn check_item_url(&self, item_url: &str) -> Result<Url> {
        let url = Url::parse(item_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CurlwrapError::InvalidUrl(item_url.to_string()));
        }
        let subdomain = format!(".{}", self.profile.host);
        match url.host_str() {
            Some(host) if host == self.profile.host || host.ends_with(&subdomain) => Ok(url),
            _ => Err(CurlwrapError::InvalidUrl(item_url.to_string())),
        }
    }

    /// Run all three stages and keep the session they ran under.
    async fn resolve(&self, item_url: &str) -> Result<(Option<String>, CookieJar)> {
        self.check_item_url(item_url)?;
        let cookies = self.session(item_url).await;
        let stage_one = self.stage_one(item_url, &cookies).await;
        let stage_two = self.stage_two(item_url, &cookies, &stage_one).await;
        let response = self.stage_three(item_url, &cookies, &stage_two).await?;

        let page = response.text().unwrap_or_default();
        let link = extract_first(&self.link_regex, &page, "final link");
        if link.is_empty() {
            error!(":( Could not get final link");
            Ok((None, cookies))
        } else {
            info!("FINAL LINK: {}", link);
            Ok((Some(link), cookies))
        }
    }

    /// Run all three stages. `Ok(None)` when the last page holds no link.
    pub async fn final_download_link(&self, item_url: &str) -> Result<Option<String>> {
        let (link, _) = self.resolve(item_url).await?;
        Ok(link)
    }

    /// Resolve the link and let curl save the file under its remote name.
    /// The item's session cookies go along with the download.
    ///
    /// Runs without a timeout. `Ok(None)` when no link was found.
    pub async fn download_file(&self, item_url: &str) -> Result<Option<NormalizedResponse>> {
        let (Some(link), cookies) = self.resolve(item_url).await? else {
            return Ok(None);
        };

        info!("Downloading {}", link);
        let spec = RequestSpec::new(link.as_str())
            .with_headers(browser_headers())
            .with_cookies(cookies)
            .save_to_file();
        Ok(Some(self.send(spec).await))
    }
}
