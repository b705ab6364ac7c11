use std::fmt;
use std::str::FromStr;

use crate::error::CurlwrapError;
use crate::http::RequestSpec;
use crate::variable::{VariableContext, VariableResolver};

/// How the tracking number reaches the carrier.
#[derive(Debug, Clone, Copy)]
pub enum PayloadTemplate {
    /// Only the URL carries it.
    None,
    /// Raw JSON body.
    Body(&'static str),
    /// Form fields, one `-d` each.
    Form(&'static [&'static str]),
}

/// Everything that differs between carriers.
///
/// Templates may reference `{{tracking_number}}` and `{{xsrf_token}}`.
#[derive(Debug)]
pub struct CarrierProfile {
    pub name: &'static str,
    /// Cookie cache key.
    pub cache_key: &'static str,
    /// Page whose `Set-Cookie` headers seed the session.
    pub bootstrap_url: &'static str,
    pub tracking_url: &'static str,
    pub headers: &'static [(&'static str, &'static str)],
    pub payload: PayloadTemplate,
    /// Cookie holding the value of the `X-XSRF-TOKEN` header.
    pub xsrf_cookie: Option<&'static str>,
}

impl CarrierProfile {
    pub fn context(&self, tracking_number: &str, xsrf_token: Option<&str>) -> VariableContext {
        VariableContext::new()
            .with("tracking_number", tracking_number)
            .with("xsrf_token", xsrf_token.unwrap_or_default())
    }

    /// Tracking request without cookies or proxy.
    pub fn request(&self, tracking_number: &str, xsrf_token: Option<&str>) -> RequestSpec {
        let ctx = self.context(tracking_number, xsrf_token);
        let spec = RequestSpec::new(VariableResolver::substitute(self.tracking_url, &ctx))
            .with_headers(VariableResolver::substitute_headers(self.headers, &ctx));

        match self.payload {
            PayloadTemplate::None => spec,
            PayloadTemplate::Body(body) => {
                spec.with_body(&VariableResolver::substitute(body, &ctx))
            }
            PayloadTemplate::Form(fields) => spec.with_form(
                fields
                    .iter()
                    .map(|field| VariableResolver::substitute(field, &ctx))
                    .collect(),
            ),
        }
    }
}

const CHROME_87_UA: &str = r#""Google Chrome";v="87", " Not;A Brand";v="99", "Chromium";v="87""#;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.88 Safari/537.36";

pub static FEDEX: CarrierProfile = CarrierProfile {
    name: "FedEx",
    cache_key: "fedex_curl",
    bootstrap_url: "https://www.fedex.com/fedextrack/?tracknumbers=950548487353",
    tracking_url: "https://www.fedex.com/trackingCal/track",
    headers: &[
        ("Connection", "keep-alive"),
        ("sec-ch-ua", CHROME_87_UA),
        ("Accept", "*/*"),
        ("X-Requested-With", "XMLHttpRequest"),
        ("sec-ch-ua-mobile", "?0"),
        ("User-Agent", USER_AGENT),
        (
            "Content-Type",
            "application/x-www-form-urlencoded; charset=UTF-8",
        ),
        ("Origin", "https://www.fedex.com"),
        ("Sec-Fetch-Site", "same-origin"),
        ("Sec-Fetch-Mode", "cors"),
        ("Sec-Fetch-Dest", "empty"),
        ("Accept-Language", "en-US,en;q=0.9"),
        (
            "Referer",
            "//www.fedex.com/apps/fedextrack/?tracknumbers={{tracking_number}}",
        ),
    ],
    payload: PayloadTemplate::Form(&[
        r#"data={"TrackPackagesRequest":{"appType":"WTRK","appDeviceType":"DESKTOP","supportHTML":true,"supportCurrentLocation":true,"uniqueKey":"","processingParameters":{},"trackingInfoList":[{"trackNumberInfo":{"trackingNumber":"{{tracking_number}}","trackingQualifier":"","trackingCarrier":""}}]}}"#,
        "action=trackpackages",
        "locale=en_US",
        "version=1",
        "format=json",
    ]),
    xsrf_cookie: None,
};

pub static UPS: CarrierProfile = CarrierProfile {
    name: "UPS",
    cache_key: "ups_curl",
    bootstrap_url: "https://www.ups.com/track?loc=null&tracknum=1Z97015F0341620620&requester=WT/trackdetails",
    tracking_url: "https://www.ups.com/track/api/Track/GetStatus?loc=en_US",
    headers: &[
        ("Connection", "keep-alive"),
        ("sec-ch-ua", CHROME_87_UA),
        ("Accept", "application/json, text/plain, */*"),
        ("sec-ch-ua-mobile", "?0"),
        ("User-Agent", USER_AGENT),
        ("Content-Type", "application/json"),
        ("Origin", "https://www.ups.com"),
        ("Sec-Fetch-Site", "same-origin"),
        ("Sec-Fetch-Mode", "cors"),
        ("Sec-Fetch-Dest", "empty"),
        ("Accept-Language", "en-US,en;q=0.9"),
        (
            "Referer",
            "https://www.ups.com/track?loc=null&tracknum={{tracking_number}}&requester=WT/trackdetails",
        ),
        ("X-XSRF-TOKEN", "{{xsrf_token}}"),
    ],
    payload: PayloadTemplate::Body(
        r#"{"Locale":"en_US","TrackingNumber":["{{tracking_number}}"],"Requester":"wt","consumerHub":""}"#,
    ),
    xsrf_cookie: Some("X-XSRF-TOKEN-ST"),
};

pub static USPS: CarrierProfile = CarrierProfile {
    name: "USPS",
    cache_key: "usps_curl",
    bootstrap_url: "https://tools.usps.com/go/TrackConfirmAction?qtc_tLabels1=92001901795912912884327069",
    tracking_url: "https://tools.usps.com/go/TrackConfirmAction?qtc_tLabels1={{tracking_number}}",
    headers: &[
        ("authority", "tools.usps.com"),
        ("cache-control", "max-age=0"),
        ("sec-ch-ua", CHROME_87_UA),
        ("sec-ch-ua-mobile", "?0"),
        ("upgrade-insecure-requests", "1"),
        ("user-agent", USER_AGENT),
        (
            "accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9",
        ),
        ("sec-fetch-site", "cross-site"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-user", "?1"),
        ("sec-fetch-dest", "document"),
        ("accept-language", "en-US,en;q=0.9"),
    ],
    payload: PayloadTemplate::None,
    xsrf_cookie: None,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    Fedex,
    Ups,
    Usps,
}

impl Carrier {
    pub const ALL: [Carrier; 3] = [Carrier::Fedex, Carrier::Ups, Carrier::Usps];

    pub fn profile(&self) -> &'static CarrierProfile {
        match self {
            Carrier::Fedex => &FEDEX,
            Carrier::Ups => &UPS,
            Carrier::Usps => &USPS,
        }
    }
}

impl FromStr for Carrier {
    type Err = CurlwrapError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fedex" => Ok(Carrier::Fedex),
            "ups" => Ok(Carrier::Ups),
            "usps" => Ok(Carrier::Usps),
            _ => Err(CurlwrapError::UnknownCarrier(s.to_string())),
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name)
    }
}
