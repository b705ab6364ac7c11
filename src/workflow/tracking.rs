use crate::cookie::{CookieJar, CookieStore};
use crate::http::request::format_proxy;
use crate::http::{CommandBuilder, NormalizedResponse, RequestSpec, Transport};
use crate::workflow::carrier::{Carrier, CarrierProfile};
use crate::workflow::extract::bootstrap_cookies;
use tracing::{error, info, warn};

/// One carrier session: cookies ready, any number of tracking queries.
///
/// Each query is a single attempt; failures come back as data.
pub struct TrackingClient<T, S> {
    profile: &'static CarrierProfile,
    transport: T,
    store: S,
    proxy: Option<String>,
    cookies: CookieJar,
    xsrf_token: Option<String>,
}

impl<T: Transport, S: CookieStore> TrackingClient<T, S> {
    /// Load cached cookies for the carrier or bootstrap a fresh session.
    ///
    /// `proxy` is a bare `host:port`.
    pub async fn connect(carrier: Carrier, transport: T, store: S, proxy: Option<&str>) -> Self {
        let mut client = Self {
            profile: carrier.profile(),
            transport,
            store,
            proxy: format_proxy(proxy),
            cookies: CookieJar::new(),
            xsrf_token: None,
        };
        client.cookies = client.ready_cookies().await;
        client.xsrf_token = client.find_xsrf_token();
        client
    }

    async fn ready_cookies(&self) -> CookieJar {
        let key = self.profile.cache_key;
        match self.store.load(key) {
            Ok(Some(jar)) => return jar,
            Ok(None) => {}
            Err(e) => warn!("Could not read cached cookies for {}: {}", key, e),
        }

        info!(
            "{} cookie not loaded from disk. Will obtain new one from {}",
            self.profile.name, self.profile.bootstrap_url
        );
        let jar = bootstrap_cookies(
            &self.transport,
            self.profile.bootstrap_url,
            self.proxy.as_deref(),
        )
        .await;

        if let Err(e) = self.store.save(key, &jar) {
            warn!("Failed to save cookies for {}: {}", key, e);
        }
        jar
    }

    fn find_xsrf_token(&self) -> Option<String> {
        let cookie_name = self.profile.xsrf_cookie?;
        if self.cookies.is_empty() {
            error!("No cookies to get {} from", cookie_name);
            return None;
        }
        match self.cookies.get(cookie_name) {
            Some(token) => {
                info!("Found X-XSRF-TOKEN: {}", token);
                Some(token.trim().to_string())
            }
            None => {
                error!("Error extracting X-XSRF-TOKEN: no {} cookie", cookie_name);
                None
            }
        }
    }

    pub fn profile(&self) -> &'static CarrierProfile {
        self.profile
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn xsrf_token(&self) -> Option<&str> {
        self.xsrf_token.as_deref()
    }

    /// The tracking request as it will be sent.
    pub fn tracking_request(&self, tracking_number: &str) -> RequestSpec {
        self.profile
            .request(tracking_number, self.xsrf_token())
            .with_cookies(self.cookies.clone())
            .with_proxy(self.proxy.clone())
    }

    /// Send one tracking query. JSON carriers answer with `Json`, USPS with
    /// the HTML page as `Text`.
    pub async fn track(&self, tracking_number: &str) -> NormalizedResponse {
        info!("Tracking {} with {}", tracking_number, self.profile.name);
        let command = CommandBuilder::default().build(&self.tracking_request(tracking_number));
        self.transport.execute(&command).await
    }
}
