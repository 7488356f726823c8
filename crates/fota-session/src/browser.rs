//! Browser-driven login that captures the bearer token from the network
//!
//! The FOTA web console issues its token from an XHR made by the login form,
//! so the token is read off the response to that request rather than from
//! the page.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFinished, EventResponseReceived, GetResponseBodyParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tracing::{debug, info, instrument, warn};

use crate::config::LoginConfig;
use crate::error::BootstrapError;
use crate::source::TokenSource;

/// How often to look for the login form while the console boots
const FORM_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Values typed into the login form
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub company_code: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        company_code: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            company_code: company_code.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("company_code", &self.company_code)
            .finish()
    }
}

/// Logs into the web console in a headless Chromium and returns the
/// `access_token` of the token response
#[derive(Debug, Clone)]
pub struct BrowserLogin {
    base_url: String,
    credentials: Credentials,
    config: LoginConfig,
}

impl BrowserLogin {
    pub fn new(base_url: impl Into<String>, credentials: Credentials, config: LoginConfig) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            config,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, BootstrapError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .request_timeout(self.config.page_timeout());
        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(BootstrapError::Browser)
    }

    async fn login(&self, browser: &Browser) -> Result<String, BootstrapError> {
        let page = browser.new_page("about:blank").await?;

        // Subscribe before anything is submitted so the token exchange
        // cannot slip past.
        let mut responses = page.event_listener::<EventResponseReceived>().await?;
        let mut finished = page.event_listener::<EventLoadingFinished>().await?;

        let page_timeout = self.config.page_timeout();
        timed("login page", page_timeout, page.goto(self.base_url.as_str())).await??;
        debug!(url = %self.base_url, "Login page loaded");

        let selectors = &self.config.selectors;
        self.fill(&page, &selectors.username, &self.credentials.username)
            .await?;
        self.fill(&page, &selectors.password, &self.credentials.password)
            .await?;
        self.fill(&page, &selectors.company_code, &self.credentials.company_code)
            .await?;
        page.find_element(selectors.consent.as_str())
            .await?
            .click()
            .await?;
        click_button(&page, &selectors.submit_label).await?;
        debug!("Login form submitted");

        let token_path = self.config.token_path.as_str();
        let token_timeout = self.config.token_timeout();
        let request_id = timed("token response", token_timeout, async {
            while let Some(event) = responses.next().await {
                if event.response.url.contains(token_path) {
                    return Some(event.request_id.clone());
                }
            }
            None
        })
        .await?
        .ok_or_else(|| BootstrapError::NoTokenResponse(token_path.to_string()))?;

        timed("token response body", token_timeout, async {
            while let Some(event) = finished.next().await {
                if event.request_id == request_id {
                    break;
                }
            }
        })
        .await?;

        let body = page.execute(GetResponseBodyParams::new(request_id)).await?;
        let text = if body.result.base64_encoded {
            let raw = base64::engine::general_purpose::STANDARD
                .decode(&body.result.body)
                .map_err(|e| BootstrapError::InvalidJson(e.to_string()))?;
            String::from_utf8(raw).map_err(|e| BootstrapError::InvalidJson(e.to_string()))?
        } else {
            body.result.body.clone()
        };

        extract_access_token(&text)
    }

    async fn fill(&self, page: &Page, selector: &str, value: &str) -> Result<(), BootstrapError> {
        let element = timed("login form", self.config.page_timeout(), async {
            loop {
                match page.find_element(selector).await {
                    Ok(element) => return element,
                    Err(_) => tokio::time::sleep(FORM_POLL_INTERVAL).await,
                }
            }
        })
        .await?;
        element.click().await?.type_str(value).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenSource for BrowserLogin {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn obtain(&self) -> Result<String, BootstrapError> {
        info!("Starting browser login");
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?).await?;
        let events = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let outcome = self.login(&browser).await;

        if let Err(e) = browser.close().await {
            warn!(error = %e, "Failed to close browser");
        }
        events.abort();

        if let Ok(token) = &outcome {
            info!(token = %fota_core::token::redact(token), "Browser login succeeded");
        }
        outcome
    }

    fn describe(&self) -> &'static str {
        "browser login"
    }
}

async fn click_button(page: &Page, label: &str) -> Result<(), BootstrapError> {
    let script = format!(
        "(() => {{ const label = {}; \
         const button = Array.from(document.querySelectorAll('button')) \
           .find(b => b.textContent.trim() === label); \
         if (!button) return false; button.click(); return true; }})()",
        serde_json::Value::String(label.to_string())
    );
    let clicked: bool = page
        .evaluate(script)
        .await?
        .into_value()
        .map_err(|e| BootstrapError::Browser(e.to_string()))?;
    if !clicked {
        return Err(BootstrapError::Browser(format!(
            "no button labelled '{}'",
            label
        )));
    }
    Ok(())
}

async fn timed<F, T>(what: &'static str, limit: Duration, fut: F) -> Result<T, BootstrapError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| BootstrapError::Timeout {
            what,
            waited: limit,
        })
}

/// Pull `access_token` out of a token endpoint response body
pub fn extract_access_token(body: &str) -> Result<String, BootstrapError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| BootstrapError::InvalidJson(e.to_string()))?;
    match json.get("access_token").and_then(|v| v.as_str()) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(BootstrapError::MissingAccessToken),
    }
}
