use crate::config::ClientConfig;
use crate::error::{BraviaError, Result};
use crate::protocol::{self, service, Request, Response};
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use tokio::sync::RwLock;

const AUTH_COOKIE: &str = "auth";
const PSK_HEADER: &str = "X-Auth-PSK";
const SOAP_ACTION_HEADER: &str = "SOAPACTION";
const IRCC_PATH: &str = "sony/IRCC";

/// Session state shared by all requests
#[derive(Default)]
struct SessionState {
    /// Value of the `auth` cookie captured at registration
    auth_cookie: Option<String>,
}

/// Low-level HTTP transport to one TV
pub struct Connection {
    http: reqwest::Client,
    config: ClientConfig,
    session: RwLock<SessionState>,
}

impl Connection {
    /// Build the HTTP client for the given config
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            config,
            session: RwLock::new(SessionState::default()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url(), path.trim_start_matches('/'))
    }

    /// Current `auth` cookie, if registration succeeded
    pub async fn auth_cookie(&self) -> Option<String> {
        self.session.read().await.auth_cookie.clone()
    }

    /// Restore a previously captured `auth` cookie
    pub async fn set_auth_cookie(&self, cookie: Option<String>) {
        self.session.write().await.auth_cookie = cookie;
    }

    /// Attach the session cookie and PSK header.
    ///
    /// The TV scopes the cookie to `/sony`, so it is sent explicitly on every
    /// request rather than through a cookie jar. This also covers the DIAL paths.
    async fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder;
        if let Some(cookie) = self.session.read().await.auth_cookie.as_deref() {
            builder = builder.header(COOKIE, format!("{}={}", AUTH_COOKIE, cookie));
        }
        if let Some(psk) = self.config.psk() {
            builder = builder.header(PSK_HEADER, psk);
        }
        builder
    }

    fn log_failure(&self, what: &str, err: &BraviaError) {
        if self.config.log_errors {
            tracing::error!("{} failed: {}", what, err);
        } else {
            tracing::debug!("{} failed: {}", what, err);
        }
    }

    /// Register this client with the TV and capture the session cookie.
    ///
    /// `pin` is sent as the password of Basic credentials with an empty user.
    pub async fn register(&self, request: Request, pin: Option<&str>) -> Result<()> {
        let result = self.register_inner(request, pin).await;
        if let Err(e) = &result {
            self.log_failure("Registration", e);
        }
        result
    }

    async fn register_inner(&self, request: Request, pin: Option<&str>) -> Result<()> {
        let url = self.url(service::ACCESS_CONTROL);
        tracing::info!("Registering with {}", url);

        let mut builder = self.http.post(&url).json(&request);
        if let Some(pin) = pin.map(str::trim).filter(|p| !p.is_empty()) {
            builder = builder.basic_auth("", Some(pin));
        }
        if let Some(psk) = self.config.psk() {
            builder = builder.header(PSK_HEADER, psk);
        }

        let response = check_status(builder.send().await?).await?;

        let cookie = response
            .cookies()
            .find(|c| c.name() == AUTH_COOKIE)
            .map(|c| c.value().to_string());

        let text = response.text().await?;
        tracing::debug!("Registration response: {}", text);

        let body: Response = serde_json::from_str(&text)?;
        if let Some(err) = body.api_error() {
            return Err(err);
        }

        let cookie = cookie.ok_or_else(|| {
            BraviaError::InvalidResponse("No auth cookie in registration response".to_string())
        })?;

        self.session.write().await.auth_cookie = Some(cookie);
        tracing::info!("Registered with {}", self.config.host);
        Ok(())
    }

    /// Send a JSON-RPC request to `service` and return the `result` array
    pub async fn call(&self, service: &str, request: Request) -> Result<Vec<Value>> {
        let method = request.method.clone();
        let result = self.call_inner(service, request).await;
        if let Err(e) = &result {
            self.log_failure(&format!("{} {}", service, method), e);
        }
        result
    }

    async fn call_inner(&self, service: &str, request: Request) -> Result<Vec<Value>> {
        let json = serde_json::to_string(&request)?;
        tracing::debug!("Sending to {}: {}", service, json);

        let builder = self
            .http
            .post(self.url(service))
            .header(CONTENT_TYPE, "application/json")
            .body(json);

        let response = check_status(self.authorize(builder).await.send().await?).await?;
        let text = response.text().await?;
        tracing::debug!("Received: {}", text);

        let response: Response = serde_json::from_str(&text)?;
        response.into_result()
    }

    /// Send an IRCC code through the SOAP endpoint, returning the raw body
    pub async fn send_ircc(&self, code: &str) -> Result<String> {
        let result = self.send_ircc_inner(code).await;
        if let Err(e) = &result {
            self.log_failure("IRCC", e);
        }
        result
    }

    async fn send_ircc_inner(&self, code: &str) -> Result<String> {
        let body = protocol::ircc_envelope(code)?;
        tracing::debug!("Sending IRCC code {}", code);

        let builder = self
            .http
            .post(self.url(IRCC_PATH))
            .header(CONTENT_TYPE, "text/xml; charset=UTF-8")
            .header(SOAP_ACTION_HEADER, protocol::IRCC_SOAP_ACTION)
            .body(body);

        let response = check_status(self.authorize(builder).await.send().await?).await?;
        Ok(response.text().await?)
    }

    /// GET a DIAL document
    pub async fn dial_get(&self, path: &str) -> Result<String> {
        let builder = self.http.get(self.url(path));
        let result = self.send_plain(builder).await;
        if let Err(e) = &result {
            self.log_failure(&format!("DIAL GET {}", path), e);
        }
        result
    }

    /// POST to a DIAL endpoint (app launch)
    pub async fn dial_post(&self, path: &str) -> Result<String> {
        let builder = self.http.post(self.url(path));
        let result = self.send_plain(builder).await;
        if let Err(e) = &result {
            self.log_failure(&format!("DIAL POST {}", path), e);
        }
        result
    }

    async fn send_plain(&self, builder: RequestBuilder) -> Result<String> {
        let response = check_status(self.authorize(builder).await.send().await?).await?;
        let text = response.text().await?;
        tracing::debug!("Received: {}", text);
        Ok(text)
    }
}

/// Map non-success statuses to errors
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BraviaError::Authentication {
            status: status.as_u16(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(BraviaError::HttpStatus {
        status: status.as_u16(),
        body,
    })
}
