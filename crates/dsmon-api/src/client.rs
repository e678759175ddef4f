// Monitoring API HTTP client
//
// Wraps `reqwest::Client` with URL resolution against the data base path,
// bearer credential injection, and JSON decoding. Endpoint helpers
// (metrics, data, system) are inherent methods in `endpoints/`.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::auth::{Credential, CredentialScope};
use crate::error::{Error, preview};
use crate::token::TokenStore;
use crate::transport::TransportConfig;

/// Default root for data resources.
pub const DATA_BASE_PATH: &str = "/api/v1/data/";

/// Where the metrics sequence lives.
pub const METRICS_PATH: &str = "/api/v1/metrics";

/// Everything needed to construct an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, optionally with a path prefix
    /// (e.g. `http://localhost:8080` or `https://host/monitor/`).
    pub server: Url,
    /// Root for relative request paths. Defaults to [`DATA_BASE_PATH`].
    pub data_path: String,
    pub credential_scope: CredentialScope,
    pub transport: TransportConfig,
}

impl ClientConfig {
    pub fn new(server: Url) -> Self {
        Self {
            server,
            data_path: DATA_BASE_PATH.to_owned(),
            credential_scope: CredentialScope::default(),
            transport: TransportConfig::default(),
        }
    }
}

/// Per-call overrides merged over the instance defaults.
///
/// Headers set here win over the defaults, including `Authorization`.
#[derive(Debug, Default, Clone)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    /// HTTP Basic credentials. Replaces the bearer header for this call.
    pub basic_auth: Option<(String, SecretString)>,
}

impl RequestOptions {
    pub fn header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.basic_auth = Some((username.into(), password));
        self
    }
}

/// A decoded response.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn into_data(self) -> T {
        self.data
    }
}

/// Shared HTTP client for the monitoring backend.
///
/// Holds the default headers, the data base URL and the current bearer
/// credential. The credential is shared state: [`set_token`](Self::set_token)
/// affects every later request made through this instance, from any caller.
/// Requests already in flight keep the header they were built with.
pub struct ApiClient {
    http: reqwest::Client,
    server: Url,
    base_url: Url,
    scope: CredentialScope,
    credential: Credential,
}

impl ApiClient {
    /// Build the client and apply the persisted credential, if one exists.
    ///
    /// A failing token backend is logged and treated as "no credential":
    /// the client still comes up, unauthenticated.
    pub fn new(config: &ClientConfig, token_store: &dyn TokenStore) -> Result<Self, Error> {
        let initial = match token_store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "could not read persisted credential");
                None
            }
        };
        Self::with_credential(config, initial)
    }

    /// Build the client with an explicit starting credential.
    pub fn with_credential(
        config: &ClientConfig,
        credential: Option<SecretString>,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = config.transport.build_client(headers)?;

        let server = normalize_dir(config.server.clone());
        let base_url = normalize_dir(server.join(config.data_path.trim_start_matches('/'))?);

        let credential = Credential::new(credential.filter(|t| !t.expose_secret().is_empty()));
        debug!(
            server = %server,
            base = %base_url,
            authenticated = credential.is_set(),
            "api client initialized"
        );

        Ok(Self {
            http,
            server,
            base_url,
            scope: config.credential_scope,
            credential,
        })
    }

    // ── Credential ───────────────────────────────────────────────────

    /// Replace the bearer credential for all subsequent requests.
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), Error> {
        self.credential.set(SecretString::from(token.into()))?;
        info!("bearer credential updated");
        Ok(())
    }

    /// Remove the bearer credential; later requests are unauthenticated.
    pub fn clear_token(&self) {
        self.credential.unset();
        info!("bearer credential cleared");
    }

    pub fn has_token(&self) -> bool {
        self.credential.is_set()
    }

    pub fn credential_scope(&self) -> CredentialScope {
        self.scope
    }

    // ── URLs ─────────────────────────────────────────────────────────

    /// The server root (always ends with `/`).
    pub fn server(&self) -> &Url {
        &self.server
    }

    /// The data base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a request target.
    ///
    /// - absolute URLs are used as-is
    /// - `/path` is relative to the server root (keeps any prefix)
    /// - anything else is relative to the data base path
    ///
    /// Only `scheme://...` counts as absolute, so keys such as `item:1`
    /// stay under the data base path.
    pub fn resolve(&self, target: &str) -> Result<Url, Error> {
        if has_scheme(target) {
            return Ok(Url::parse(target)?);
        }
        match target.strip_prefix('/') {
            Some(rest) => Ok(self.server.join(&format!("./{rest}"))?),
            None => Ok(self.base_url.join(&format!("./{target}"))?),
        }
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse<T>, Error> {
        self.send(Method::GET, url, None::<&()>, options).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        url: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<ApiResponse<T>, Error> {
        self.send(Method::POST, url, body, options).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        url: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<ApiResponse<T>, Error> {
        self.send(Method::PUT, url, body, options).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        url: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<ApiResponse<T>, Error> {
        self.send(Method::PATCH, url, body, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse<T>, Error> {
        self.send(Method::DELETE, url, None::<&()>, options).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        target: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<ApiResponse<T>, Error> {
        let url = self.resolve(target)?;
        debug!("{method} {url}");

        let mut builder = self.http.request(method.clone(), url);

        let explicit_auth =
            options.basic_auth.is_some() || options.headers.contains_key(AUTHORIZATION);
        if !explicit_auth && self.scope.applies_to(&method) {
            if let Some(bearer) = self.credential.bearer_header()? {
                builder = builder.header(AUTHORIZATION, bearer);
            }
        }
        if let Some((username, password)) = &options.basic_auth {
            builder = builder.basic_auth(username, Some(password.expose_secret()));
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if !options.headers.is_empty() {
            builder = builder.headers(options.headers.clone());
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().await?;
        Self::handle_response(resp).await
    }

    /// Reject non-2xx statuses, then decode the JSON body.
    ///
    /// An empty body decodes as JSON `null`, so `()` and `Option<_>`
    /// targets work for endpoints that return nothing.
    async fn handle_response<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<ApiResponse<T>, Error> {
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await?;

        if !status.is_success() {
            trace!(%status, "request failed");
            return Err(Error::Status {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let raw = if body.trim().is_empty() { "null" } else { body.as_str() };
        let data = serde_json::from_str(raw).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;

        Ok(ApiResponse {
            status,
            headers,
            data,
        })
    }
}

/// Make sure a URL path ends with `/` so `join` appends instead of replacing.
fn normalize_dir(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn has_scheme(target: &str) -> bool {
    target.split_once("://").is_some_and(|(scheme, _)| {
        scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}
