pub mod envelope;

pub use envelope::ListResponse;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth::session::Session;
use crate::config;
use crate::error::ClientError;

/// Header carrying the active tenant (school) id
pub const SCHOOL_ID_HEADER: &str = "school-id";

/// Query string parameters; absent values are skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub fn set_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// REST client for the admin backend. Every request carries the stored
/// bearer token and active tenant; a 401 clears the stored token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            tracing::warn!("server URL '{}' is not absolute http(s)", base_url);
        }
        Url::parse(&base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config::config().api.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        Ok(Self { http, base_url, session })
    }

    pub fn from_config(session: Session) -> Result<Self, ClientError> {
        Self::new(&config::config().api.server_url, session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn url(&self, path: &str, params: Option<&QueryParams>) -> Result<Url, ClientError> {
        let path = if path.starts_with('/') { path.to_string() } else { format!("/{}", path) };
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        if let Some(params) = params.filter(|p| !p.is_empty()) {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params.iter() {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: Option<&QueryParams>) -> Result<T, ClientError> {
        let url = self.url(path, params)?;
        let response = self.send(self.http.request(Method::GET, url)).await?;
        Self::decode(response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.with_body(Method::POST, path, body).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.with_body(Method::PUT, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = self.url(path, None)?;
        self.send(self.http.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn with_body<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.url(path, None)?;
        let response = self.send(self.http.request(method, url).json(body)).await?;
        Self::decode(response).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let mut request = request;
        if let Some(token) = self.session.token()? {
            request = request.bearer_auth(token);
        }
        if let Some(school_id) = self.session.school_id()? {
            request = request.header(SCHOOL_ID_HEADER, school_id);
        }

        let request = request.build()?;
        if config::config().api.enable_request_logging {
            tracing::debug!(method = %request.method(), url = %request.url(), "api request");
        }

        let response = self.http.execute(request).await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("backend answered 401, clearing stored session token");
            if let Err(e) = self.session.set_token(None) {
                tracing::error!("failed to clear session token after 401: {}", e);
            }
            return Err(ClientError::unauthorized(&config::config().session.sign_in_route));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = Self::error_message(status, &body);
            tracing::error!(status = status.as_u16(), "api request failed: {}", message);
            return Err(ClientError::http(status.as_u16(), message));
        }

        Ok(response)
    }

    /// Empty bodies decode as JSON `null`, so `()` and `Option<T>` work for
    /// endpoints that return nothing
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let text = response.text().await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(text)?)
    }

    fn error_message(status: StatusCode, body: &str) -> String {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            for key in ["message", "error"] {
                if let Some(msg) = value.get(key).and_then(Value::as_str) {
                    return msg.to_string();
                }
            }
        }
        let trimmed = body.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    }
}
