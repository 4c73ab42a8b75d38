pub mod session;
pub mod token;

use serde::Serialize;
use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::config;
use crate::error::ClientError;

#[derive(Debug, Clone, Serialize)]
pub struct SignInParams {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpParams {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Token from a sign-in/sign-up response, wherever the backend put it
pub fn extract_token(body: &Value) -> Option<String> {
    const KEYS: [&str; 3] = ["token", "access_token", "accessToken"];
    let find = |v: &Value| {
        KEYS.iter()
            .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
    };
    find(body).or_else(|| body.get("data").and_then(find))
}

pub struct AuthService<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `POST /sign-in`; the returned token is stored in the session
    pub async fn sign_in(&self, params: &SignInParams) -> Result<String, ClientError> {
        let body: Value = self
            .client
            .post("/sign-in", params)
            .await
            .map_err(Self::friendly_sign_in_error)?;
        let min_len = config::config().session.min_sign_in_token_len;
        let token = extract_token(&body)
            .filter(|t| t.len() >= min_len)
            .ok_or_else(|| ClientError::decode("Invalid access token!"))?;
        self.set_session(Some(&token))?;
        tracing::info!("signed in as {}", params.email);
        Ok(token)
    }

    /// `POST /sign-up`; same token handling as sign-in
    pub async fn sign_up(&self, params: &SignUpParams) -> Result<String, ClientError> {
        let body: Value = self.client.post("/sign-up", params).await?;
        let token = extract_token(&body)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::decode("Invalid access token!"))?;
        self.set_session(Some(&token))?;
        Ok(token)
    }

    /// `GET /sign-in` returns the current user and the schools they can act on
    pub async fn me(&self) -> Result<Value, ClientError> {
        let body: Value = self.client.get("/sign-in", None).await?;
        Ok(if body.is_null() { json!({}) } else { body })
    }

    pub fn sign_out(&self) -> Result<(), ClientError> {
        self.set_session(None)
    }

    /// Store or clear the token. An already expired JWT is logged; opaque
    /// tokens have no expiry to check.
    pub fn set_session(&self, token: Option<&str>) -> Result<(), ClientError> {
        match token {
            Some(token) => {
                self.client.session().set_token(Some(token))?;
                match token::expires_at(token) {
                    Some(at) => tracing::debug!("session token expires at {}", at),
                    None => tracing::info!("session token has no exp claim, no expiry tracked"),
                }
            }
            None => self.client.session().set_token(None)?,
        }
        Ok(())
    }

    /// Clear a stored token whose `exp` has passed. Returns true when cleared.
    pub fn expire_stale_session(&self) -> Result<bool, ClientError> {
        let Some(stored) = self.client.session().token()? else {
            return Ok(false);
        };
        if token::expires_at(&stored).is_some() && !token::is_valid_token(&stored) {
            tracing::warn!("stored session token expired, clearing");
            self.client.session().set_token(None)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn friendly_sign_in_error(err: ClientError) -> ClientError {
        match err {
            ClientError::Http { status, message } if message.trim_start().starts_with('<') => {
                ClientError::http(status, "Sign-in failed. Check the API URL.")
            }
            other => other,
        }
    }
}
