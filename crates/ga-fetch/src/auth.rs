//! Service-account token exchange.
//!
//! Signs an RS256 assertion for the read-only analytics scope and trades it
//! at the account's token URI for a bearer token. Tokens are cached and
//! refreshed shortly before they expire.

use chrono::Utc;
use ga_core::ServiceAccount;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::FetchError;

pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Bearer tokens for one service account.
pub struct TokenSource {
    account: ServiceAccount,
    key: EncodingKey,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(account: ServiceAccount, http: reqwest::Client) -> Result<Self, FetchError> {
        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| FetchError::Auth(format!("invalid private key: {}", e)))?;
        Ok(Self { account, key, http, cached: Mutex::new(None) })
    }

    /// A token valid for at least another minute.
    pub async fn access_token(&self) -> Result<String, FetchError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - REFRESH_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    fn assertion(&self, now: i64) -> Result<String, FetchError> {
        let claims = Claims {
            iss: &self.account.client_email,
            scope: ANALYTICS_READONLY_SCOPE,
            aud: &self.account.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| FetchError::Auth(format!("cannot sign assertion: {}", e)))
    }

    async fn exchange(&self, now: i64) -> Result<CachedToken, FetchError> {
        let assertion = self.assertion(now)?;
        tracing::debug!(email = %self.account.client_email, "exchanging service account assertion");

        let response = self
            .http
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Auth(format!("token endpoint returned {}: {}", status.as_u16(), body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Auth(format!("malformed token response: {}", e)))?;

        Ok(CachedToken { value: token.access_token, expires_at: now + token.expires_in })
    }
}
