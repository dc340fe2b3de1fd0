//! Client credentials token acquisition with a per-client cache.

use super::{AccessTokenProvider, Client};
use crate::errors::TokenError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Tokens are refreshed this long before they expire
const EXPIRY_LEEWAY_SECONDS: i64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Clone, Debug)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_LEEWAY_SECONDS) < self.expires_at
    }
}

fn expires_at(expires_in: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(expires_in).and_then(|ttl| Utc::now().checked_add_signed(ttl))
}

/// Obtains tokens with the OAuth 2.0 client credentials grant
pub struct ClientCredentialsTokenProvider {
    http: reqwest::Client,
    token_endpoint: String,
    cache: Mutex<HashMap<String, CachedToken>>,
}

impl ClientCredentialsTokenProvider {
    pub fn new(http: reqwest::Client, token_endpoint: impl Into<String>) -> Self {
        Self {
            http,
            token_endpoint: token_endpoint.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    async fn request_token(&self, client: &Client) -> Result<TokenResponse, TokenError> {
        if self.token_endpoint.is_empty() {
            return Err(TokenError::NoTokenEndpoint(client.client_id().to_string()));
        }

        let mut request = self.http.post(&self.token_endpoint);
        let mut form = vec![("grant_type", "client_credentials")];
        match client.client_secret() {
            Some(secret) => request = request.basic_auth(client.client_id(), Some(secret)),
            None => form.push(("client_id", client.client_id())),
        }

        let response = request
            .form(&form)
            .send()
            .await
            .map_err(|e| TokenError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| TokenError::Transport(e.to_string()))
    }
}

#[async_trait]
impl AccessTokenProvider for ClientCredentialsTokenProvider {
    async fn get_access_token(&self, client: &Client) -> Result<String, TokenError> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.get(client.client_id()) {
            if cached.is_fresh(Utc::now()) {
                tracing::debug!(client_id = %client.client_id(), "using cached access token");
                return Ok(cached.access_token.clone());
            }
        }

        let token = self.request_token(client).await?;
        tracing::debug!(
            client_id = %client.client_id(),
            expires_in = ?token.expires_in,
            "obtained access token"
        );

        // Tokens without a representable expiry are used once and not cached
        match token.expires_in.and_then(expires_at) {
            Some(expires_at) => {
                cache.insert(
                    client.client_id().to_string(),
                    CachedToken {
                        access_token: token.access_token.clone(),
                        expires_at,
                    },
                );
            }
            None => {
                cache.remove(client.client_id());
            }
        }

        Ok(token.access_token)
    }
}
