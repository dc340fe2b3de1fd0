//! UMA 2.0 server metadata discovery.

use crate::errors::UmaError;
use serde::{Deserialize, Serialize};

/// Path of the UMA metadata document relative to the issuer
pub const UMA2_CONFIGURATION_PATH: &str = "/.well-known/uma2-configuration";

#[derive(Debug, Deserialize)]
struct RawUmaConfiguration {
    issuer: Option<String>,
    token_endpoint: Option<String>,
    resource_registration_endpoint: Option<String>,
    permission_endpoint: Option<String>,
    policy_endpoint: Option<String>,
}

/// Endpoints advertised by the authorization server
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UmaConfiguration {
    pub issuer: String,
    pub token_endpoint: String,
    pub resource_registration_endpoint: String,
    pub permission_endpoint: Option<String>,
    pub policy_endpoint: Option<String>,
}

impl UmaConfiguration {
    /// Fetch `{issuer}/.well-known/uma2-configuration`
    pub async fn discover(http: &reqwest::Client, issuer: &str) -> Result<Self, UmaError> {
        let url = format!("{}{}", issuer.trim_end_matches('/'), UMA2_CONFIGURATION_PATH);
        tracing::debug!(%url, "discovering UMA configuration");

        let response = http
            .get(&url)
            .send()
            .await
            .map_err(|e| UmaError::DiscoveryFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UmaError::DiscoveryFailed(format!(
                "{} returned {}: {}",
                url, status, body
            )));
        }

        let raw: RawUmaConfiguration = response
            .json()
            .await
            .map_err(|e| UmaError::DiscoveryFailed(e.to_string()))?;

        Self::try_from_raw(raw, issuer)
    }

    fn try_from_raw(raw: RawUmaConfiguration, issuer: &str) -> Result<Self, UmaError> {
        Ok(Self {
            issuer: raw.issuer.unwrap_or_else(|| issuer.to_string()),
            token_endpoint: raw
                .token_endpoint
                .ok_or(UmaError::MissingEndpoint("token_endpoint"))?,
            resource_registration_endpoint: raw
                .resource_registration_endpoint
                .ok_or(UmaError::MissingEndpoint("resource_registration_endpoint"))?,
            permission_endpoint: raw.permission_endpoint,
            policy_endpoint: raw.policy_endpoint,
        })
    }
}
