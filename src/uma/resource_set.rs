//! Resource registration endpoint client.

use super::{ResourceSet, ResourceSetClient};
use crate::errors::ResourceError;
use async_trait::async_trait;
use http::StatusCode;

/// reqwest client for the UMA resource registration endpoint
#[derive(Clone, Debug)]
pub struct UmaApiClient {
    http: reqwest::Client,
    resource_registration_endpoint: String,
}

impl UmaApiClient {
    pub fn new(http: reqwest::Client, resource_registration_endpoint: impl Into<String>) -> Self {
        Self {
            http,
            resource_registration_endpoint: resource_registration_endpoint.into(),
        }
    }
}

#[async_trait]
impl ResourceSetClient for UmaApiClient {
    async fn resource_set_create(
        &self,
        token: &str,
        name: &str,
        resource_type: &str,
        scopes: &[String],
    ) -> Result<(), ResourceError> {
        let resource = ResourceSet {
            name: name.to_string(),
            resource_type: resource_type.to_string(),
            scopes: scopes.to_vec(),
        };

        let response = self
            .http
            .post(&self.resource_registration_endpoint)
            .bearer_auth(token)
            .json(&resource)
            .send()
            .await
            .map_err(|e| ResourceError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(ResourceError::Conflict(name.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ResourceError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
