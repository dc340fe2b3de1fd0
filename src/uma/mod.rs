//! UMA 2.0 protection API collaborators.
//!
//! The synchronizer talks to the authorization server only through the
//! [`ResourceSetClient`] and [`AccessTokenProvider`] traits. The submodules
//! provide reqwest implementations for Keycloak-style servers.

pub mod discovery;
pub mod resource_set;
pub mod token;

pub use discovery::UmaConfiguration;
pub use resource_set::UmaApiClient;
pub use token::ClientCredentialsTokenProvider;

use crate::errors::{ResourceError, TokenError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Resource set registration payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(rename = "resource_scopes")]
    pub scopes: Vec<String>,
}

/// Wire operations of the resource registration endpoint
#[async_trait]
pub trait ResourceSetClient: Send + Sync {
    /// Register a new resource set.
    ///
    /// Returns [`ResourceError::Conflict`] when a resource with the same name
    /// is already registered.
    async fn resource_set_create(
        &self,
        token: &str,
        name: &str,
        resource_type: &str,
        scopes: &[String],
    ) -> Result<(), ResourceError>;
}

/// Source of bearer tokens for a client
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn get_access_token(&self, client: &Client) -> Result<String, TokenError>;
}

/// A client registered with the authorization server
#[derive(Clone)]
pub struct Client {
    client_id: String,
    client_secret: Option<String>,
    uma_api: Arc<dyn ResourceSetClient>,
}

impl Client {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        uma_api: Arc<dyn ResourceSetClient>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            uma_api,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    /// Authenticated handle to the protection API
    pub fn uma_api_client(&self) -> Arc<dyn ResourceSetClient> {
        self.uma_api.clone()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}
