//! Application entity registry.
//!
//! The host application describes its model classes through the
//! [`EntityEnumerator`] trait. [`ManifestRegistry`] is a file-backed
//! implementation for running the synchronizer outside a host framework.

use crate::errors::RegistryError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Operations every model class gets unless it declares its own
pub const DEFAULT_PERMISSIONS: [&str; 4] = ["add", "change", "delete", "view"];

fn default_permissions() -> Vec<String> {
    DEFAULT_PERMISSIONS.iter().map(|p| p.to_string()).collect()
}

/// Metadata of a model class
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Lowercase dotted label, `app_label.model_name`
    pub label_lower: String,
    /// Operations permitted on the model
    #[serde(default = "default_permissions")]
    pub default_permissions: Vec<String>,
}

/// A model class declared by an app
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType {
    pub meta: EntityMeta,
}

impl EntityType {
    pub fn new(label_lower: impl Into<String>, default_permissions: Vec<String>) -> Self {
        Self {
            meta: EntityMeta {
                label_lower: label_lower.into(),
                default_permissions,
            },
        }
    }

    /// Entity with the standard add/change/delete/view operations
    pub fn with_default_permissions(label_lower: impl Into<String>) -> Self {
        Self::new(label_lower, default_permissions())
    }
}

/// Entity types keyed by model name, in declaration order
pub type EntityTypes = IndexMap<String, EntityType>;

/// Configuration of a single application
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    #[serde(default)]
    pub models_module: Option<String>,
    #[serde(default)]
    pub models: EntityTypes,
}

impl AppConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the models module and register entity types
    pub fn with_models(
        mut self,
        models_module: impl Into<String>,
        models: impl IntoIterator<Item = (String, EntityType)>,
    ) -> Self {
        self.models_module = Some(models_module.into());
        self.models.extend(models);
        self
    }
}

/// Source of application configs
pub trait EntityEnumerator: Send + Sync {
    /// List every known application config
    fn list_app_configs(&self) -> Vec<AppConfig>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    #[serde(default)]
    apps: Vec<AppConfig>,
}

/// Entity enumerator backed by a JSON manifest
#[derive(Clone, Debug, Default)]
pub struct ManifestRegistry {
    apps: Vec<AppConfig>,
}

impl ManifestRegistry {
    pub fn new(apps: Vec<AppConfig>) -> Self {
        Self { apps }
    }

    /// Parse a manifest document
    pub fn from_json(value: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(value)?;
        Ok(Self::new(manifest.apps))
    }

    /// Load a manifest from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RegistryError::ManifestUnreadable(path.display().to_string(), e))?;
        let registry = Self::from_json(&contents)?;
        tracing::debug!(
            path = %path.display(),
            apps = registry.apps.len(),
            "loaded entity manifest"
        );
        Ok(registry)
    }
}

impl EntityEnumerator for ManifestRegistry {
    fn list_app_configs(&self) -> Vec<AppConfig> {
        self.apps.clone()
    }
}
