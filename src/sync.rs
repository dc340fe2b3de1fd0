//! Resource synchronizer.
//!
//! Registers every entity type of every app config as an UMA resource set for
//! a client. Registration is create-or-ignore: resources that already exist
//! are left untouched and never cause the run to fail.

use crate::config::AllowList;
use crate::errors::{ResourceError, Result};
use crate::registry::{AppConfig, EntityEnumerator, EntityMeta, EntityTypes};
use crate::slug::slugify;
use crate::uma::{AccessTokenProvider, Client};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a synchronization run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Labels of newly registered resources
    pub created: Vec<String>,
    /// Labels that were already registered
    pub existing: Vec<String>,
    /// App configs excluded by the allow-list
    pub skipped_apps: Vec<String>,
}

impl SyncReport {
    pub fn merge(&mut self, other: SyncReport) {
        self.created.extend(other.created);
        self.existing.extend(other.existing);
        self.skipped_apps.extend(other.skipped_apps);
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.existing.is_empty() && self.skipped_apps.is_empty()
    }
}

/// Resource type URN for an entity label, `urn:{client}:resources:{label}`
pub fn resource_type(client_id: &str, label: &str) -> String {
    format!("urn:{}:resources:{}", slugify(client_id), label)
}

pub(crate) fn get_all_permissions(meta: &EntityMeta) -> Vec<String> {
    meta.default_permissions.clone()
}

pub struct ResourceSynchronizer {
    enumerator: Arc<dyn EntityEnumerator>,
    token_provider: Arc<dyn AccessTokenProvider>,
    allow_list: AllowList,
}

impl ResourceSynchronizer {
    pub fn new(
        enumerator: Arc<dyn EntityEnumerator>,
        token_provider: Arc<dyn AccessTokenProvider>,
        allow_list: AllowList,
    ) -> Self {
        Self {
            enumerator,
            token_provider,
            allow_list,
        }
    }

    /// Synchronize the entity types of every app config for `client`.
    ///
    /// Stops at the first app that fails; resources registered before the
    /// failure stay registered.
    pub async fn synchronize_client(&self, client: &Client) -> Result<SyncReport> {
        tracing::debug!(
            client_id = %client.client_id(),
            restricted = self.allow_list.is_restricted(),
            "synchronizing resources"
        );
        let mut report = SyncReport::default();
        for app_config in self.enumerator.list_app_configs() {
            report.merge(self.synchronize_resources(client, &app_config).await?);
        }

        tracing::info!(
            client_id = %client.client_id(),
            created = report.created.len(),
            existing = report.existing.len(),
            skipped_apps = report.skipped_apps.len(),
            "resource synchronization finished"
        );
        Ok(report)
    }

    /// Synchronize the entity types of a single app config for `client`
    pub async fn synchronize_resources(
        &self,
        client: &Client,
        app_config: &AppConfig,
    ) -> Result<SyncReport> {
        if app_config.models_module.is_none() || app_config.models.is_empty() {
            return Ok(SyncReport::default());
        }

        if !self.allow_list.admits(&app_config.name) {
            tracing::info!(
                app = %app_config.name,
                "app config is not in the synchronization allow-list, skipping"
            );
            let mut report = self.create_resources(&EntityTypes::new(), client).await?;
            report.skipped_apps.push(app_config.name.clone());
            return Ok(report);
        }

        self.create_resources(&app_config.models, client).await
    }

    pub(crate) async fn create_resources(
        &self,
        entity_types: &EntityTypes,
        client: &Client,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        if entity_types.is_empty() {
            return Ok(report);
        }

        let uma_client = client.uma_api_client();
        let access_token = self.token_provider.get_access_token(client).await?;

        for entity_type in entity_types.values() {
            let label = &entity_type.meta.label_lower;
            let scopes = get_all_permissions(&entity_type.meta);
            let resource_type = resource_type(client.client_id(), label);

            match uma_client
                .resource_set_create(&access_token, label, &resource_type, &scopes)
                .await
            {
                Ok(()) => {
                    tracing::debug!(%label, %resource_type, "registered resource");
                    report.created.push(label.clone());
                }
                Err(ResourceError::Conflict(_)) => {
                    report.existing.push(label.clone());
                }
                Err(err) => {
                    tracing::error!(
                        %label,
                        status = ?err.status_code(),
                        error = %err,
                        "resource registration failed"
                    );
                    return Err(err.into());
                }
            }
        }

        Ok(report)
    }
}
