// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The object store primitives the sync engine is written against.
//!
//! Implementations report missing objects as `NotFound`, a create racing an
//! existing object as `AlreadyExists`, a replace whose `resourceVersion` is stale
//! as `Conflict`, and every other failure as `StoreUnavailable`.

use crate::error::Result;
use crate::types::ClusterPullSecret;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret, ServiceAccount};

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_pull_secrets(&self) -> Result<Vec<ClusterPullSecret>>;

    async fn list_namespaces(&self) -> Result<Vec<Namespace>>;

    async fn get_namespace(&self, name: &str) -> Result<Namespace>;

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret>;

    async fn create_secret(&self, secret: &Secret) -> Result<Secret>;

    async fn list_service_accounts(&self, namespace: &str) -> Result<Vec<ServiceAccount>>;

    async fn get_service_account(&self, namespace: &str, name: &str) -> Result<ServiceAccount>;

    /// Write the whole object back, guarded by its `metadata.resourceVersion`
    async fn replace_service_account(&self, service_account: &ServiceAccount)
        -> Result<ServiceAccount>;
}
