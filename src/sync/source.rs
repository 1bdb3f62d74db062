// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Loads the seed secret a ClusterPullSecret points at.

use crate::error::{RegistryCredsError, Result};
use crate::store::ObjectStore;
use crate::types::ClusterPullSecret;
use k8s_openapi::ByteString;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Credential payload copied verbatim into every projected secret
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPayload {
    pub data: BTreeMap<String, ByteString>,
    pub type_: Option<String>,
}

#[instrument(skip_all, fields(pull_secret = %pull_secret.name_any()))]
pub async fn resolve_seed(
    store: &dyn ObjectStore,
    pull_secret: &ClusterPullSecret,
) -> Result<SeedPayload> {
    let seed_ref = pull_secret.seed_ref()?;

    let seed = match store.get_secret(&seed_ref.namespace, &seed_ref.name).await {
        Ok(s) => s,
        Err(RegistryCredsError::NotFound(_)) => {
            return Err(RegistryCredsError::SourceNotFound(format!(
                "{}/{} referenced by {}",
                seed_ref.namespace,
                seed_ref.name,
                pull_secret.name_any()
            )))
        }
        Err(e) => return Err(e),
    };

    debug!("Resolved seed secret {}/{}", seed_ref.namespace, seed_ref.name);

    Ok(SeedPayload {
        data: seed.data.unwrap_or_default(),
        type_: seed.type_,
    })
}
