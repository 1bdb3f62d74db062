// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Creates the per-namespace copy of a pull secret.
//!
//! Copies are created once and never updated afterwards: a changed seed secret
//! does not reach namespaces that already hold a copy.

use crate::constants::{DOCKER_CONFIG_JSON_TYPE, MANAGED_BY_LABEL, OPERATOR_NAME};
use crate::error::{RegistryCredsError, Result};
use crate::store::ObjectStore;
use crate::sync::source::SeedPayload;
use crate::types::ClusterPullSecret;
use k8s_openapi::api::core::v1::Secret;
use kube::{api::ObjectMeta, Resource, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Build the projected copy of a pull secret for one namespace
pub fn build_projected_secret(
    pull_secret: &ClusterPullSecret,
    namespace: &str,
    suffix: &str,
    payload: &SeedPayload,
) -> Secret {
    let owner_references = match pull_secret.controller_owner_ref(&()) {
        Some(owner) => Some(vec![owner]),
        None => {
            warn!(
                "Cannot build owner reference for ClusterPullSecret {}, copy in {} will not be garbage collected",
                pull_secret.name_any(),
                namespace
            );
            None
        }
    };

    Secret {
        metadata: ObjectMeta {
            name: Some(pull_secret.projected_secret_name(suffix)),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([(
                MANAGED_BY_LABEL.to_string(),
                OPERATOR_NAME.to_string(),
            )])),
            owner_references,
            ..Default::default()
        },
        data: Some(payload.data.clone()),
        type_: Some(DOCKER_CONFIG_JSON_TYPE.to_string()),
        ..Default::default()
    }
}

/// Ensure the namespace holds a copy of the pull secret. Returns whether it was created.
///
/// A create that loses the race against a concurrent creator is reported as
/// `Conflict`; callers treat that the same as an existing copy.
#[instrument(skip(store, pull_secret, payload), fields(pull_secret = %pull_secret.name_any()))]
pub async fn ensure_projected(
    store: &dyn ObjectStore,
    pull_secret: &ClusterPullSecret,
    namespace: &str,
    suffix: &str,
    payload: &SeedPayload,
) -> Result<bool> {
    let name = pull_secret.projected_secret_name(suffix);

    match store.get_secret(namespace, &name).await {
        Ok(_) => {
            debug!("Secret {}/{} already exists", namespace, name);
            return Ok(false);
        }
        Err(RegistryCredsError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }

    let secret = build_projected_secret(pull_secret, namespace, suffix, payload);
    match store.create_secret(&secret).await {
        Ok(_) => {
            info!("Created secret {}/{}", namespace, name);
            Ok(true)
        }
        Err(RegistryCredsError::AlreadyExists(what)) => Err(RegistryCredsError::Conflict(what)),
        Err(e) => Err(e),
    }
}
