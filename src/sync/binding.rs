// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Maintains pull secret references in a service account's imagePullSecrets.
//!
//! The list keeps its order and each managed name appears at most once; entries
//! this operator does not manage are never rewritten. Every change is one
//! optimistic replace guarded by the resourceVersion read before it, so a
//! racing writer surfaces as `Conflict` and the list is left as the winner wrote it.

use crate::error::Result;
use crate::store::ObjectStore;
use k8s_openapi::api::core::v1::{LocalObjectReference, ServiceAccount};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingChange {
    Unchanged,
    Updated,
}

/// The reference list with `secret_name` present exactly once, appended if new.
/// Later repeats of `secret_name` are dropped; other entries are left as they are.
pub fn with_binding(refs: &[LocalObjectReference], secret_name: &str) -> Vec<LocalObjectReference> {
    let mut seen = false;
    let mut bound: Vec<LocalObjectReference> = refs
        .iter()
        .filter(|r| {
            if r.name != secret_name {
                return true;
            }
            let first = !seen;
            seen = true;
            first
        })
        .cloned()
        .collect();
    if !seen {
        bound.push(LocalObjectReference {
            name: secret_name.to_string(),
        });
    }
    bound
}

/// The reference list with every `secret_name` entry removed
pub fn without_binding(
    refs: &[LocalObjectReference],
    secret_name: &str,
) -> Vec<LocalObjectReference> {
    refs.iter()
        .filter(|r| r.name != secret_name)
        .cloned()
        .collect()
}

async fn converge<F>(
    store: &dyn ObjectStore,
    namespace: &str,
    service_account: &str,
    desired: F,
) -> Result<BindingChange>
where
    F: Fn(&[LocalObjectReference]) -> Vec<LocalObjectReference> + Send,
{
    let mut sa: ServiceAccount = store.get_service_account(namespace, service_account).await?;
    let current = sa.image_pull_secrets.clone().unwrap_or_default();
    let updated = desired(&current);

    if updated == current {
        return Ok(BindingChange::Unchanged);
    }

    debug!("imagePullSecrets {:?} -> {:?}", current, updated);
    sa.image_pull_secrets = (!updated.is_empty()).then_some(updated);
    store.replace_service_account(&sa).await?;
    Ok(BindingChange::Updated)
}

/// Ensure the service account references `secret_name` exactly once
#[instrument(skip(store))]
pub async fn ensure_bound(
    store: &dyn ObjectStore,
    namespace: &str,
    service_account: &str,
    secret_name: &str,
) -> Result<BindingChange> {
    let change = converge(store, namespace, service_account, |refs| {
        with_binding(refs, secret_name)
    })
    .await?;

    if change == BindingChange::Updated {
        info!(
            "Bound secret {} to service account {}/{}",
            secret_name, namespace, service_account
        );
    }
    Ok(change)
}

/// Ensure the service account no longer references `secret_name`
#[instrument(skip(store))]
pub async fn ensure_unbound(
    store: &dyn ObjectStore,
    namespace: &str,
    service_account: &str,
    secret_name: &str,
) -> Result<BindingChange> {
    let change = converge(store, namespace, service_account, |refs| {
        without_binding(refs, secret_name)
    })
    .await?;

    if change == BindingChange::Updated {
        info!(
            "Removed secret {} from service account {}/{}",
            secret_name, namespace, service_account
        );
    }
    Ok(change)
}
