// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{RegistryCredsError, Result};
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

/// A registry credential to distribute into every eligible namespace
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "ops.alexellis.io", version = "v1", kind = "ClusterPullSecret")]
#[kube(
    printcolumn = r#"{"name":"SecretName","type":"string","jsonPath":".spec.secretRef.name"}"#,
    printcolumn = r#"{"name":"SecretNamespace","type":"string","jsonPath":".spec.secretRef.namespace"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPullSecretSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretReference>,
}

/// Locates the seed secret holding the actual credential payload
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub struct SecretReference {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

impl ClusterPullSecret {
    /// The seed secret reference, rejected when missing or partially empty
    pub fn seed_ref(&self) -> Result<&SecretReference> {
        match self.spec.secret_ref.as_ref() {
            Some(r) if !r.name.is_empty() && !r.namespace.is_empty() => Ok(r),
            _ => Err(RegistryCredsError::InvalidSpec(format!(
                "no valid secretRef found on ClusterPullSecret {}",
                self.name_any()
            ))),
        }
    }

    /// Name of the copy projected into each namespace
    pub fn projected_secret_name(&self, suffix: &str) -> String {
        format!("{}{}", self.name_any(), suffix)
    }
}
