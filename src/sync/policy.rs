// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Annotation policy deciding which namespaces and service accounts take part.

use crate::config::Config;
use k8s_openapi::api::core::v1::{Namespace, ServiceAccount};
use kube::ResourceExt;

#[derive(Debug, Clone)]
pub struct Policy {
    ignore_annotation: String,
    include_annotation: String,
    default_service_account: String,
}

impl Policy {
    pub fn new(config: &Config) -> Self {
        Self {
            ignore_annotation: config.ignore_annotation.clone(),
            include_annotation: config.include_annotation.clone(),
            default_service_account: config.default_service_account.clone(),
        }
    }

    /// A namespace opts out with the ignore annotation set to "true" (any case) or "1"
    pub fn is_namespace_eligible(&self, namespace: &Namespace) -> bool {
        !namespace
            .annotations()
            .get(&self.ignore_annotation)
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    }

    /// The default account is always bound; others opt in by naming the pull secret
    pub fn is_service_account_eligible(
        &self,
        service_account: &ServiceAccount,
        pull_secret_name: &str,
    ) -> bool {
        service_account.name_any() == self.default_service_account
            || service_account
                .annotations()
                .get(&self.include_annotation)
                .is_some_and(|v| v == pull_secret_name)
    }
}
