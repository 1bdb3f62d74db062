// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that react to watch events.

pub mod namespace;
pub mod pull_secret;
pub mod service_account;

pub use namespace::NamespaceReconciler;
pub use pull_secret::PullSecretReconciler;
pub use service_account::ServiceAccountReconciler;

use crate::config::Config;
use crate::sync::Report;
use kube::runtime::controller::Action;

/// Requeue after transient failures, otherwise wait for the next watch event
pub(crate) fn next_action(report: &Report, config: &Config) -> Action {
    if report.retry {
        Action::requeue(config.error_requeue)
    } else {
        Action::await_change()
    }
}
