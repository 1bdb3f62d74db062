// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes plumbing: CRD discovery and the API-server backed object store.

pub mod crd;
pub mod store;

pub use crd::wait_for_pull_secret_crd;
pub use store::KubeStore;
