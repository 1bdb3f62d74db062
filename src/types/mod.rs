// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types owned by registry-creds.

pub mod pull_secret;

pub use pull_secret::{ClusterPullSecret, ClusterPullSecretSpec, SecretReference};
