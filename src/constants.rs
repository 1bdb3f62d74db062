// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys used by registry-creds
pub mod annotations {
    /// On a Namespace, "true" or "1" excludes it from propagation
    pub const IGNORE: &str = "alexellis.io/registry-creds.ignore";
    /// On a ServiceAccount, the name of a ClusterPullSecret to bind in addition to the default account
    pub const INCLUDE: &str = "alexellis.io/registry-creds.include";
}

/// The operator name, used as the managed-by label value
pub const OPERATOR_NAME: &str = "registry-creds";

/// The service account every eligible namespace gets bound
pub const DEFAULT_SERVICE_ACCOUNT: &str = "default";

/// Secret type of every projected copy
pub const DOCKER_CONFIG_JSON_TYPE: &str = "kubernetes.io/dockerconfigjson";

pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// CRD polling configuration
pub mod crd {
    pub const GROUP: &str = "ops.alexellis.io";
    pub const KIND: &str = "ClusterPullSecret";
    pub const VERSION: &str = "v1";
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
