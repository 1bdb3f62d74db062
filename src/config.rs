// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{annotations, DEFAULT_SERVICE_ACCOUNT};
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Appended to a ClusterPullSecret's name to name its per-namespace copies
    pub projected_secret_suffix: String,
    pub ignore_annotation: String,
    pub include_annotation: String,
    pub default_service_account: String,
    /// Remove bindings from service accounts that are no longer eligible
    pub retract_bindings: bool,
    /// Interval between full resyncs, `None` disables them
    pub resync_interval: Option<Duration>,
    pub reconcile_timeout: Duration,
    pub max_concurrent_items: usize,
    pub error_requeue: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            projected_secret_suffix: String::new(),
            ignore_annotation: annotations::IGNORE.to_string(),
            include_annotation: annotations::INCLUDE.to_string(),
            default_service_account: DEFAULT_SERVICE_ACCOUNT.to_string(),
            retract_bindings: false,
            resync_interval: Some(Duration::from_secs(300)),
            reconcile_timeout: Duration::from_secs(30),
            max_concurrent_items: 8,
            error_requeue: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let resync_secs: u64 = parse_or(&lookup, "RESYNC_INTERVAL_SECS", 300)?;
        let timeout_secs: u64 = parse_or(&lookup, "RECONCILE_TIMEOUT_SECS", 30)?;
        let requeue_secs: u64 = parse_or(&lookup, "ERROR_REQUEUE_SECS", 60)?;
        let max_concurrent_items: usize = parse_or(&lookup, "MAX_CONCURRENT_ITEMS", 8)?;

        Ok(Config {
            projected_secret_suffix: lookup("PROJECTED_SECRET_SUFFIX")
                .unwrap_or(defaults.projected_secret_suffix),
            ignore_annotation: lookup("IGNORE_ANNOTATION").unwrap_or(defaults.ignore_annotation),
            include_annotation: lookup("INCLUDE_ANNOTATION")
                .unwrap_or(defaults.include_annotation),
            default_service_account: lookup("DEFAULT_SERVICE_ACCOUNT")
                .unwrap_or(defaults.default_service_account),
            retract_bindings: parse_or(&lookup, "RETRACT_INELIGIBLE_BINDINGS", false)?,
            resync_interval: (resync_secs > 0).then(|| Duration::from_secs(resync_secs)),
            reconcile_timeout: Duration::from_secs(timeout_secs),
            max_concurrent_items: max_concurrent_items.max(1),
            error_requeue: Duration::from_secs(requeue_secs),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
