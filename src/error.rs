// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryCredsError {
    #[error("Invalid ClusterPullSecret spec: {0}")]
    InvalidSpec(String),

    #[error("Seed secret not found: {0}")]
    SourceNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Conflicting write: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Reconciliation exceeded its budget of {0} seconds")]
    Timeout(u64),
}

/// What the dispatcher does with a failed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Another writer already made equivalent progress
    Settled,
    /// Dropped until the next event for the object arrives
    Drop,
    /// Transient, the triggering object is requeued
    Requeue,
}

impl RegistryCredsError {
    pub fn disposition(&self) -> Disposition {
        match self {
            RegistryCredsError::Conflict(_) | RegistryCredsError::AlreadyExists(_) => {
                Disposition::Settled
            }
            RegistryCredsError::InvalidSpec(_)
            | RegistryCredsError::SourceNotFound(_)
            | RegistryCredsError::NotFound(_) => Disposition::Drop,
            RegistryCredsError::StoreUnavailable(_) | RegistryCredsError::Timeout(_) => {
                Disposition::Requeue
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryCredsError>;
