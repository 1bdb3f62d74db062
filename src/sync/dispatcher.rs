// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Turns watch triggers into pull secret × namespace work items and converges them.
//!
//! Every trigger only decides its [`Scope`]; the pipeline run over a scope is the
//! same for all of them: resolve the seed payload once per pull secret, then per
//! eligible namespace ensure the projected copy and bind it to every eligible
//! service account. Both primitives are idempotent, so the cause and order of
//! triggers only affect latency, never the end state.

use crate::config::Config;
use crate::error::{Disposition, RegistryCredsError, Result};
use crate::store::ObjectStore;
use crate::sync::binding::{ensure_bound, ensure_unbound, BindingChange};
use crate::sync::policy::Policy;
use crate::sync::projector::ensure_projected;
use crate::sync::source::{resolve_seed, SeedPayload};
use crate::types::ClusterPullSecret;
use futures::{stream, StreamExt};
use k8s_openapi::api::core::v1::{Namespace, ServiceAccount};
use kube::ResourceExt;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

/// Events that reconcilers hand to the dispatcher
#[derive(Debug, Clone)]
pub enum Trigger {
    /// A ClusterPullSecret was created or updated
    PullSecret(ClusterPullSecret),
    /// A namespace was created or updated
    Namespace(Namespace),
    /// A service account was created or updated
    ServiceAccount(ServiceAccount),
    /// Periodic pass over everything
    Resync,
}

/// Which service accounts of a namespace a work item considers
#[derive(Debug, Clone)]
pub enum AccountScope {
    All,
    Only(ServiceAccount),
}

/// The pull secrets × namespaces × service accounts a trigger is responsible for
#[derive(Debug, Clone)]
pub struct Scope {
    pub pull_secrets: Vec<ClusterPullSecret>,
    pub namespaces: Vec<Namespace>,
    pub accounts: AccountScope,
    /// Whether work items create missing projected secrets
    pub project: bool,
}

/// Progress of a single work item, reported when it stops early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    PayloadResolved,
    SecretEnsured,
    BindingsEnsured,
}

/// Outcome of one dispatch
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub secrets_created: usize,
    pub bindings_added: usize,
    pub bindings_removed: usize,
    /// Steps abandoned until the next event
    pub dropped: usize,
    /// At least one step failed transiently
    pub retry: bool,
}

impl Report {
    fn merge(&mut self, other: Report) {
        self.secrets_created += other.secrets_created;
        self.bindings_added += other.bindings_added;
        self.bindings_removed += other.bindings_removed;
        self.dropped += other.dropped;
        self.retry |= other.retry;
    }
}

/// One pull secret × namespace pair, owning everything it needs
struct WorkItem {
    pull_secret: ClusterPullSecret,
    payload: Option<Arc<SeedPayload>>,
    namespace: Namespace,
    accounts: AccountScope,
}

pub struct Dispatcher {
    store: Arc<dyn ObjectStore>,
    policy: Policy,
    config: Config,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn ObjectStore>, config: Config) -> Self {
        Self {
            store,
            policy: Policy::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process one trigger within the configured time budget
    pub async fn dispatch(&self, trigger: Trigger) -> Result<Report> {
        let budget = self.config.reconcile_timeout;
        timeout(budget, self.dispatch_unbounded(trigger))
            .await
            .map_err(|_| RegistryCredsError::Timeout(budget.as_secs()))
    }

    async fn dispatch_unbounded(&self, trigger: Trigger) -> Report {
        match self.scope_for(trigger).await {
            Ok(scope) => self.run(scope).await,
            Err(e) => {
                let mut report = Report::default();
                self.settle(Stage::Start, "scope", &e, &mut report);
                report
            }
        }
    }

    /// Compute what a trigger is responsible for
    pub async fn scope_for(&self, trigger: Trigger) -> Result<Scope> {
        let scope = match trigger {
            Trigger::PullSecret(pull_secret) => Scope {
                pull_secrets: vec![pull_secret],
                namespaces: self.store.list_namespaces().await?,
                accounts: AccountScope::All,
                project: true,
            },
            Trigger::Namespace(namespace) => Scope {
                pull_secrets: self.store.list_pull_secrets().await?,
                namespaces: vec![namespace],
                accounts: AccountScope::All,
                project: true,
            },
            Trigger::ServiceAccount(service_account) => {
                let namespace = self
                    .store
                    .get_namespace(&service_account.namespace().unwrap_or_default())
                    .await?;
                Scope {
                    pull_secrets: self.store.list_pull_secrets().await?,
                    namespaces: vec![namespace],
                    accounts: AccountScope::Only(service_account),
                    project: false,
                }
            }
            Trigger::Resync => Scope {
                pull_secrets: self.store.list_pull_secrets().await?,
                namespaces: self.store.list_namespaces().await?,
                accounts: AccountScope::All,
                project: true,
            },
        };
        Ok(scope)
    }

    /// Run the shared pipeline over a scope
    pub async fn run(&self, scope: Scope) -> Report {
        let mut report = Report::default();

        let namespaces: Vec<Namespace> = scope
            .namespaces
            .into_iter()
            .filter(|ns| self.accepts_namespace(ns))
            .collect();
        if namespaces.is_empty() || scope.pull_secrets.is_empty() {
            return report;
        }

        let mut sources: Vec<(ClusterPullSecret, Option<Arc<SeedPayload>>)> = Vec::new();
        for pull_secret in scope.pull_secrets {
            let subject = pull_secret.name_any();
            if let Err(e) = pull_secret.seed_ref() {
                self.settle(Stage::Start, &subject, &e, &mut report);
                continue;
            }
            if !scope.project {
                debug!(
                    "Binding {} without projecting, the reference may point at a missing secret until projection runs",
                    subject
                );
                sources.push((pull_secret, None));
                continue;
            }
            match resolve_seed(self.store.as_ref(), &pull_secret).await {
                Ok(payload) => sources.push((pull_secret, Some(Arc::new(payload)))),
                Err(e) => {
                    self.settle(Stage::Start, &subject, &e, &mut report);
                }
            }
        }

        let mut items = Vec::with_capacity(sources.len() * namespaces.len());
        for (pull_secret, payload) in &sources {
            for namespace in &namespaces {
                items.push(WorkItem {
                    pull_secret: pull_secret.clone(),
                    payload: payload.clone(),
                    namespace: namespace.clone(),
                    accounts: scope.accounts.clone(),
                });
            }
        }

        stream::iter(items)
            .map(|item| self.reconcile_item(item))
            .buffer_unordered(self.config.max_concurrent_items)
            .fold(report, |mut acc, item| async move {
                acc.merge(item);
                acc
            })
            .await
    }

    fn accepts_namespace(&self, namespace: &Namespace) -> bool {
        if !self.policy.is_namespace_eligible(namespace) {
            debug!(
                "Ignoring namespace {} due to annotation {}",
                namespace.name_any(),
                self.config.ignore_annotation
            );
            return false;
        }
        if namespace.metadata.deletion_timestamp.is_some() {
            debug!("Skipping terminating namespace {}", namespace.name_any());
            return false;
        }
        true
    }

    #[instrument(skip_all, fields(pull_secret = %item.pull_secret.name_any(), namespace = %item.namespace.name_any()))]
    async fn reconcile_item(&self, item: WorkItem) -> Report {
        let WorkItem {
            pull_secret,
            payload,
            namespace,
            accounts,
        } = item;
        let mut report = Report::default();
        let ns = namespace.name_any();
        let ps = pull_secret.name_any();
        let subject = format!("{} in {}", ps, ns);
        let secret_name = pull_secret.projected_secret_name(&self.config.projected_secret_suffix);

        if let Some(payload) = payload {
            match ensure_projected(
                self.store.as_ref(),
                &pull_secret,
                &ns,
                &self.config.projected_secret_suffix,
                &payload,
            )
            .await
            {
                Ok(true) => report.secrets_created += 1,
                Ok(false) => {}
                Err(e) => {
                    if !self.settle(Stage::PayloadResolved, &subject, &e, &mut report) {
                        return report;
                    }
                }
            }
        }

        let service_accounts = match accounts {
            AccountScope::All => match self.store.list_service_accounts(&ns).await {
                Ok(list) => list,
                Err(e) => {
                    self.settle(Stage::SecretEnsured, &subject, &e, &mut report);
                    return report;
                }
            },
            AccountScope::Only(sa) => vec![sa],
        };

        for sa in &service_accounts {
            let sa_name = sa.name_any();
            let eligible = self.policy.is_service_account_eligible(sa, &ps);

            let result = if eligible {
                ensure_bound(self.store.as_ref(), &ns, &sa_name, &secret_name).await
            } else if self.config.retract_bindings {
                ensure_unbound(self.store.as_ref(), &ns, &sa_name, &secret_name).await
            } else {
                continue;
            };

            match result {
                Ok(BindingChange::Updated) if eligible => report.bindings_added += 1,
                Ok(BindingChange::Updated) => report.bindings_removed += 1,
                Ok(BindingChange::Unchanged) => {}
                Err(e) => {
                    let subject = format!("{} for service account {}/{}", ps, ns, sa_name);
                    self.settle(Stage::SecretEnsured, &subject, &e, &mut report);
                }
            }
        }

        debug!("Work item reached {:?}", Stage::BindingsEnsured);
        report
    }

    /// The one place failures are classified. Returns whether the work item may continue.
    fn settle(
        &self,
        reached: Stage,
        subject: &str,
        err: &RegistryCredsError,
        report: &mut Report,
    ) -> bool {
        match err.disposition() {
            Disposition::Settled => {
                debug!(
                    "{}: {}, another writer got there first (stage {:?})",
                    subject, err, reached
                );
                true
            }
            Disposition::Drop => {
                report.dropped += 1;
                match err {
                    RegistryCredsError::InvalidSpec(_) => {
                        warn!("{}: {} (stage {:?})", subject, err, reached)
                    }
                    _ => info!("{}: {} (stage {:?})", subject, err, reached),
                }
                false
            }
            Disposition::Requeue => {
                report.dropped += 1;
                report.retry = true;
                error!("{}: {} (stage {:?})", subject, err, reached);
                false
            }
        }
    }
}
