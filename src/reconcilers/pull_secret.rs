// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ClusterPullSecret reconciler - fans a changed pull secret out to every namespace.

use crate::error::{RegistryCredsError, Result};
use crate::reconcilers::next_action;
use crate::sync::{Dispatcher, Trigger};
use crate::types::ClusterPullSecret;
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct PullSecretReconciler {
    client: Client,
    dispatcher: Arc<Dispatcher>,
}

impl PullSecretReconciler {
    pub fn new(client: Client, dispatcher: Arc<Dispatcher>) -> Self {
        Self { client, dispatcher }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let pull_secrets: Api<ClusterPullSecret> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(pull_secrets, watcher::Config::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled ClusterPullSecret: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(
    pull_secret: Arc<ClusterPullSecret>,
    ctx: Arc<PullSecretReconciler>,
) -> Result<Action> {
    debug!("Reconciling ClusterPullSecret: {}", pull_secret.name_any());

    let report = ctx
        .dispatcher
        .dispatch(Trigger::PullSecret((*pull_secret).clone()))
        .await?;

    Ok(next_action(&report, ctx.dispatcher.config()))
}

fn error_policy(
    _pull_secret: Arc<ClusterPullSecret>,
    error: &RegistryCredsError,
    ctx: Arc<PullSecretReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(ctx.dispatcher.config().error_requeue)
}
