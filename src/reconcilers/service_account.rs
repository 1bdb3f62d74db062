// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ServiceAccount reconciler - binds existing pull secrets to a changed service account.

use crate::error::{RegistryCredsError, Result};
use crate::reconcilers::next_action;
use crate::sync::{Dispatcher, Trigger};
use futures::StreamExt;
use k8s_openapi::api::core::v1::ServiceAccount;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct ServiceAccountReconciler {
    client: Client,
    dispatcher: Arc<Dispatcher>,
}

impl ServiceAccountReconciler {
    pub fn new(client: Client, dispatcher: Arc<Dispatcher>) -> Self {
        Self { client, dispatcher }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let service_accounts: Api<ServiceAccount> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(service_accounts, watcher::Config::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled service account: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(
    service_account: Arc<ServiceAccount>,
    ctx: Arc<ServiceAccountReconciler>,
) -> Result<Action> {
    debug!(
        "Detected a change in service account: {}/{}",
        service_account.namespace().unwrap_or_default(),
        service_account.name_any()
    );

    let report = ctx
        .dispatcher
        .dispatch(Trigger::ServiceAccount((*service_account).clone()))
        .await?;

    Ok(next_action(&report, ctx.dispatcher.config()))
}

fn error_policy(
    _service_account: Arc<ServiceAccount>,
    error: &RegistryCredsError,
    ctx: Arc<ServiceAccountReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(ctx.dispatcher.config().error_requeue)
}
