// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace reconciler - applies every pull secret to a changed namespace.

use crate::error::{RegistryCredsError, Result};
use crate::reconcilers::next_action;
use crate::sync::{Dispatcher, Trigger};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct NamespaceReconciler {
    client: Client,
    dispatcher: Arc<Dispatcher>,
}

impl NamespaceReconciler {
    pub fn new(client: Client, dispatcher: Arc<Dispatcher>) -> Self {
        Self { client, dispatcher }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(namespaces, watcher::Config::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled namespace: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(namespace: Arc<Namespace>, ctx: Arc<NamespaceReconciler>) -> Result<Action> {
    debug!("Detected a change in namespace: {}", namespace.name_any());

    let report = ctx
        .dispatcher
        .dispatch(Trigger::Namespace((*namespace).clone()))
        .await?;

    Ok(next_action(&report, ctx.dispatcher.config()))
}

fn error_policy(
    _namespace: Arc<Namespace>,
    error: &RegistryCredsError,
    ctx: Arc<NamespaceReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(ctx.dispatcher.config().error_requeue)
}
