// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use registry_creds::config::Config;
use registry_creds::kubernetes::{wait_for_pull_secret_crd, KubeStore};
use registry_creds::reconcilers::{
    NamespaceReconciler, PullSecretReconciler, ServiceAccountReconciler,
};
use registry_creds::sync::{Dispatcher, Resyncer};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting registry-creds operator");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: suffix={:?}, ignore_annotation={}, include_annotation={}, retract_bindings={}",
        config.projected_secret_suffix,
        config.ignore_annotation,
        config.include_annotation,
        config.retract_bindings
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for ClusterPullSecret CRD to become available...");
    wait_for_pull_secret_crd(&client).await;

    let store = Arc::new(KubeStore::new(client.clone()));
    let dispatcher = Arc::new(Dispatcher::new(store, config));

    let resyncer = Resyncer::new(dispatcher.clone());
    let pull_secret_reconciler = PullSecretReconciler::new(client.clone(), dispatcher.clone());
    let namespace_reconciler = NamespaceReconciler::new(client.clone(), dispatcher.clone());
    let service_account_reconciler = ServiceAccountReconciler::new(client, dispatcher);

    info!("Starting reconcilers...");

    tokio::try_join!(
        resyncer.run(),
        pull_secret_reconciler.run(),
        namespace_reconciler.run(),
        service_account_reconciler.run()
    )?;

    // This should never be reached as reconcilers run forever
    warn!("All reconcilers stopped unexpectedly");
    Ok(())
}
