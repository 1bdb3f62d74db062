// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! `ObjectStore` backed by the Kubernetes API server

use crate::error::{RegistryCredsError, Result};
use crate::store::ObjectStore;
use crate::types::ClusterPullSecret;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret, ServiceAccount};
use kube::{
    api::{ListParams, PostParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Translate an API error into the store error taxonomy
fn store_error(err: kube::Error, what: String) -> RegistryCredsError {
    match err {
        kube::Error::Api(ref resp) if resp.code == 404 => RegistryCredsError::NotFound(what),
        kube::Error::Api(ref resp) if resp.code == 409 && resp.reason == "AlreadyExists" => {
            RegistryCredsError::AlreadyExists(what)
        }
        kube::Error::Api(ref resp) if resp.code == 409 => RegistryCredsError::Conflict(what),
        e => RegistryCredsError::StoreUnavailable(format!("{}: {}", what, e)),
    }
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn list_pull_secrets(&self) -> Result<Vec<ClusterPullSecret>> {
        let api: Api<ClusterPullSecret> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| store_error(e, "clusterpullsecrets".to_string()))?;
        Ok(list.items)
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| store_error(e, "namespaces".to_string()))?;
        Ok(list.items)
    }

    async fn get_namespace(&self, name: &str) -> Result<Namespace> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.get(name)
            .await
            .map_err(|e| store_error(e, format!("namespace {}", name)))
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| store_error(e, format!("secret {}/{}", namespace, name)))
    }

    #[instrument(skip(self, secret), fields(secret = %secret.name_any()))]
    async fn create_secret(&self, secret: &Secret) -> Result<Secret> {
        let namespace = secret.namespace().unwrap_or_default();
        let api: Api<Secret> = Api::namespaced(self.client.clone(), &namespace);
        debug!("Creating secret in namespace {}", namespace);
        api.create(&PostParams::default(), secret)
            .await
            .map_err(|e| store_error(e, format!("secret {}/{}", namespace, secret.name_any())))
    }

    async fn list_service_accounts(&self, namespace: &str) -> Result<Vec<ServiceAccount>> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| store_error(e, format!("serviceaccounts in {}", namespace)))?;
        Ok(list.items)
    }

    async fn get_service_account(&self, namespace: &str, name: &str) -> Result<ServiceAccount> {
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| store_error(e, format!("serviceaccount {}/{}", namespace, name)))
    }

    #[instrument(skip(self, service_account), fields(service_account = %service_account.name_any()))]
    async fn replace_service_account(
        &self,
        service_account: &ServiceAccount,
    ) -> Result<ServiceAccount> {
        let namespace = service_account.namespace().unwrap_or_default();
        let name = service_account.name_any();
        let api: Api<ServiceAccount> = Api::namespaced(self.client.clone(), &namespace);
        api.replace(&name, &PostParams::default(), service_account)
            .await
            .map_err(|e| store_error(e, format!("serviceaccount {}/{}", namespace, name)))
    }
}
