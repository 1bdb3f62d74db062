// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: an in-memory object store and a mock Kubernetes API service.

use crate::error::{RegistryCredsError, Result};
use crate::store::ObjectStore;
use crate::types::{ClusterPullSecret, ClusterPullSecretSpec, SecretReference};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::{LocalObjectReference, Namespace, Secret, ServiceAccount};
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

#[derive(Default)]
struct State {
    pull_secrets: BTreeMap<String, ClusterPullSecret>,
    namespaces: BTreeMap<String, Namespace>,
    secrets: BTreeMap<(String, String), Secret>,
    service_accounts: BTreeMap<(String, String), ServiceAccount>,
    next_version: u64,
    writes: usize,
    conflict_on_next_replace: bool,
    delete_on_next_replace: bool,
    race_next_create: bool,
    unavailable: bool,
    stalled: bool,
}

impl State {
    fn bump(&mut self) -> String {
        self.next_version += 1;
        self.next_version.to_string()
    }
}

/// In-memory `ObjectStore` with resource versions and failure injection.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

fn key(namespace: &str, name: &str) -> (String, String) {
    (namespace.to_string(), name.to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pull_secret(&self, pull_secret: ClusterPullSecret) {
        let mut state = self.state.lock().unwrap();
        state.pull_secrets.insert(pull_secret.name_any(), pull_secret);
    }

    pub fn add_namespace(&self, namespace: Namespace) {
        let mut state = self.state.lock().unwrap();
        state.namespaces.insert(namespace.name_any(), namespace);
    }

    pub fn add_secret(&self, mut secret: Secret) {
        let mut state = self.state.lock().unwrap();
        secret.metadata.resource_version = Some(state.bump());
        let k = key(&secret.namespace().unwrap_or_default(), &secret.name_any());
        state.secrets.insert(k, secret);
    }

    pub fn add_service_account(&self, mut service_account: ServiceAccount) {
        let mut state = self.state.lock().unwrap();
        service_account.metadata.resource_version = Some(state.bump());
        let k = key(
            &service_account.namespace().unwrap_or_default(),
            &service_account.name_any(),
        );
        state.service_accounts.insert(k, service_account);
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.state.lock().unwrap().secrets.get(&key(namespace, name)).cloned()
    }

    pub fn service_account(&self, namespace: &str, name: &str) -> Option<ServiceAccount> {
        self.state
            .lock()
            .unwrap()
            .service_accounts
            .get(&key(namespace, name))
            .cloned()
    }

    /// Names referenced by a service account's imagePullSecrets, in order
    pub fn pull_secret_names(&self, namespace: &str, name: &str) -> Vec<String> {
        self.service_account(namespace, name)
            .and_then(|sa| sa.image_pull_secrets)
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.name)
            .collect()
    }

    /// Number of successful creates and replaces so far
    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    /// Make the next replace fail as if another writer got there first
    pub fn conflict_on_next_replace(&self) {
        self.state.lock().unwrap().conflict_on_next_replace = true;
    }

    /// Make the next replace find the service account deleted since it was read
    pub fn delete_on_next_replace(&self) {
        self.state.lock().unwrap().delete_on_next_replace = true;
    }

    /// Let a concurrent writer create the same secret right before the next create
    pub fn race_next_create(&self) {
        self.state.lock().unwrap().race_next_create = true;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }

    /// Make every following call hang forever
    pub fn set_stalled(&self, stalled: bool) {
        self.state.lock().unwrap().stalled = stalled;
    }

    async fn gate(&self) -> Result<()> {
        let (stalled, unavailable) = {
            let state = self.state.lock().unwrap();
            (state.stalled, state.unavailable)
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        if unavailable {
            return Err(RegistryCredsError::StoreUnavailable(
                "memory store switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_pull_secrets(&self) -> Result<Vec<ClusterPullSecret>> {
        self.gate().await?;
        let state = self.state.lock().unwrap();
        Ok(state.pull_secrets.values().cloned().collect())
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        self.gate().await?;
        let state = self.state.lock().unwrap();
        Ok(state.namespaces.values().cloned().collect())
    }

    async fn get_namespace(&self, name: &str) -> Result<Namespace> {
        self.gate().await?;
        let state = self.state.lock().unwrap();
        state
            .namespaces
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryCredsError::NotFound(format!("namespace {}", name)))
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        self.gate().await?;
        let state = self.state.lock().unwrap();
        state
            .secrets
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| RegistryCredsError::NotFound(format!("secret {}/{}", namespace, name)))
    }

    async fn create_secret(&self, secret: &Secret) -> Result<Secret> {
        self.gate().await?;
        let mut state = self.state.lock().unwrap();
        let k = key(&secret.namespace().unwrap_or_default(), &secret.name_any());
        if state.race_next_create {
            state.race_next_create = false;
            let mut theirs = secret.clone();
            theirs.metadata.resource_version = Some(state.bump());
            state.secrets.insert(k.clone(), theirs);
        }
        if state.secrets.contains_key(&k) {
            return Err(RegistryCredsError::AlreadyExists(format!("secret {}/{}", k.0, k.1)));
        }
        let mut created = secret.clone();
        created.metadata.resource_version = Some(state.bump());
        state.secrets.insert(k, created.clone());
        state.writes += 1;
        Ok(created)
    }

    async fn list_service_accounts(&self, namespace: &str) -> Result<Vec<ServiceAccount>> {
        self.gate().await?;
        let state = self.state.lock().unwrap();
        Ok(state
            .service_accounts
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, sa)| sa.clone())
            .collect())
    }

    async fn get_service_account(&self, namespace: &str, name: &str) -> Result<ServiceAccount> {
        self.gate().await?;
        let state = self.state.lock().unwrap();
        state
            .service_accounts
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| {
                RegistryCredsError::NotFound(format!("serviceaccount {}/{}", namespace, name))
            })
    }

    async fn replace_service_account(
        &self,
        service_account: &ServiceAccount,
    ) -> Result<ServiceAccount> {
        self.gate().await?;
        let mut state = self.state.lock().unwrap();
        let k = key(
            &service_account.namespace().unwrap_or_default(),
            &service_account.name_any(),
        );
        let what = format!("serviceaccount {}/{}", k.0, k.1);
        if state.delete_on_next_replace {
            state.delete_on_next_replace = false;
            state.service_accounts.remove(&k);
        }

        let stale = match state.service_accounts.get(&k) {
            Some(current) => {
                current.metadata.resource_version != service_account.metadata.resource_version
            }
            None => return Err(RegistryCredsError::NotFound(what)),
        };
        if stale || state.conflict_on_next_replace {
            state.conflict_on_next_replace = false;
            return Err(RegistryCredsError::Conflict(what));
        }

        let mut replaced = service_account.clone();
        replaced.metadata.resource_version = Some(state.bump());
        state.service_accounts.insert(k, replaced.clone());
        state.writes += 1;
        Ok(replaced)
    }
}

/// Build a ClusterPullSecret with a uid, so owner references can be derived from it
pub fn make_pull_secret(name: &str, seed_namespace: &str, seed_name: &str) -> ClusterPullSecret {
    let mut ps = ClusterPullSecret::new(
        name,
        ClusterPullSecretSpec {
            secret_ref: Some(SecretReference {
                name: seed_name.to_string(),
                namespace: seed_namespace.to_string(),
            }),
        },
    );
    ps.metadata.uid = Some(format!("uid-{}", name));
    ps
}

pub fn make_namespace(name: &str, annotations: &[(&str, &str)]) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            annotations: to_map(annotations),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn make_service_account(
    namespace: &str,
    name: &str,
    annotations: &[(&str, &str)],
    pull_secrets: &[&str],
) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations: to_map(annotations),
            ..Default::default()
        },
        image_pull_secrets: (!pull_secrets.is_empty()).then(|| {
            pull_secrets
                .iter()
                .map(|n| LocalObjectReference {
                    name: n.to_string(),
                })
                .collect()
        }),
        ..Default::default()
    }
}

pub fn make_seed_secret(namespace: &str, name: &str, data: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        type_: Some("kubernetes.io/dockerconfigjson".to_string()),
        ..Default::default()
    }
}

fn to_map(pairs: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
    (!pairs.is_empty()).then(|| {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    })
}

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Try prefix match for paths like /api/v1/namespaces/foo
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, status_json(404, "NotFound", "not found")));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// Create a Status JSON body as returned by the API server on failures
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}
