//! A fake Resource Manager endpoint backed by wiremock.
//!
//! [`FakeArm`] keeps resources in memory keyed by their path. GET returns the
//! stored body (or a 404 envelope), PUT stores the body, PATCH merges into it,
//! DELETE removes it. A GET on a collection path lists the children, split
//! into pages of `page_size` linked by `nextLink`.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use azurerm_provider::testing::ProviderTester;
use azurerm_provider::AzureProvider;
use serde_json::{json, Value};
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const SUBSCRIPTION_ID: &str = "00000000-0000-0000-0000-000000000000";
pub const TENANT_ID: &str = "11111111-1111-1111-1111-111111111111";

/// How a write is acknowledged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// 200 with the stored body.
    Sync,
    /// 201 (202 for deletes) with an `Azure-AsyncOperation` header pointing at this path.
    AsyncOperation(String),
    /// 202 with a `Location` header pointing at this path.
    Location(String),
}

#[derive(Clone)]
pub struct FakeArm {
    resources: Arc<Mutex<BTreeMap<String, Value>>>,
    computed: Option<fn(&str, &mut Value)>,
    write_mode: WriteMode,
    delete_mode: WriteMode,
    page_size: usize,
}

impl Default for FakeArm {
    fn default() -> Self {
        Self {
            resources: Arc::default(),
            computed: None,
            write_mode: WriteMode::Sync,
            delete_mode: WriteMode::Sync,
            page_size: 100,
        }
    }
}

impl FakeArm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill in read-only properties on every body written by PUT or PATCH.
    pub fn with_computed(mut self, computed: fn(&str, &mut Value)) -> Self {
        self.computed = Some(computed);
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    pub fn with_delete_mode(mut self, mode: WriteMode) -> Self {
        self.delete_mode = mode;
        self
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Store a resource directly, as if created outside the provider.
    pub fn insert(&self, path: &str, body: Value) {
        self.resources
            .lock()
            .unwrap()
            .insert(path.to_string(), with_identity(path, body));
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.resources.lock().unwrap().get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.resources.lock().unwrap().contains_key(path)
    }

    pub async fn mount(self, server: &MockServer) -> Self {
        Mock::given(path_regex(r"^/subscriptions/"))
            .respond_with(self.clone())
            .mount(server)
            .await;
        self
    }

    fn acknowledge(mode: &WriteMode, body: Option<&Value>) -> ResponseTemplate {
        match mode {
            WriteMode::Sync => match body {
                Some(body) => ResponseTemplate::new(200).set_body_json(body),
                None => ResponseTemplate::new(200),
            },
            WriteMode::AsyncOperation(url) => ResponseTemplate::new(if body.is_some() { 201 } else { 202 })
                .insert_header("Azure-AsyncOperation", url.as_str())
                .insert_header("Retry-After", "0"),
            WriteMode::Location(url) => ResponseTemplate::new(202)
                .insert_header("Location", url.as_str())
                .insert_header("Retry-After", "0"),
        }
    }

    fn list(&self, request: &Request, path: &str) -> ResponseTemplate {
        let prefix = format!("{path}/");
        let items: Vec<Value> = self
            .resources
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix) && !key[prefix.len()..].contains('/'))
            .map(|(_, body)| body.clone())
            .collect();

        let skip: usize = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "$skiptoken")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        let page: Vec<Value> = items.iter().skip(skip).take(self.page_size).cloned().collect();

        let mut body = json!({ "value": page });
        if skip + self.page_size < items.len() {
            body["nextLink"] = json!(format!(
                "{path}?api-version=2024-07-10&$skiptoken={}",
                skip + self.page_size
            ));
        }
        ResponseTemplate::new(200).set_body_json(body)
    }
}

fn not_found(path: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "error": {
            "code": "ResourceNotFound",
            "message": format!("The Resource '{path}' was not found.")
        }
    }))
}

fn with_identity(path: &str, mut body: Value) -> Value {
    if let Value::Object(map) = &mut body {
        map.insert("id".to_string(), json!(path));
        if let Some(name) = path.rsplit('/').next() {
            map.insert("name".to_string(), json!(name));
        }
    }
    body
}

fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(target.entry(key).or_insert(Value::Null), value);
            }
        },
        (target, patch) => *target = patch,
    }
}

// Resource paths have an even number of segments, collections an odd number.
fn is_collection(path: &str) -> bool {
    path.trim_matches('/').split('/').count() % 2 == 1
}

impl Respond for FakeArm {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let path = request.url.path().to_string();
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);

        match request.method.as_str() {
            "GET" if is_collection(&path) => self.list(request, &path),
            "GET" => match self.get(&path) {
                Some(body) => ResponseTemplate::new(200).set_body_json(body),
                None => not_found(&path),
            },
            "PUT" => {
                let mut stored = with_identity(&path, body);
                if let Some(computed) = self.computed {
                    computed(&path, &mut stored);
                }
                self.resources.lock().unwrap().insert(path, stored.clone());
                Self::acknowledge(&self.write_mode, Some(&stored))
            },
            "PATCH" => {
                let mut resources = self.resources.lock().unwrap();
                let Some(stored) = resources.get_mut(&path) else {
                    return not_found(&path);
                };
                merge(stored, body);
                if let Some(computed) = self.computed {
                    computed(&path, stored);
                }
                let stored = stored.clone();
                drop(resources);
                Self::acknowledge(&self.write_mode, Some(&stored))
            },
            "DELETE" => {
                self.resources.lock().unwrap().remove(&path);
                Self::acknowledge(&self.delete_mode, None)
            },
            _ => ResponseTemplate::new(405),
        }
    }
}

/// Provider block pointing at `server`, polling without delay.
pub fn provider_config(server: &MockServer) -> Value {
    json!({
        "subscription_id": SUBSCRIPTION_ID,
        "tenant_id": TENANT_ID,
        "access_token": "test-token",
        "resource_manager_endpoint": server.uri(),
        "default_poll_interval_seconds": 0
    })
}

/// A configured tester talking to `server`.
pub async fn tester(server: &MockServer) -> ProviderTester<AzureProvider> {
    let _ = azurerm_provider::try_init_logging();
    let tester = ProviderTester::new(AzureProvider::new().unwrap());
    tester.configure(provider_config(server)).await.unwrap();
    tester
}

/// Bodies of every request with `method` received so far.
pub async fn request_bodies(server: &MockServer, method: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == method)
        .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
        .collect()
}
