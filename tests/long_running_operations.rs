//! Polling of long-running operations, exercised through `azurerm_kusto_cluster`.
//!
//! Writes are acknowledged with `Azure-AsyncOperation` or `Location` headers and
//! the operation status is served by separate mocks, so each test controls how
//! many polls happen before the operation finishes.

mod common;

use azurerm_provider::ProviderError;
use common::{request_bodies, tester, FakeArm, WriteMode, SUBSCRIPTION_ID};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESOURCE_TYPE: &str = "azurerm_kusto_cluster";

fn cluster_path() -> String {
    format!("/subscriptions/{SUBSCRIPTION_ID}/resourceGroups/rg-data/providers/Microsoft.Kusto/clusters/kustoprod01")
}

fn cluster_endpoints(_path: &str, body: &mut Value) {
    body["properties"]["uri"] = json!("https://kustoprod01.westeurope.kusto.windows.net");
    body["properties"]["dataIngestionUri"] = json!("https://ingest-kustoprod01.westeurope.kusto.windows.net");
    body["properties"]["provisioningState"] = json!("Succeeded");
}

fn config() -> Value {
    json!({
        "name": "kustoprod01",
        "resource_group_name": "rg-data",
        "location": "West Europe",
        "sku": [{"name": "Standard_D13_v2", "capacity": 2}],
        "tags": {"env": "prod"}
    })
}

async fn mount_operation(server: &MockServer, statuses: &[Value]) {
    // Earlier statuses are served once each, the last one from then on.
    for (i, status) in statuses.iter().enumerate() {
        let mock = Mock::given(method("GET"))
            .and(path("/operations/op1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(status));
        let mock = if i + 1 < statuses.len() {
            mock.up_to_n_times(1).with_priority(1)
        } else {
            mock.with_priority(2)
        };
        mock.mount(server).await;
    }
}

async fn operation_polls(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/operations/op1")
        .count()
}

/// Create waits until the async operation reports success.
#[tokio::test]
async fn test_create_polls_async_operation() {
    let server = MockServer::start().await;
    let arm = FakeArm::new()
        .with_computed(cluster_endpoints)
        .with_write_mode(WriteMode::AsyncOperation("/operations/op1".to_string()))
        .mount(&server)
        .await;
    mount_operation(
        &server,
        &[
            json!({"status": "InProgress"}),
            json!({"status": "InProgress"}),
            json!({"status": "Succeeded"}),
        ],
    )
    .await;
    let tester = tester(&server).await;

    let state = tester.lifecycle_create(RESOURCE_TYPE, config()).await.unwrap();

    assert_eq!(operation_polls(&server).await, 3);
    assert_eq!(state["id"], json!(cluster_path()));
    assert_eq!(state["location"], json!("westeurope"));
    assert_eq!(state["uri"], json!("https://kustoprod01.westeurope.kusto.windows.net"));
    assert_eq!(state["public_network_access_enabled"], json!(true));
    assert_eq!(state["sku"], json!([{"name": "Standard_D13_v2", "capacity": 2}]));

    let stored = arm.get(&cluster_path()).unwrap();
    assert_eq!(stored["sku"]["tier"], json!("Standard"));
    assert_eq!(stored["properties"]["publicNetworkAccess"], json!("Enabled"));
}

/// A failed operation surfaces the service's message.
#[tokio::test]
async fn test_failed_operation_is_an_error() {
    let server = MockServer::start().await;
    FakeArm::new()
        .with_write_mode(WriteMode::AsyncOperation("/operations/op1".to_string()))
        .mount(&server)
        .await;
    mount_operation(
        &server,
        &[
            json!({"status": "InProgress"}),
            json!({
                "status": "Failed",
                "error": {"code": "QuotaExceeded", "message": "Cluster quota exceeded in region"}
            }),
        ],
    )
    .await;
    let tester = tester(&server).await;

    let err = tester.lifecycle_create(RESOURCE_TYPE, config()).await.unwrap_err();

    assert!(matches!(err, ProviderError::Api { .. }), "{err:?}");
    let message = err.to_string();
    assert!(message.contains("creating"), "{message}");
    assert!(message.contains("Cluster quota exceeded in region"), "{message}");
}

/// Update sends only the changed settings and waits for the operation.
#[tokio::test]
async fn test_update_patches_changed_settings() {
    let server = MockServer::start().await;
    FakeArm::new()
        .with_computed(cluster_endpoints)
        .with_write_mode(WriteMode::AsyncOperation("/operations/op1".to_string()))
        .mount(&server)
        .await;
    mount_operation(&server, &[json!({"status": "Succeeded"})]).await;
    let tester = tester(&server).await;

    let state = tester.lifecycle_create(RESOURCE_TYPE, config()).await.unwrap();

    let mut updated = config();
    updated["purge_enabled"] = json!(true);
    updated["sku"] = json!([{"name": "Standard_D13_v2", "capacity": 4}]);
    let state = tester.lifecycle_update(RESOURCE_TYPE, state, updated).await.unwrap();

    assert_eq!(state["purge_enabled"], json!(true));
    assert_eq!(state["sku"][0]["capacity"], json!(4));

    let patches = request_bodies(&server, "PATCH").await;
    assert_eq!(
        patches,
        vec![json!({
            "sku": {"name": "Standard_D13_v2", "tier": "Standard", "capacity": 4},
            "properties": {"enablePurge": true}
        })]
    );
}

/// A cluster created without tags only sends the new SKU.
#[tokio::test]
async fn test_update_without_tags_patches_sku_only() {
    let server = MockServer::start().await;
    FakeArm::new()
        .with_computed(cluster_endpoints)
        .with_write_mode(WriteMode::AsyncOperation("/operations/op1".to_string()))
        .mount(&server)
        .await;
    mount_operation(&server, &[json!({"status": "Succeeded"})]).await;
    let tester = tester(&server).await;

    let mut untagged = config();
    untagged.as_object_mut().unwrap().remove("tags");
    let state = tester.lifecycle_create(RESOURCE_TYPE, untagged.clone()).await.unwrap();

    let mut updated = untagged;
    updated["sku"] = json!([{"name": "Standard_D13_v2", "capacity": 3}]);
    tester.lifecycle_update(RESOURCE_TYPE, state, updated).await.unwrap();

    let patches = request_bodies(&server, "PATCH").await;
    assert_eq!(
        patches,
        vec![json!({"sku": {"name": "Standard_D13_v2", "tier": "Standard", "capacity": 3}})]
    );
}

/// Delete follows the `Location` header until the service stops answering 202.
#[tokio::test]
async fn test_delete_polls_location() {
    let server = MockServer::start().await;
    let arm = FakeArm::new()
        .with_computed(cluster_endpoints)
        .with_delete_mode(WriteMode::Location("/operationResults/del1".to_string()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operationResults/del1"))
        .respond_with(ResponseTemplate::new(202).insert_header("Retry-After", "0"))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operationResults/del1"))
        .respond_with(ResponseTemplate::new(204))
        .with_priority(2)
        .mount(&server)
        .await;
    let tester = tester(&server).await;

    let state = tester.lifecycle_create(RESOURCE_TYPE, config()).await.unwrap();
    tester.lifecycle_delete(RESOURCE_TYPE, state).await.unwrap();

    assert!(!arm.contains(&cluster_path()));
    let polls = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/operationResults/del1")
        .count();
    assert_eq!(polls, 3);
}

/// A delete whose location answers 404 is already finished.
#[tokio::test]
async fn test_delete_location_not_found_is_done() {
    let server = MockServer::start().await;
    FakeArm::new()
        .with_delete_mode(WriteMode::Location("/operationResults/del1".to_string()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/operationResults/del1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let tester = tester(&server).await;

    let state = tester.lifecycle_create(RESOURCE_TYPE, config()).await.unwrap();
    tester.delete(RESOURCE_TYPE, state).await.unwrap();
}
