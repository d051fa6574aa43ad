//! Arc-enabled machines: the resource lifecycle and the paged list data source.

mod common;

use common::{request_bodies, tester, FakeArm, SUBSCRIPTION_ID};
use serde_json::{json, Value};
use wiremock::MockServer;

fn machines_path() -> String {
    format!("/subscriptions/{SUBSCRIPTION_ID}/resourceGroups/rg-arc/providers/Microsoft.HybridCompute/machines")
}

fn machine_path(name: &str) -> String {
    format!("{}/{name}", machines_path())
}

fn machine(location: &str, kind: Option<&str>) -> Value {
    let mut body = json!({
        "location": location,
        "properties": {"status": "Connected", "agentVersion": "1.45.02", "osType": "linux"}
    });
    if let Some(kind) = kind {
        body["kind"] = json!(kind);
    }
    body
}

fn agent_report(_path: &str, body: &mut Value) {
    body["properties"] = json!({
        "status": "Disconnected",
        "agentConfiguration": {"configMode": "full"}
    });
    if let Some(identity) = body.get_mut("identity").filter(|i| i["type"] == "SystemAssigned") {
        identity["principalId"] = json!("44444444-4444-4444-4444-444444444444");
        identity["tenantId"] = json!(common::TENANT_ID);
    }
}

/// The list follows `nextLink` across pages and keeps only the requested kind.
#[tokio::test]
async fn test_list_machines_across_pages() {
    let server = MockServer::start().await;
    let arm = FakeArm::new().with_page_size(2).mount(&server).await;
    arm.insert(&machine_path("arc-01"), machine("westeurope", Some("AWS")));
    arm.insert(&machine_path("arc-02"), machine("westeurope", None));
    arm.insert(&machine_path("arc-03"), machine("northeurope", Some("AWS")));
    arm.insert(&machine_path("arc-04"), machine("westeurope", Some("GCP")));
    arm.insert(&machine_path("arc-05"), machine("westeurope", Some("AWS")));
    let tester = tester(&server).await;

    let state = tester
        .read_data_source(
            "azurerm_hybrid_compute_machines",
            json!({"resource_group_name": "rg-arc", "kind": "AWS"}),
        )
        .await
        .unwrap();

    assert_eq!(
        state["id"],
        json!(format!("/subscriptions/{SUBSCRIPTION_ID}/resourceGroups/rg-arc"))
    );
    let names: Vec<&str> = state["machines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["arc-01", "arc-03", "arc-05"]);
    assert_eq!(state["machines"][0]["status"], json!("Connected"));

    let pages = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == machines_path())
        .count();
    assert_eq!(pages, 3);
}

/// Without a kind every machine is listed.
#[tokio::test]
async fn test_list_machines_without_filter() {
    let server = MockServer::start().await;
    let arm = FakeArm::new().mount(&server).await;
    arm.insert(&machine_path("arc-01"), machine("westeurope", Some("AWS")));
    arm.insert(&machine_path("arc-02"), machine("westeurope", None));
    let tester = tester(&server).await;

    let state = tester
        .read_data_source(
            "azurerm_hybrid_compute_machines",
            json!({"resource_group_name": "rg-arc"}),
        )
        .await
        .unwrap();
    assert_eq!(state["machines"].as_array().unwrap().len(), 2);
}

/// The single machine data source reports agent details.
#[tokio::test]
async fn test_machine_data_source() {
    let server = MockServer::start().await;
    let arm = FakeArm::new().mount(&server).await;
    arm.insert(&machine_path("arc-01"), machine("West Europe", Some("AWS")));
    let tester = tester(&server).await;

    let state = tester
        .read_data_source(
            "azurerm_hybrid_compute_machine",
            json!({"name": "arc-01", "resource_group_name": "rg-arc"}),
        )
        .await
        .unwrap();
    assert_eq!(state["id"], json!(machine_path("arc-01")));
    assert_eq!(state["location"], json!("westeurope"));
    assert_eq!(state["agent_version"], json!("1.45.02"));
    assert_eq!(state["os_type"], json!("linux"));

    let err = tester
        .read_data_source(
            "azurerm_hybrid_compute_machine",
            json!({"name": "arc-99", "resource_group_name": "rg-arc"}),
        )
        .await
        .unwrap_err();
    assert!(err.was_not_found(), "{err:?}");
}

/// Create, enable the identity, then remove it again.
#[tokio::test]
async fn test_machine_identity_lifecycle() {
    let server = MockServer::start().await;
    FakeArm::new().with_computed(agent_report).mount(&server).await;
    let tester = tester(&server).await;

    let config = json!({
        "name": "arc-01",
        "resource_group_name": "rg-arc",
        "location": "westeurope",
        "kind": "AWS",
        "tags": {"owner": "platform"}
    });
    let state = tester
        .lifecycle_create("azurerm_hybrid_compute_machine", config.clone())
        .await
        .unwrap();
    assert_eq!(state["status"], json!("Disconnected"));
    assert_eq!(state["agent_configuration_mode"], json!("full"));

    let mut with_identity = config.clone();
    with_identity["identity"] = json!([{"type": "SystemAssigned"}]);
    let state = tester
        .lifecycle_update("azurerm_hybrid_compute_machine", state, with_identity)
        .await
        .unwrap();
    assert_eq!(
        state["identity"][0]["principal_id"],
        json!("44444444-4444-4444-4444-444444444444")
    );

    tester
        .lifecycle_update("azurerm_hybrid_compute_machine", state, config)
        .await
        .unwrap();

    let patches = request_bodies(&server, "PATCH").await;
    assert_eq!(
        patches,
        vec![
            json!({"identity": {"type": "SystemAssigned"}}),
            json!({"identity": {"type": "None"}}),
        ]
    );
}

/// Enabling the identity on an untagged machine patches the identity alone.
#[tokio::test]
async fn test_untagged_machine_patches_identity_only() {
    let server = MockServer::start().await;
    FakeArm::new().with_computed(agent_report).mount(&server).await;
    let tester = tester(&server).await;

    let config = json!({
        "name": "arc-02",
        "resource_group_name": "rg-arc",
        "location": "westeurope",
        "kind": "GCP"
    });
    let state = tester
        .lifecycle_create("azurerm_hybrid_compute_machine", config.clone())
        .await
        .unwrap();

    let mut with_identity = config;
    with_identity["identity"] = json!([{"type": "SystemAssigned"}]);
    tester
        .lifecycle_update("azurerm_hybrid_compute_machine", state, with_identity)
        .await
        .unwrap();

    let patches = request_bodies(&server, "PATCH").await;
    assert_eq!(patches, vec![json!({"identity": {"type": "SystemAssigned"}})]);
}
