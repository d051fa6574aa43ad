//! End-to-end lifecycle of `azurerm_aadb2c_directory` against a fake Resource Manager.

mod common;

use azurerm_provider::testing::{assert_plan_no_changes, assert_plan_updates_in_place};
use azurerm_provider::ProviderError;
use common::{request_bodies, tester, FakeArm, SUBSCRIPTION_ID};
use serde_json::{json, Value};
use wiremock::MockServer;

const RESOURCE_TYPE: &str = "azurerm_aadb2c_directory";

fn directory_path() -> String {
    format!(
        "/subscriptions/{SUBSCRIPTION_ID}/resourceGroups/acctestRG-b2c/providers/Microsoft.AzureActiveDirectory/b2cDirectories/acctest123.onmicrosoft.com"
    )
}

fn tenant_properties(_path: &str, body: &mut Value) {
    body["properties"]["tenantId"] = json!("22222222-2222-2222-2222-222222222222");
    body["properties"]["billingConfig"] = json!({
        "billingType": "mau",
        "effectiveStartDateUtc": "2026-01-01T00:00:00Z"
    });
}

fn config() -> Value {
    json!({
        "domain_name": "acctest123.onmicrosoft.com",
        "resource_group_name": "acctestRG-b2c",
        "data_residency_location": "United States",
        "sku_name": "PremiumP1",
        "country_code": "US",
        "display_name": "acctest123",
        "tags": {"env": "test"}
    })
}

/// Create stores the tenant and the state carries computed and create-only fields.
#[tokio::test]
async fn test_create_and_read() {
    let server = MockServer::start().await;
    let arm = FakeArm::new()
        .with_computed(tenant_properties)
        .mount(&server)
        .await;
    let tester = tester(&server).await;

    let state = tester.lifecycle_create(RESOURCE_TYPE, config()).await.unwrap();

    assert_eq!(state["id"], json!(directory_path()));
    assert_eq!(state["sku_name"], json!("PremiumP1"));
    assert_eq!(state["data_residency_location"], json!("United States"));
    assert_eq!(state["tenant_id"], json!("22222222-2222-2222-2222-222222222222"));
    assert_eq!(state["billing_type"], json!("mau"));
    // Never returned by the service, carried over from configuration.
    assert_eq!(state["country_code"], json!("US"));
    assert_eq!(state["display_name"], json!("acctest123"));

    let stored = arm.get(&directory_path()).unwrap();
    assert_eq!(stored["sku"], json!({"name": "PremiumP1", "tier": "A0"}));
    assert_eq!(
        stored["properties"]["createTenantProperties"]["countryCode"],
        json!("US")
    );

    let plan = tester.plan_update(RESOURCE_TYPE, state, config()).await.unwrap();
    assert_plan_no_changes(&plan);
}

/// Creating a tenant that already exists asks for an import instead.
#[tokio::test]
async fn test_create_existing_requires_import() {
    let server = MockServer::start().await;
    let arm = FakeArm::new().mount(&server).await;
    arm.insert(
        &directory_path(),
        json!({"location": "United States", "sku": {"name": "PremiumP1"}}),
    );
    let tester = tester(&server).await;

    let err = tester.lifecycle_create(RESOURCE_TYPE, config()).await.unwrap_err();
    assert!(err.is_requires_import(), "{err}");
    assert!(err.to_string().contains(&directory_path()));
}

/// Changing the SKU patches only the SKU.
#[tokio::test]
async fn test_update_sends_only_changed_fields() {
    let server = MockServer::start().await;
    let arm = FakeArm::new()
        .with_computed(tenant_properties)
        .mount(&server)
        .await;
    let tester = tester(&server).await;

    let state = tester.lifecycle_create(RESOURCE_TYPE, config()).await.unwrap();

    let mut updated = config();
    updated["sku_name"] = json!("PremiumP2");
    let plan = tester.plan_update(RESOURCE_TYPE, state.clone(), updated.clone()).await.unwrap();
    assert_plan_updates_in_place(&plan);

    let state = tester.lifecycle_update(RESOURCE_TYPE, state, updated).await.unwrap();
    assert_eq!(state["sku_name"], json!("PremiumP2"));
    assert_eq!(arm.get(&directory_path()).unwrap()["sku"]["name"], json!("PremiumP2"));

    let patches = request_bodies(&server, "PATCH").await;
    assert_eq!(patches, vec![json!({"sku": {"name": "PremiumP2", "tier": "A0"}})]);
}

/// Optional fields left unset on create stay out of a later PATCH.
#[tokio::test]
async fn test_update_leaves_unset_fields_alone() {
    let server = MockServer::start().await;
    FakeArm::new()
        .with_computed(tenant_properties)
        .mount(&server)
        .await;
    let tester = tester(&server).await;

    let minimal = json!({
        "domain_name": "acctest123.onmicrosoft.com",
        "resource_group_name": "acctestRG-b2c",
        "data_residency_location": "United States",
        "sku_name": "PremiumP1"
    });
    let state = tester.lifecycle_create(RESOURCE_TYPE, minimal.clone()).await.unwrap();
    assert_eq!(state["tags"], json!({}));

    let mut updated = minimal;
    updated["sku_name"] = json!("PremiumP2");
    tester.lifecycle_update(RESOURCE_TYPE, state, updated).await.unwrap();

    let patches = request_bodies(&server, "PATCH").await;
    assert_eq!(patches, vec![json!({"sku": {"name": "PremiumP2", "tier": "A0"}})]);
}

/// Delete removes the tenant and a later read reports it gone.
#[tokio::test]
async fn test_delete() {
    let server = MockServer::start().await;
    let arm = FakeArm::new().mount(&server).await;
    let tester = tester(&server).await;

    let state = tester.lifecycle_create(RESOURCE_TYPE, config()).await.unwrap();
    tester.lifecycle_delete(RESOURCE_TYPE, state).await.unwrap();

    assert!(!arm.contains(&directory_path()));
}

/// Import reads the tenant by ID.
#[tokio::test]
async fn test_import() {
    let server = MockServer::start().await;
    let arm = FakeArm::new()
        .with_computed(tenant_properties)
        .mount(&server)
        .await;
    arm.insert(
        &directory_path(),
        json!({"location": "Europe", "sku": {"name": "Standard"}, "tags": {"team": "identity"}}),
    );
    let tester = tester(&server).await;

    let imported = tester
        .import_resource(RESOURCE_TYPE, &directory_path())
        .await
        .unwrap();
    assert_eq!(imported.len(), 1);
    let state = &imported[0].state;
    assert_eq!(state["domain_name"], json!("acctest123.onmicrosoft.com"));
    assert_eq!(state["data_residency_location"], json!("Europe"));
    assert_eq!(state["tags"], json!({"team": "identity"}));
}

/// Importing a missing tenant is an error, not an empty import.
#[tokio::test]
async fn test_import_missing() {
    let server = MockServer::start().await;
    FakeArm::new().mount(&server).await;
    let tester = tester(&server).await;

    let err = tester
        .import_resource(RESOURCE_TYPE, &directory_path())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NotFound(_)), "{err:?}");
}

/// The data source reads an existing tenant.
#[tokio::test]
async fn test_data_source() {
    let server = MockServer::start().await;
    let arm = FakeArm::new()
        .with_computed(tenant_properties)
        .mount(&server)
        .await;
    arm.insert(
        &directory_path(),
        json!({
            "location": "United States",
            "sku": {"name": "PremiumP1"},
            "properties": {"tenantId": "33333333-3333-3333-3333-333333333333"}
        }),
    );
    let tester = tester(&server).await;

    let state = tester
        .read_data_source(
            RESOURCE_TYPE,
            json!({
                "domain_name": "acctest123.onmicrosoft.com",
                "resource_group_name": "acctestRG-b2c"
            }),
        )
        .await
        .unwrap();
    assert_eq!(state["id"], json!(directory_path()));
    assert_eq!(state["tenant_id"], json!("33333333-3333-3333-3333-333333333333"));
}
