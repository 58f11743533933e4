//! Contract tests for the PostgREST backend.
//!
//! wiremock plays the hosted project; every test checks the request shape
//! (path, filters, headers) and how responses map onto `StoreError`.

use procure_core::{ForeignKey, ParentScope, PoNumber, ProductId, VendorId};
use procure_entities::{PurchaseOrder, Vendor, VendorDraft};
use procure_infra::{EntityStore, RestClient, RestTable, StoreConfig, StoreError};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn table<E: procure_core::Entity>(server: &MockServer) -> RestTable<E> {
    let config = StoreConfig::local(&server.uri(), "anon-key").unwrap();
    RestClient::new(&config).unwrap().table::<E>().unwrap()
}

#[tokio::test]
async fn list_scoped_filters_on_the_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/PurchaseOrders"))
        .and(query_param("select", "*"))
        .and(query_param("vendorid", "eq.1"))
        .and(query_param("productid", "eq.7"))
        .and(query_param("order", "ponumber.asc"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "ponumber": 100,
                "vendorid": 1,
                "productid": 7,
                "requestdate": "2024-05-01",
                "expecteddeliverydate": "2024-05-10",
                "quantityordered": 12,
                "unitprice": 3.5
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let orders = table::<PurchaseOrder>(&server);
    let scope = ParentScope::unscoped()
        .with(ForeignKey::Vendor, VendorId::new(1))
        .with(ForeignKey::Product, ProductId::new(7));

    let rows = orders.list_scoped(&scope).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].number, PoNumber::new(100));
    assert_eq!(rows[0].details.unit_price, Some(3.5));
}

#[tokio::test]
async fn create_posts_draft_and_returns_generated_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/Vendors"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(serde_json::json!({ "vendorname": "Acme" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([
            { "vendorid": 1, "vendorname": "Acme", "email": null }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let vendors = table::<Vendor>(&server);
    let created = vendors.create(&VendorDraft::named("Acme")).await.unwrap();
    assert_eq!(created.id, VendorId::new(1));
    assert_eq!(created.details.name, "Acme");
}

#[tokio::test]
async fn update_of_missing_row_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/Vendors"))
        .and(query_param("vendorid", "eq.42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let vendors = table::<Vendor>(&server);
    let err = vendors
        .update(VendorId::new(42), &VendorDraft::named("Ghost"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, StoreError::NotFound { table: "Vendors", id: 42 }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn delete_of_missing_row_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/Vendors"))
        .and(query_param("vendorid", "eq.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let vendors = table::<Vendor>(&server);
    assert!(vendors.delete(VendorId::new(9)).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn delete_of_existing_row_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/Vendors"))
        .and(query_param("vendorid", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "vendorid": 1, "vendorname": "Acme" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    table::<Vendor>(&server).delete(VendorId::new(1)).await.unwrap();
}

#[tokio::test]
async fn get_returns_none_for_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Vendors"))
        .and(query_param("vendorid", "eq.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    assert!(table::<Vendor>(&server).get(VendorId::new(5)).await.unwrap().is_none());
}

#[tokio::test]
async fn foreign_key_violation_maps_to_constraint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/Vendors"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "23502",
            "message": "null value in column \"vendorname\" violates not-null constraint"
        })))
        .mount(&server)
        .await;

    let err = table::<Vendor>(&server)
        .create(&VendorDraft::default())
        .await
        .unwrap_err();
    match err {
        StoreError::Constraint(msg) => assert!(msg.contains("not-null")),
        other => panic!("Expected Constraint, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_key_maps_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Vendors"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let err = table::<Vendor>(&server).list_all().await.unwrap_err();
    assert!(matches!(err, StoreError::Unauthorized(ref m) if m == "Invalid API key"));
}

#[tokio::test]
async fn other_failures_keep_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Vendors"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = table::<Vendor>(&server).list_all().await.unwrap_err();
    assert!(matches!(err, StoreError::Api { status: 503, ref body } if body == "upstream down"));
}

#[tokio::test]
async fn malformed_rows_are_decode_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Vendors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "vendorid": "not-a-number", "vendorname": "Acme" }
        ])))
        .mount(&server)
        .await;

    let err = table::<Vendor>(&server).list_all().await.unwrap_err();
    assert!(matches!(err, StoreError::Decode { table: "Vendors", .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let server = MockServer::start().await;
    let vendors = table::<Vendor>(&server);
    drop(server);

    let err = vendors.list_all().await.unwrap_err();
    assert!(matches!(err, StoreError::Network(_)), "got {err:?}");
}
