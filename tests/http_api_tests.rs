#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use product_pricing::{
    CatalogError, CatalogResult, Overrides, Product, RateSource, RateTable, RateTableCache,
    RawMaterialRate, http_api,
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

struct FixedRates;

impl RateSource for FixedRates {
    fn load_rates(&self) -> CatalogResult<RateTable> {
        Ok(RateTable::new(vec![
            RawMaterialRate::new("copper", 700.0).with_name("Copper"),
        ]))
    }

    fn describe(&self) -> String {
        "fixed".into()
    }
}

fn catalog() -> Vec<Product> {
    vec![
        Product::new("Enamelled copper wire", "1 kg")
            .with_material("copper", "1")
            .with_wastage("copper", "2")
            .with_additional_cost("labour", "15")
            .with_manufacturing_cost("copper", "20")
            .with_margin("10"),
        Product::new("Bare copper strip", "coil").with_legacy("330", "62"),
    ]
}

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(catalog(), RateTableCache::new(FixedRates));
    http_api::router(state)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(app: axum::Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_and_listing_routes() {
    let app = new_router();

    let (status, body) = get_json(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = get_json(app.clone(), "/rates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], json!("copper"));
    assert_eq!(body[0]["name"], json!("Copper"));

    let (status, body) = get_json(app, "/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert_eq!(body[1]["net_rate"], json!("330"));
}

#[tokio::test]
async fn quotes_apply_the_copper_query() {
    let app = new_router();

    let (status, body) = get_json(app.clone(), "/quotes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["position"], json!(1));
    assert_eq!(body[0]["quote"], json!({ "kind": "structured", "price": 832.0 }));
    assert_eq!(body[1]["quote"], json!({ "kind": "unpriced" }));

    let (_, body) = get_json(app, "/quotes?copper=750").await;
    assert_eq!(body[0]["quote"]["price"], json!(889.0));
    assert_eq!(body[1]["quote"], json!({ "kind": "legacy", "rate": "271.08" }));
}

#[tokio::test]
async fn default_overrides_apply_without_a_query() {
    let state = http_api::AppState::new(catalog(), RateTableCache::new(FixedRates))
        .with_default_overrides(Overrides::with_copper("800"));
    let app = http_api::router(state);

    let (_, body) = get_json(app, "/quotes").await;
    assert_eq!(body[0]["quote"]["price"], json!(946.0));
    assert_eq!(body[1]["quote"]["rate"], json!("289.16"));
}

#[tokio::test]
async fn single_quote_includes_breakdown() {
    let app = new_router();
    let product = serde_json::to_value(&catalog()[0]).unwrap();

    let (status, body) = post_json(
        app.clone(),
        "/quote",
        json!({ "product": product, "overrides": { "copper": "750" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display"], json!("889.00"));
    assert_eq!(body["breakdown"]["additional_cost"], json!(15.0));
    assert_eq!(body["breakdown"]["price"], json!(889.0));

    let legacy = serde_json::to_value(&catalog()[1]).unwrap();
    let (status, body) = post_json(app, "/quote", json!({ "product": legacy })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quote"], json!({ "kind": "unpriced" }));
    assert_eq!(body["display"], json!("-"));
    assert!(body.get("breakdown").is_none());
}

#[tokio::test]
async fn quote_without_pricing_data_is_unpriced() {
    let app = new_router();
    let (status, body) = post_json(
        app,
        "/quote",
        json!({ "product": { "description": "Spare bobbin", "packing": "each" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quote"], json!({ "kind": "unpriced" }));
    assert_eq!(body["display"], json!("-"));
    assert!(body.get("breakdown").is_none());
}

struct BrokenRates;

impl RateSource for BrokenRates {
    fn load_rates(&self) -> CatalogResult<RateTable> {
        Err(CatalogError::InvalidData("rates sheet missing".into()))
    }

    fn describe(&self) -> String {
        "broken".into()
    }
}

#[tokio::test]
async fn rate_table_failure_is_an_internal_error() {
    let state = http_api::AppState::new(catalog(), RateTableCache::new(BrokenRates));
    let (status, body) = get_json(http_api::router(state), "/quotes").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("internal_error"));
}
