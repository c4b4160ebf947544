//! Catalog filtering and the session cart.

use axum::http::StatusCode;
use bloomway_integration_tests::{TestApp, product_json};
use serde_json::json;

async fn catalog_app() -> TestApp {
    let app = TestApp::start().await;
    app.mock_get(
        "/products",
        json!([
            product_json("p1", "Seattle Roses", 30.0, "Seattle"),
            product_json("p2", "Cheap Tulips", 10.0, "Seattle"),
            product_json("p3", "Portland Lilies", 20.0, "Portland"),
        ]),
    )
    .await;
    app.mock_get("/categories", json!([{"_id": "bouquets", "name": "Bouquets"}]))
        .await;
    app
}

#[tokio::test]
async fn test_catalog_filters_by_city_and_sorts_by_price() {
    let app = catalog_app().await;
    let response = app.get("/catalog?city=Seattle&sort=price_asc", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let body = &response.body;
    assert!(!body.contains("Portland Lilies"));
    let tulips = body.find("Cheap Tulips").unwrap();
    let roses = body.find("Seattle Roses").unwrap();
    assert!(tulips < roses, "cheapest product first");
}

#[tokio::test]
async fn test_catalog_price_bounds_are_inclusive() {
    let app = catalog_app().await;
    let response = app.get("/catalog?min=20&max=30", None).await;
    assert!(response.body.contains("Seattle Roses"));
    assert!(response.body.contains("Portland Lilies"));
    assert!(!response.body.contains("Cheap Tulips"));
}

#[tokio::test]
async fn test_cart_add_update_and_total() {
    let app = TestApp::start().await;
    app.mock_get("/products/p1", product_json("p1", "Red Roses", 24.9, "Seattle"))
        .await;

    let added = app.post_form("/cart/add", "product_id=p1&quantity=2", None).await;
    assert_eq!(added.status, StatusCode::SEE_OTHER);
    assert_eq!(added.location(), Some("/cart"));
    let cookie = added.session_cookie().unwrap();

    let cart = app.get("/cart", Some(&cookie)).await;
    assert_eq!(cart.status, StatusCode::OK);
    assert!(cart.body.contains("Red Roses"));
    assert!(cart.body.contains("$49.80"));

    app.post_form("/cart/update", "product_id=p1&quantity=3", Some(&cookie))
        .await;
    let cart = app.get("/cart", Some(&cookie)).await;
    assert!(cart.body.contains("$74.70"));

    app.post_form("/cart/update", "product_id=p1&quantity=0", Some(&cookie))
        .await;
    let cart = app.get("/cart", Some(&cookie)).await;
    assert!(!cart.body.contains("Red Roses"));
}

#[tokio::test]
async fn test_unknown_product_flashes_instead_of_failing() {
    let app = TestApp::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/api/products/ghost"))
        .respond_with(
            wiremock::ResponseTemplate::new(404).set_body_json(json!({"message": "Product not found"})),
        )
        .mount(&app.api)
        .await;

    let response = app.post_form("/cart/add", "product_id=ghost", None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let cookie = response.session_cookie().unwrap();

    let cart = app.get("/cart", Some(&cookie)).await;
    assert!(cart.body.contains("Product not found"));
}
