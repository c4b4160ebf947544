//! Managers only see and change their own stores and those stores' products.

use axum::http::StatusCode;
use bloomway_integration_tests::{TestApp, product_json};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn stocked(id: &str, name: &str, store: &str) -> Value {
    let mut product = product_json(id, name, 20.0, "Seattle");
    product["store"] = json!(store);
    product
}

/// A signed-in manager who owns store `s1`; `s2` belongs to someone else.
async fn manager_app() -> (TestApp, String) {
    let app = TestApp::start().await;
    let cookie = app.sign_in("manager").await;
    Mock::given(method("GET"))
        .and(path("/api/stores/my"))
        .and(header("authorization", "Bearer token-manager"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "s1", "name": "Pike Place", "city": "Seattle"}
        ])))
        .mount(&app.api)
        .await;
    app.mock_get(
        "/products",
        json!([
            stocked("own-roses", "Own roses", "s1"),
            stocked("other-tulips", "Other tulips", "s2"),
            product_json("loose-lilies", "Loose lilies", 15.0, "Seattle"),
        ]),
    )
    .await;
    app.mock_get("/categories", json!([{"_id": "bouquets", "name": "Bouquets"}]))
        .await;
    (app, cookie)
}

#[tokio::test]
async fn test_manager_lists_only_products_of_own_stores() {
    let (app, cookie) = manager_app().await;

    let response = app.get("/profile/products", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Own roses"));
    assert!(!response.body.contains("Other tulips"));
    assert!(!response.body.contains("Loose lilies"));
}

#[tokio::test]
async fn test_manager_cannot_open_or_delete_foreign_product() {
    let (app, cookie) = manager_app().await;

    let edit = app.get("/profile/products/other-tulips/edit", Some(&cookie)).await;
    assert_eq!(edit.status, StatusCode::NOT_FOUND);

    let delete = app
        .post_form("/profile/products/other-tulips/delete", "", Some(&cookie))
        .await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let own = app.get("/profile/products/own-roses/edit", Some(&cookie)).await;
    assert_eq!(own.status, StatusCode::OK);
}

#[tokio::test]
async fn test_manager_cannot_edit_foreign_store() {
    let (app, cookie) = manager_app().await;

    let foreign = app.get("/profile/stores/s2/edit", Some(&cookie)).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let own = app.get("/profile/stores/s1/edit", Some(&cookie)).await;
    assert_eq!(own.status, StatusCode::OK);
    assert!(own.body.contains("Pike Place"));
}
