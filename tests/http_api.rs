use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use session_cart::{AppState, Product, ProductSize, build_app, store::MemoryStore};
use tower::ServiceExt;
use uuid::Uuid;

async fn app_with_catalog() -> (Router, Product, ProductSize) {
    let store = Arc::new(MemoryStore::new());
    let product = Product {
        id: Uuid::new_v4(),
        name: "Wool Beanie".into(),
        price: Some(Decimal::new(1500, 2)),
    };
    let size = ProductSize::new(
        Uuid::new_v4(),
        product.id,
        Some("One Size".into()),
        Some(Decimal::new(1000, 2)),
    );
    store.insert_product(product.clone()).await;
    store.insert_product_size(size.clone()).await;

    (build_app(AppState::memory(store)), product, size)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    session: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session) = session {
        builder = builder.header("x-session-key", session);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

async fn add_item(
    app: &Router,
    session: &str,
    payload: Value,
) -> anyhow::Result<(StatusCode, Value)> {
    send(app, Method::POST, "/api/cart/items", Some(session), Some(payload)).await
}

#[tokio::test]
async fn add_update_and_remove_through_http() -> anyhow::Result<()> {
    let (app, product, size) = app_with_catalog().await;
    let payload = json!({ "product_id": product.id, "product_size_id": size.id, "quantity": 2 });

    let (status, body) = add_item(&app, "web-1", payload).await?;
    assert_eq!(status, StatusCode::OK);
    let item_id = body["data"]["item"]["id"].as_str().expect("item id").to_string();

    let payload = json!({ "product_id": product.id, "product_size_id": size.id, "quantity": 3 });
    let (_, body) = add_item(&app, "web-1", payload).await?;
    assert_eq!(body["data"]["item"]["id"], item_id.as_str());
    assert_eq!(body["data"]["item"]["quantity"], 5);

    let (status, body) = send(&app, Method::GET, "/api/cart", Some("web-1"), None).await?;
    assert_eq!(status, StatusCode::OK);
    let cart = &body["data"];
    assert_eq!(cart["total_items"], 5);
    assert_eq!(cart["subtotal"], "50.00");
    assert_eq!(cart["items"][0]["label"], "Wool Beanie - One Size x 5");
    assert_eq!(cart["items"][0]["total_price"], "50.00");

    let uri = format!("/api/cart/items/{item_id}");
    let zero = json!({ "quantity": 0 });
    let (status, body) = send(&app, Method::PATCH, &uri, Some("web-1"), Some(zero)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_items"], 0);
    assert_eq!(body["data"]["subtotal"], "0.00");

    let (status, _) = send(&app, Method::DELETE, &uri, Some("web-1"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn quantity_defaults_to_one() -> anyhow::Result<()> {
    let (app, product, size) = app_with_catalog().await;
    let payload = json!({ "product_id": product.id, "product_size_id": size.id });

    let (status, body) = add_item(&app, "web-2", payload).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item"]["quantity"], 1);
    assert_eq!(body["data"]["cart"]["subtotal"], "10.00");
    Ok(())
}

#[tokio::test]
async fn carts_are_scoped_to_session_key() -> anyhow::Result<()> {
    let (app, product, size) = app_with_catalog().await;
    let payload = json!({ "product_id": product.id, "product_size_id": size.id, "quantity": 4 });
    add_item(&app, "alice", payload).await?;

    let (_, body) = send(&app, Method::GET, "/api/cart", Some("bob"), None).await?;
    assert_eq!(body["data"]["total_items"], 0);
    assert_eq!(body["data"]["items"], json!([]));

    let (_, body) = send(&app, Method::GET, "/api/cart", Some("alice"), None).await?;
    assert_eq!(body["data"]["total_items"], 4);
    Ok(())
}

#[tokio::test]
async fn rejects_bad_requests() -> anyhow::Result<()> {
    let (app, product, size) = app_with_catalog().await;

    let (status, _) = send(&app, Method::GET, "/api/cart", None, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let payload = json!({ "product_id": product.id, "product_size_id": size.id, "quantity": 0 });
    let (status, _) = add_item(&app, "web-3", payload).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let payload = json!({ "product_id": Uuid::new_v4(), "product_size_id": size.id });
    let (status, body) = add_item(&app, "web-3", payload).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["error"], "Bad Request product not found");
    Ok(())
}

#[tokio::test]
async fn clear_and_delete_cart() -> anyhow::Result<()> {
    let (app, product, size) = app_with_catalog().await;
    let payload = json!({ "product_id": product.id, "product_size_id": size.id, "quantity": 2 });
    add_item(&app, "web-4", payload.clone()).await?;

    let (status, body) = send(&app, Method::DELETE, "/api/cart/items", Some("web-4"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_items"], 0);

    add_item(&app, "web-4", payload).await?;
    let (status, _) = send(&app, Method::DELETE, "/api/cart", Some("web-4"), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, "/api/cart", Some("web-4"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
