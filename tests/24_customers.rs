mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn reads_require_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    server.seed_customer("Jane Doe").await;

    let res = server.client.get(server.url("/api/customers")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .get(server.url("/api/customers"))
        .header("x-auth-token", server.token(false))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn create_defaults_gold_flag() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/api/customers"))
        .header("x-auth-token", server.token(false))
        .json(&json!({"name": "  John Smith  ", "phone": "12345"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["name"], "John Smith");
    assert_eq!(body["data"]["isGold"], false);

    let res = server
        .client
        .post(server.url("/api/customers"))
        .header("x-auth-token", server.token(false))
        .json(&json!({"name": "John Smith", "phone": "123"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["phone"].is_string());
    Ok(())
}

#[tokio::test]
async fn update_does_not_touch_rental_snapshots() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let customer = server.seed_customer("Jane Doe").await;
    let movie = server.seed_movie("Terminator", 2, 1).await;
    let rental = server.seed_rental(&customer, &movie, chrono::Utc::now()).await;

    let res = server
        .client
        .put(server.url(&format!("/api/customers/{}", customer.id)))
        .header("x-auth-token", server.token(false))
        .json(&json!({"name": "Jane Roe", "phone": "99999", "isGold": true}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["isGold"], true);

    let stored = server.store.find_rental(rental.id).await?.unwrap();
    assert_eq!(stored.customer.name, "Jane Doe");
    assert_eq!(stored.customer.phone, "555-0100");
    Ok(())
}

#[tokio::test]
async fn delete_requires_admin() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let customer = server.seed_customer("Jane Doe").await;
    let path = format!("/api/customers/{}", customer.id);

    let res = server
        .client
        .delete(server.url(&path))
        .header("x-auth-token", server.token(false))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .delete(server.url(&path))
        .header("x-auth-token", server.token(true))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(server.store.find_customer(customer.id).await?.is_none());
    Ok(())
}
