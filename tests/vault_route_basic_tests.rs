mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use viewvault::vault::MediaType;
use viewvault::{ViewVaultState, viewvault_router};

const KEY: &str = "pwd";

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", KEY);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

async fn app(tag: &str) -> (Router, std::path::PathBuf) {
    let (database_url, temp_path) = common::temp_database(tag);
    let db = viewvault::db::spawn(&database_url).await;
    let metadata = Arc::new(common::FakeMetadata::new(vec![
        (
            MediaType::Movies,
            common::movie(949, "Heat", "1995", &["Netflix"]),
        ),
        (
            MediaType::Movies,
            common::movie(348, "Alien", "1979", &["Hulu"]),
        ),
    ]));
    let state = ViewVaultState::new(db, metadata, Arc::from(KEY)).with_import_body_limit(64);
    (viewvault_router(state), temp_path)
}

#[tokio::test]
async fn routes_require_the_service_key() {
    let (app, temp_path) = app("route-auth").await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/users/u1/vaults")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/users/u1/vaults")
                .header("authorization", "Bearer wrong")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/users/u1/vaults?key={KEY}"))
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let _ = tokio::fs::remove_file(&temp_path).await;
}

#[tokio::test]
async fn item_lifecycle_over_http() {
    let (app, temp_path) = app("route-items").await;

    // Listing creates the default vault lazily.
    let (status, body) = send(&app, "GET", "/users/u1/vaults/movies/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["vault"]["isDefault"], json!(true));
    assert_eq!(body["vault"]["type"], json!("movies"));

    let (status, heat) = send(
        &app,
        "POST",
        "/users/u1/vaults/movies/items",
        Some(json!({ "externalId": 949 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(heat["title"], json!("Heat"));
    let heat_id = heat["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/users/u1/vaults/movies/items",
        Some(json!({ "externalId": 949 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "POST",
        "/users/u1/vaults/movies/items",
        Some(json!({ "externalId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));

    let (status, alien) = send(
        &app,
        "POST",
        "/users/u1/vaults/movies/items",
        Some(json!({ "externalId": 348, "watched": true, "userRating": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(alien["watched"], json!(true));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/users/u1/vaults/movies/items/{heat_id}/toggle-watched"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["watched"], json!(true));

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/users/u1/vaults/movies/items/{heat_id}/rating"),
        Some(json!({ "userRating": 11 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_REQUEST"));

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/users/u1/vaults/movies/items/{heat_id}/rating"),
        Some(json!({ "userRating": 9.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userRating"], json!(9.5));

    // Explicit provider filter and sort.
    let (status, body) = send(
        &app,
        "GET",
        "/users/u1/vaults/movies/items?providers=Hulu&sort=release_year",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["title"], json!("Alien"));

    let (status, _) = send(
        &app,
        "GET",
        "/users/u1/vaults/movies/items?sort=popularity",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Saved providers apply when the query omits them.
    let (status, _) = send(
        &app,
        "PUT",
        "/users/u1/settings/movies",
        Some(json!({
            "providers": [" Netflix ", "Netflix"],
            "watchSites": [{ "name": "Example", "url": "https://example.test/s/{query}", "spaceFormat": "-" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, settings) = send(&app, "GET", "/users/u1/settings/movies", None).await;
    assert_eq!(settings["providers"], json!(["Netflix"]));

    let (_, body) = send(&app, "GET", "/users/u1/vaults/movies/items", None).await;
    assert_eq!(body["providers"], json!(["Netflix"]));
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["title"], json!("Heat"));

    let (status, links) = send(
        &app,
        "GET",
        &format!("/users/u1/vaults/movies/items/{heat_id}/watch-links"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        links,
        json!([{ "name": "Example", "url": "https://example.test/s/Heat" }])
    );

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/users/u1/vaults/movies/items/{heat_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/users/u1/vaults/movies/items/{heat_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "DELETE", "/users/u1/vaults/movies/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], json!(1));

    let _ = tokio::fs::remove_file(&temp_path).await;
}

#[tokio::test]
async fn vault_management_and_transfer_over_http() {
    let (app, temp_path) = app("route-vaults").await;

    let (status, body) = send(&app, "GET", "/users/u1/vaults?type=movies", None).await;
    assert_eq!(status, StatusCode::OK);
    let default_id = body[0]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/users/u1/vaults",
        Some(json!({ "name": "   ", "type": "movies" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, custom) = send(
        &app,
        "POST",
        "/users/u1/vaults",
        Some(json!({ "name": "Weekend", "type": "movies" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let custom_id = custom["id"].as_i64().unwrap();

    let import = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/users/u1/vaults/{custom_id}/import"))
                .header("x-api-key", KEY)
                .header("content-type", "text/plain")
                .body(Body::from("Heat (1995) [x] {8}\nZardoz\n"))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(import.status(), StatusCode::OK);
    let report: Value =
        serde_json::from_slice(&to_bytes(import.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(report["added"], json!(1));
    assert_eq!(report["notFound"], json!(1));
    assert_eq!(report["notFoundTitles"], json!(["Zardoz"]));

    let too_big = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/users/u1/vaults/{custom_id}/import"))
                .header("x-api-key", KEY)
                .body(Body::from("Heat\n".repeat(100)))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(too_big.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let (status, exported) = send(
        &app,
        "GET",
        &format!("/users/u1/vaults/{custom_id}/export"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exported, json!("Heat (1995) [x] {8}\n"));

    let (status, report) = send(
        &app,
        "POST",
        &format!("/users/u1/vaults/{custom_id}/refresh"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report, json!({ "updated": 1, "failed": 0 }));

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/users/u1/vaults/{default_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_REQUEST"));

    let (status, _) = send(&app, "DELETE", &format!("/users/u1/vaults/{custom_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(
        &app,
        "GET",
        &format!("/users/u1/vaults/{custom_id}/items"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, hits) = send(&app, "GET", "/search?type=movies&query=alien", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits[0]["externalId"], json!(348));

    let (status, _) = send(&app, "GET", "/search?type=books&query=alien", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let _ = tokio::fs::remove_file(&temp_path).await;
}
