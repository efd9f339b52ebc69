mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use common::TestState;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskvault::auth::AuthMiddleware;
use taskvault::routes;

macro_rules! build_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.accounts())
                .app_data($state.todos())
                .app_data($state.codec_data())
                .app_data($state.reconciler())
                .app_data($state.gateway_data())
                .app_data($state.config_data())
                .wrap(AuthMiddleware::new($state.codec.clone()))
                .service(routes::health::health)
                .configure(routes::config),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_todo_crud_roundtrip() {
    let state = TestState::new();
    let app = build_app!(state);
    let user = common::register_and_login(&app, "alice", "a@x.com", "Password123!").await;
    let auth = ("Authorization", format!("Bearer {}", user.token));

    // Create.
    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(auth.clone())
        .set_json(json!({ "title": "Water the plants", "description": "Balcony first" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    let todo_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["completed"], false);
    assert_eq!(created["user_id"].as_str().unwrap(), user.id.to_string());

    // List.
    let req = test::TestRequest::get()
        .uri("/todos")
        .append_header(auth.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Fetch by id.
    let req = test::TestRequest::get()
        .uri(&format!("/todos/{}", todo_id))
        .append_header(auth.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Update.
    let req = test::TestRequest::put()
        .uri(&format!("/todos/{}", todo_id))
        .append_header(auth.clone())
        .set_json(json!({
            "title": "Water the plants",
            "description": "Done already",
            "completed": true
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(updated["completed"], true);

    // Search by title substring.
    let req = test::TestRequest::get()
        .uri("/todos/search?keyword=plants")
        .append_header(auth.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let hits: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);

    // Delete, then the id is gone.
    let req = test::TestRequest::delete()
        .uri(&format!("/todos/{}", todo_id))
        .append_header(auth.clone())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri(&format!("/todos/{}", todo_id))
        .append_header(auth)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["code"], "TODO_NOT_FOUND");
}

#[actix_rt::test]
async fn test_todos_are_tenant_scoped() {
    let state = TestState::new();
    let app = build_app!(state);
    let alice = common::register_and_login(&app, "alice", "a@x.com", "Password123!").await;
    let bob = common::register_and_login(&app, "bob", "b@x.com", "Password123!").await;

    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(("Authorization", format!("Bearer {}", alice.token)))
        .set_json(json!({ "title": "Alice's secret plan" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let created: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    let todo_id = created["id"].as_str().unwrap().to_string();

    // Bob sees an empty list and cannot touch Alice's item.
    let req = test::TestRequest::get()
        .uri("/todos")
        .append_header(("Authorization", format!("Bearer {}", bob.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let listed: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert!(listed.as_array().unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/todos/{}", todo_id))
        .append_header(("Authorization", format!("Bearer {}", bob.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["code"], "ACCESS_DENIED");

    let req = test::TestRequest::delete()
        .uri(&format!("/todos/{}", todo_id))
        .append_header(("Authorization", format!("Bearer {}", bob.token)))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    // Bob's search never surfaces Alice's items either.
    let req = test::TestRequest::get()
        .uri("/todos/search?keyword=secret")
        .append_header(("Authorization", format!("Bearer {}", bob.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let hits: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert!(hits.as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_todo_requires_authentication() {
    let state = TestState::new();
    let app = build_app!(state);

    let req = test::TestRequest::post()
        .uri("/todos")
        .set_json(json!({ "title": "Anonymous todo" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["code"], "MISSING_TOKEN");
}

#[actix_rt::test]
async fn test_todo_validation() {
    let state = TestState::new();
    let app = build_app!(state);
    let user = common::register_and_login(&app, "carol", "c@x.com", "Password123!").await;

    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(("Authorization", format!("Bearer {}", user.token)))
        .set_json(json!({ "title": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(("Authorization", format!("Bearer {}", user.token)))
        .set_json(json!({ "title": "a".repeat(101) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_deleting_account_cascades_to_todos() {
    let state = TestState::new();
    let app = build_app!(state);
    let user = common::register_and_login(&app, "dora", "dora@x.com", "Password123!").await;

    let req = test::TestRequest::post()
        .uri("/todos")
        .append_header(("Authorization", format!("Bearer {}", user.token)))
        .set_json(json!({ "title": "Orphan-to-be" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::delete()
        .uri("/users/me")
        .append_header(("Authorization", format!("Bearer {}", user.token)))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    // A fresh account with the same email starts with a clean slate.
    let reborn = common::register_and_login(&app, "dora", "dora@x.com", "Password123!").await;
    let req = test::TestRequest::get()
        .uri("/todos")
        .append_header(("Authorization", format!("Bearer {}", reborn.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let listed: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert!(listed.as_array().unwrap().is_empty());
}
