use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use portal_api::{AppState, AppStateInner, router};
use portal_auth::TokenService;
use portal_db::Stores;
use portal_db::players::NewPlayer;
use portal_db::sites::NewSite;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> (Router, AppState) {
    let state = Arc::new(AppStateInner {
        stores: Stores::open_in_memory().unwrap(),
        tokens: TokenService::new("test-secret", 30),
    });
    (router(state.clone()), state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json_auth(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn patch_auth(uri: &str, token: &str) -> Request<Body> {
    Request::patch(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn get_auth(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn register_and_login(app: &Router, login: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        post_json(
            "/api/v1/account/register",
            json!({
                "login": login,
                "password": "correct-horse",
                "email": format!("{login}@example.com"),
                "social_id": "1234567",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        app,
        post_json(
            "/api/v1/account/token",
            json!({ "login": login, "password": "correct-horse" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    (id, body["access_token"].as_str().unwrap().to_string())
}

fn seed_site(state: &AppState) -> String {
    state
        .stores
        .sites()
        .create(NewSite {
            name: "Test Site",
            slug: "test",
            initial_level: "1",
            max_level: "120",
            rates: None,
            facebook_url: None,
            facebook_enable: false,
            footer_info: None,
            footer_menu_enable: false,
            footer_info_enable: false,
            forum_url: None,
            last_online: false,
            is_active: true,
            maintenance_mode: false,
        })
        .unwrap()
        .id
}

#[tokio::test]
async fn health_reports_healthy() {
    let (app, _) = app();
    let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn register_token_me_round_trip() {
    let (app, _) = app();
    let (id, token) = register_and_login(&app, "alice").await;

    let (status, body) = send(&app, get_auth("/api/v1/account/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64().unwrap(), id);
    assert_eq!(body["login"], "alice");
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn protected_routes_reject_missing_and_garbage_tokens() {
    let (app, _) = app();

    let (status, body) = send(
        &app,
        Request::get("/api/v1/account/me").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "could not validate credentials");

    let resp = app
        .clone()
        .oneshot(get_auth("/api/v1/account/me", "not-a-jwt"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "Bearer");
}

#[tokio::test]
async fn content_mutation_requires_implementor_grant() {
    let (app, state) = app();
    let (id, token) = register_and_login(&app, "alice").await;
    let site_id = seed_site(&state);

    let payload = json!({
        "provider": "Mega",
        "size": "1.2 GB",
        "link": "https://example.com/client.zip",
        "category": "client",
        "site_id": site_id,
    });

    let (status, body) =
        send(&app, post_json_auth("/api/v1/game/downloads", &token, payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "insufficient authority");

    state.stores.grants().upsert(id, 5).unwrap();
    let (status, body) =
        send(&app, post_json_auth("/api/v1/game/downloads", &token, payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["provider"], "Mega");
    assert!(!body["published"].as_bool().unwrap());
}

#[tokio::test]
async fn ban_and_unban_are_admin_only_status_flips() {
    let (app, state) = app();
    let (admin_id, admin_token) = register_and_login(&app, "admin").await;
    let (target_id, _) = register_and_login(&app, "mallory").await;

    let ban_uri = format!("/api/v1/account/{target_id}/ban");
    let (status, body) = send(&app, patch_auth(&ban_uri, &admin_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "insufficient authority");

    state.stores.grants().upsert(admin_id, 5).unwrap();
    let (status, body) = send(&app, patch_auth(&ban_uri, &admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "BANNED");

    let unban_uri = format!("/api/v1/account/{target_id}/unban");
    let (status, body) = send(&app, patch_auth(&unban_uri, &admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn player_ranking_is_paginated() {
    let (app, state) = app();
    for (i, (name, level)) in [("DragonSlayer", 85), ("Foo", 10)].into_iter().enumerate() {
        state
            .stores
            .players()
            .create(NewPlayer {
                account_id: i as i64 + 1,
                name,
                job: 0,
                level,
                exp: 0,
            })
            .unwrap();
    }

    let (status, body) = send(
        &app,
        Request::get("/api/v1/game/players?page=1&per_page=1")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["has_next"], true);
    assert_eq!(body["has_prev"], false);
    assert_eq!(body["items"][0]["name"], "DragonSlayer");
}

#[tokio::test]
async fn unknown_download_is_404_with_detail() {
    let (app, state) = app();
    let (id, token) = register_and_login(&app, "alice").await;
    state.stores.grants().upsert(id, 5).unwrap();

    let (status, body) = send(&app, get_auth("/api/v1/game/downloads/999", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "download not found");
}

#[tokio::test]
async fn banned_account_cannot_edit_itself() {
    let (app, state) = app();
    let (id, token) = register_and_login(&app, "alice").await;
    state
        .stores
        .accounts()
        .set_status(id, portal_types::api::AccountStatus::Banned)
        .unwrap();

    let resp = app
        .clone()
        .oneshot(
            Request::put("/api/v1/account/me")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(json!({ "email": "new@example.com" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
