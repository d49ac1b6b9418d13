pub mod account;
pub mod downloads;
pub mod error;
pub mod game;
pub mod images;
pub mod middleware;
pub mod pages;
pub mod sites;

use std::sync::Arc;

use axum::routing::{get, patch, post, put};
use axum::{Json, Router, middleware as axum_middleware};
use portal_auth::TokenService;
use portal_db::Stores;
use portal_types::pagination::PageParams;

use crate::middleware::require_auth;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub stores: Stores,
    pub tokens: TokenService,
}

/// Builds the full `/api/v1` surface. Everything under the protected
/// router requires a valid bearer token; admin checks are composed
/// explicitly inside the handlers that mutate content.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/account/register", post(account::register))
        .route("/account/token", post(account::token))
        .route("/game/players", get(game::list_players))
        .route("/game/guilds", get(game::list_guilds))
        .route("/game/downloads", get(downloads::list))
        .route("/game/downloads/categories", get(downloads::categories))
        .route("/game/downloads/providers", get(downloads::providers))
        .route("/game/sites", get(sites::list))
        .route("/game/sites/{id}", get(sites::get))
        .route("/game/sites/slug/{slug}", get(sites::get_by_slug))
        .route("/game/pages", get(pages::list))
        .route("/game/pages/{id}", get(pages::get))
        .route("/game/pages/slug/{slug}", get(pages::get_by_slug))
        .route("/game/images", get(images::list))
        .route("/game/images/{id}", get(images::get))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/account/me", get(account::me).put(account::update_me))
        .route("/account/me/password", put(account::update_password))
        .route("/account/me/players", get(account::my_players))
        .route("/account/me/is_admin", get(account::is_admin))
        .route("/account/{id}/ban", patch(account::ban))
        .route("/account/{id}/unban", patch(account::unban))
        .route("/game/downloads", post(downloads::create))
        .route(
            "/game/downloads/{id}",
            get(downloads::get).put(downloads::update).delete(downloads::remove),
        )
        .route("/game/downloads/{id}/publish", patch(downloads::publish))
        .route("/game/downloads/{id}/unpublish", patch(downloads::unpublish))
        .route("/game/sites", post(sites::create))
        .route("/game/sites/{id}", put(sites::update).delete(sites::remove))
        .route("/game/sites/{id}/activate", patch(sites::activate))
        .route("/game/sites/{id}/deactivate", patch(sites::deactivate))
        .route("/game/sites/{id}/maintenance/enable", patch(sites::enable_maintenance))
        .route("/game/sites/{id}/maintenance/disable", patch(sites::disable_maintenance))
        .route("/game/pages", post(pages::create))
        .route("/game/pages/{id}", put(pages::update).delete(pages::remove))
        .route("/game/pages/{id}/publish", patch(pages::publish))
        .route("/game/pages/{id}/unpublish", patch(pages::unpublish))
        .route("/game/images", post(images::create))
        .route("/game/images/{id}", put(images::update).delete(images::remove))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let api = Router::new().merge(public).merge(protected);

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy"}))
}

/// Query structs keep page/per_page as plain optional fields; flattening
/// a typed struct into the query string does not deserialize cleanly.
pub(crate) fn page_params(page: Option<u32>, per_page: Option<u32>) -> PageParams {
    PageParams::new(
        page.unwrap_or(1),
        per_page.unwrap_or(portal_types::pagination::DEFAULT_PER_PAGE),
    )
}
