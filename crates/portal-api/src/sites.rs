use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use portal_db::models::{SiteRow, parse_timestamp};
use portal_db::sites::{NewSite, SiteChanges};
use portal_types::api::{SiteCreateRequest, SiteResponse, SiteUpdateRequest};
use portal_types::pagination::{Paginated, paginate};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::{CurrentAccount, require_admin};
use crate::page_params;

fn to_response(row: SiteRow) -> SiteResponse {
    SiteResponse {
        id: row.id,
        name: row.name,
        slug: row.slug,
        initial_level: row.initial_level,
        max_level: row.max_level,
        rates: row.rates,
        facebook_url: row.facebook_url,
        facebook_enable: row.facebook_enable,
        footer_info: row.footer_info,
        footer_menu_enable: row.footer_menu_enable,
        footer_info_enable: row.footer_info_enable,
        forum_url: row.forum_url,
        last_online: row.last_online,
        is_active: row.is_active,
        maintenance_mode: row.maintenance_mode,
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub active_only: bool,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Paginated<SiteResponse>>> {
    let params = page_params(q.page, q.per_page);
    let (rows, total) = state.stores.sites().list(q.active_only, q.search.as_deref(), params)?;
    let window = paginate(total, params);

    let items = rows.into_iter().map(to_response).collect();
    Ok(Json(Paginated::new(items, window)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SiteResponse>> {
    let row = state.stores.sites().get(&id)?;
    Ok(Json(to_response(row)))
}

pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<SiteResponse>> {
    let row = state.stores.sites().get_by_slug(&slug)?;
    Ok(Json(to_response(row)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Json(req): Json<SiteCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&state, current.id)?;

    let row = state.stores.sites().create(NewSite {
        name: &req.name,
        slug: &req.slug,
        initial_level: &req.initial_level,
        max_level: &req.max_level,
        rates: req.rates.as_deref(),
        facebook_url: req.facebook_url.as_deref(),
        facebook_enable: req.facebook_enable,
        footer_info: req.footer_info.as_deref(),
        footer_menu_enable: req.footer_menu_enable,
        footer_info_enable: req.footer_info_enable,
        forum_url: req.forum_url.as_deref(),
        last_online: req.last_online,
        is_active: req.is_active,
        maintenance_mode: req.maintenance_mode,
    })?;
    info!(site_id = %row.id, slug = %row.slug, by = current.id, "site created");
    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(req): Json<SiteUpdateRequest>,
) -> ApiResult<Json<SiteResponse>> {
    require_admin(&state, current.id)?;

    let row = state.stores.sites().update(
        &id,
        SiteChanges {
            name: req.name.as_deref(),
            slug: req.slug.as_deref(),
            initial_level: req.initial_level.as_deref(),
            max_level: req.max_level.as_deref(),
            rates: req.rates.as_deref(),
            facebook_url: req.facebook_url.as_deref(),
            facebook_enable: req.facebook_enable,
            footer_info: req.footer_info.as_deref(),
            footer_menu_enable: req.footer_menu_enable,
            footer_info_enable: req.footer_info_enable,
            forum_url: req.forum_url.as_deref(),
            last_online: req.last_online,
            is_active: req.is_active,
            maintenance_mode: req.maintenance_mode,
        },
    )?;
    Ok(Json(to_response(row)))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_admin(&state, current.id)?;
    state.stores.sites().delete(&id)?;
    info!(site_id = %id, by = current.id, "site deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> ApiResult<Json<SiteResponse>> {
    set_active(state, current, id, true).await
}

pub async fn deactivate(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> ApiResult<Json<SiteResponse>> {
    set_active(state, current, id, false).await
}

pub async fn enable_maintenance(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> ApiResult<Json<SiteResponse>> {
    set_maintenance(state, current, id, true).await
}

pub async fn disable_maintenance(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> ApiResult<Json<SiteResponse>> {
    set_maintenance(state, current, id, false).await
}

async fn set_active(
    state: AppState,
    current: CurrentAccount,
    id: String,
    active: bool,
) -> ApiResult<Json<SiteResponse>> {
    require_admin(&state, current.id)?;
    let row = state.stores.sites().set_active(&id, active)?;
    info!(site_id = %id, active, by = current.id, "site active flag changed");
    Ok(Json(to_response(row)))
}

async fn set_maintenance(
    state: AppState,
    current: CurrentAccount,
    id: String,
    maintenance: bool,
) -> ApiResult<Json<SiteResponse>> {
    require_admin(&state, current.id)?;
    let row = state.stores.sites().set_maintenance(&id, maintenance)?;
    info!(site_id = %id, maintenance, by = current.id, "site maintenance flag changed");
    Ok(Json(to_response(row)))
}
