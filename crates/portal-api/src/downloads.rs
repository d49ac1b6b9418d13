use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use portal_db::downloads::{DownloadChanges, DownloadFilter, NewDownload};
use portal_db::models::{DownloadRow, parse_timestamp};
use portal_types::api::{DownloadCreateRequest, DownloadResponse, DownloadUpdateRequest};
use portal_types::pagination::{Paginated, paginate};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::{CurrentAccount, require_admin};
use crate::page_params;

fn to_response(row: DownloadRow) -> DownloadResponse {
    DownloadResponse {
        id: row.id,
        provider: row.provider,
        size: row.size,
        link: row.link,
        category: row.category,
        published: row.published,
        site_id: row.site_id,
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub provider: Option<String>,
    pub site_id: Option<String>,
    #[serde(default)]
    pub published_only: bool,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Paginated<DownloadResponse>>> {
    let params = page_params(q.page, q.per_page);
    let filter = DownloadFilter {
        category: q.category.as_deref(),
        provider: q.provider.as_deref(),
        site_id: q.site_id.as_deref(),
        published_only: q.published_only,
        search: q.search.as_deref(),
    };
    let (rows, total) = state.stores.downloads().list(filter, params)?;
    let window = paginate(total, params);

    let items = rows.into_iter().map(to_response).collect();
    Ok(Json(Paginated::new(items, window)))
}

pub async fn categories(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let categories = state.stores.downloads().categories()?;
    Ok(Json(json!({ "categories": categories })))
}

pub async fn providers(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let providers = state.stores.downloads().providers()?;
    Ok(Json(json!({ "providers": providers })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DownloadResponse>> {
    let row = state.stores.downloads().get(id)?;
    Ok(Json(to_response(row)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Json(req): Json<DownloadCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&state, current.id)?;

    let row = state.stores.downloads().create(NewDownload {
        provider: &req.provider,
        size: &req.size,
        link: &req.link,
        category: &req.category,
        published: req.published,
        site_id: &req.site_id,
    })?;
    info!(download_id = row.id, by = current.id, "download created");
    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<i64>,
    Json(req): Json<DownloadUpdateRequest>,
) -> ApiResult<Json<DownloadResponse>> {
    require_admin(&state, current.id)?;

    let row = state.stores.downloads().update(
        id,
        DownloadChanges {
            provider: req.provider.as_deref(),
            size: req.size.as_deref(),
            link: req.link.as_deref(),
            category: req.category.as_deref(),
            published: req.published,
            site_id: req.site_id.as_deref(),
        },
    )?;
    Ok(Json(to_response(row)))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_admin(&state, current.id)?;
    state.stores.downloads().delete(id)?;
    info!(download_id = id, by = current.id, "download deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn publish(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DownloadResponse>> {
    require_admin(&state, current.id)?;
    let row = state.stores.downloads().set_published(id, true)?;
    Ok(Json(to_response(row)))
}

pub async fn unpublish(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DownloadResponse>> {
    require_admin(&state, current.id)?;
    let row = state.stores.downloads().set_published(id, false)?;
    Ok(Json(to_response(row)))
}
