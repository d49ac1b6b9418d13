use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use portal_db::models::{PageRow, parse_timestamp};
use portal_db::pages::{NewPage, PageChanges, PageFilter};
use portal_types::api::{PageCreateRequest, PageResponse, PageUpdateRequest};
use portal_types::pagination::{Paginated, paginate};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::{CurrentAccount, require_admin};
use crate::page_params;

fn to_response(row: PageRow) -> PageResponse {
    PageResponse {
        id: row.id,
        slug: row.slug,
        title: row.title,
        content: row.content,
        published: row.published,
        meta_description: row.meta_description,
        meta_keywords: row.meta_keywords,
        site_id: row.site_id,
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub site_id: Option<String>,
    pub published: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Paginated<PageResponse>>> {
    let params = page_params(q.page, q.per_page);
    let filter = PageFilter {
        site_id: q.site_id.as_deref(),
        published: q.published,
        search: q.search.as_deref(),
    };
    let (rows, total) = state.stores.pages().list(filter, params)?;
    let window = paginate(total, params);

    let items = rows.into_iter().map(to_response).collect();
    Ok(Json(Paginated::new(items, window)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PageResponse>> {
    let row = state.stores.pages().get(id)?;
    Ok(Json(to_response(row)))
}

pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<PageResponse>> {
    let row = state.stores.pages().get_by_slug(&slug)?;
    Ok(Json(to_response(row)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Json(req): Json<PageCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&state, current.id)?;

    let row = state.stores.pages().create(NewPage {
        slug: &req.slug,
        title: &req.title,
        content: &req.content,
        published: req.published,
        meta_description: req.meta_description.as_deref(),
        meta_keywords: req.meta_keywords.as_deref(),
        site_id: &req.site_id,
    })?;
    info!(page_id = row.id, slug = %row.slug, by = current.id, "page created");
    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<i64>,
    Json(req): Json<PageUpdateRequest>,
) -> ApiResult<Json<PageResponse>> {
    require_admin(&state, current.id)?;

    let row = state.stores.pages().update(
        id,
        PageChanges {
            slug: req.slug.as_deref(),
            title: req.title.as_deref(),
            content: req.content.as_deref(),
            published: req.published,
            meta_description: req.meta_description.as_deref(),
            meta_keywords: req.meta_keywords.as_deref(),
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
    state.stores.pages().delete(id)?;
    info!(page_id = id, by = current.id, "page deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn publish(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PageResponse>> {
    require_admin(&state, current.id)?;
    let row = state.stores.pages().set_published(id, true)?;
    Ok(Json(to_response(row)))
}

pub async fn unpublish(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PageResponse>> {
    require_admin(&state, current.id)?;
    let row = state.stores.pages().set_published(id, false)?;
    Ok(Json(to_response(row)))
}
