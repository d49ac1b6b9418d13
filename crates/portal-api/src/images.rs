use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use portal_db::images::{ImageChanges, ImageFilter, NewImage};
use portal_db::models::{ImageRow, parse_timestamp};
use portal_types::api::{ImageCreateRequest, ImageResponse, ImageType, ImageUpdateRequest};
use portal_types::pagination::{Paginated, paginate};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::{CurrentAccount, require_admin};
use crate::page_params;

fn to_response(row: ImageRow) -> ImageResponse {
    ImageResponse {
        id: row.id,
        name: row.name,
        path: row.path,
        // Stored values only ever come from the typed request path.
        image_type: ImageType::parse(&row.image_type).unwrap_or(ImageType::Logo),
        alt_text: row.alt_text,
        file_size: row.file_size,
        site_id: row.site_id,
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub site_id: Option<String>,
    pub image_type: Option<ImageType>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Paginated<ImageResponse>>> {
    let params = page_params(q.page, q.per_page);
    let filter = ImageFilter {
        site_id: q.site_id.as_deref(),
        image_type: q.image_type.map(ImageType::as_str),
        search: q.search.as_deref(),
    };
    let (rows, total) = state.stores.images().list(filter, params)?;
    let window = paginate(total, params);

    let items = rows.into_iter().map(to_response).collect();
    Ok(Json(Paginated::new(items, window)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ImageResponse>> {
    let row = state.stores.images().get(id)?;
    Ok(Json(to_response(row)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Json(req): Json<ImageCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    require_admin(&state, current.id)?;

    let row = state.stores.images().create(NewImage {
        name: &req.name,
        path: &req.path,
        image_type: req.image_type.as_str(),
        alt_text: req.alt_text.as_deref(),
        file_size: req.file_size,
        site_id: &req.site_id,
    })?;
    info!(image_id = row.id, by = current.id, "image created");
    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<i64>,
    Json(req): Json<ImageUpdateRequest>,
) -> ApiResult<Json<ImageResponse>> {
    require_admin(&state, current.id)?;

    let row = state.stores.images().update(
        id,
        ImageChanges {
            name: req.name.as_deref(),
            path: req.path.as_deref(),
            image_type: req.image_type.map(ImageType::as_str),
            alt_text: req.alt_text.as_deref(),
            file_size: req.file_size,
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
    state.stores.images().delete(id)?;
    info!(image_id = id, by = current.id, "image deleted");
    Ok(StatusCode::NO_CONTENT)
}
