use axum::Json;
use axum::extract::{Query, State};
use portal_types::api::{GuildResponse, PlayerResponse};
use portal_types::pagination::{Paginated, paginate};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiResult;
use crate::page_params;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Public ranking, highest level first.
pub async fn list_players(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Paginated<PlayerResponse>>> {
    let params = page_params(q.page, q.per_page);
    let (rows, total) = state.stores.players().list(params)?;
    let window = paginate(total, params);

    let items = rows
        .into_iter()
        .map(|p| PlayerResponse {
            account_id: p.account_id,
            name: p.name,
            job: p.job,
            level: p.level,
            exp: p.exp,
        })
        .collect();
    Ok(Json(Paginated::new(items, window)))
}

pub async fn list_guilds(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Paginated<GuildResponse>>> {
    let params = page_params(q.page, q.per_page);
    let (rows, total) = state.stores.guilds().list(params)?;
    let window = paginate(total, params);

    let items = rows
        .into_iter()
        .map(|g| GuildResponse {
            id: g.id,
            name: g.name,
            master: g.master,
            level: g.level,
            exp: g.exp,
            skill_point: g.skill_point,
            skill: g.skill,
            win: g.win,
            draw: g.draw,
            loss: g.loss,
            ladder_point: g.ladder_point,
            gold: g.gold,
        })
        .collect();
    Ok(Json(Paginated::new(items, window)))
}
