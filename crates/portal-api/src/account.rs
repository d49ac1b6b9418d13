use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use portal_auth::Credentials;
use portal_auth::credentials::valid_social_id;
use portal_db::models::AccountRow;
use portal_types::api::{
    AccountResponse, AccountStatus, AccountUpdateRequest, IsAdminResponse, PasswordUpdateRequest,
    PlayerListResponse, PlayerResponse, RegisterRequest, TokenRequest, TokenResponse,
};
use portal_types::Error;
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::{CurrentAccount, require_active, require_admin};

fn to_response(row: AccountRow) -> AccountResponse {
    AccountResponse {
        id: row.id,
        login: row.login,
        email: row.email,
        social_id: row.social_id,
        // Fail closed on an unknown status value.
        status: AccountStatus::parse(&row.status).unwrap_or(AccountStatus::Banned),
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let creds = Credentials::new(&state.stores, &state.tokens);
    let account = creds.register(&req.login, &req.password, &req.email, &req.social_id)?;
    info!(account_id = account.id, "account registered");
    Ok((StatusCode::CREATED, Json(to_response(account))))
}

pub async fn token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let creds = Credentials::new(&state.stores, &state.tokens);
    let access_token = creds.authenticate(&req.login, &req.password)?;
    Ok(Json(TokenResponse { access_token, token_type: "bearer".to_string() }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
) -> ApiResult<Json<AccountResponse>> {
    let row = state.stores.accounts().get(current.id)?;
    Ok(Json(to_response(row)))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Json(req): Json<AccountUpdateRequest>,
) -> ApiResult<Json<AccountResponse>> {
    require_active(&current)?;

    if let Some(social_id) = req.social_id.as_deref() {
        if !valid_social_id(social_id) {
            return Err(Error::validation("social_id must be exactly 7 digits").into());
        }
    }

    let row = state
        .stores
        .accounts()
        .update(current.id, req.email.as_deref(), req.social_id.as_deref())?;
    Ok(Json(to_response(row)))
}

pub async fn update_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Json(req): Json<PasswordUpdateRequest>,
) -> ApiResult<Json<AccountResponse>> {
    require_active(&current)?;

    let creds = Credentials::new(&state.stores, &state.tokens);
    creds.change_password(current.id, &req.old_password, &req.new_password)?;

    let row = state.stores.accounts().get(current.id)?;
    Ok(Json(to_response(row)))
}

/// Characters tied to this account, ranked by level. The player store is
/// separate from the account store; the link is by convention only.
pub async fn my_players(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
) -> ApiResult<Json<PlayerListResponse>> {
    require_active(&current)?;

    let players = state
        .stores
        .players()
        .list_by_account(current.id)?
        .into_iter()
        .map(|p| PlayerResponse {
            account_id: p.account_id,
            name: p.name,
            job: p.job,
            level: p.level,
            exp: p.exp,
        })
        .collect();
    Ok(Json(PlayerListResponse { players }))
}

pub async fn is_admin(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
) -> ApiResult<Json<IsAdminResponse>> {
    require_admin(&state, current.id)?;
    let authority_level = state.stores.grants().authority_level(current.id)?;
    Ok(Json(IsAdminResponse { account_id: current.id, authority_level }))
}

pub async fn ban(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AccountResponse>> {
    set_status(state, current, id, AccountStatus::Banned).await
}

pub async fn unban(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AccountResponse>> {
    set_status(state, current, id, AccountStatus::Ok).await
}

async fn set_status(
    state: AppState,
    current: CurrentAccount,
    id: i64,
    status: AccountStatus,
) -> ApiResult<Json<AccountResponse>> {
    require_admin(&state, current.id)?;
    let row = state.stores.accounts().set_status(id, status)?;
    info!(account_id = id, status = status.as_str(), by = current.id, "account status changed");
    Ok(Json(to_response(row)))
}
