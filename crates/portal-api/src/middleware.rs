use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use portal_auth::require_authority;
use portal_types::api::AccountStatus;
use portal_types::authority::Authority;
use portal_types::{AuthError, Error};

use crate::AppState;
use crate::error::{ApiError, ApiResult};

/// The authenticated account for this request, resolved once in the
/// middleware and passed down as an extension.
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub id: i64,
    pub login: String,
    pub status: AccountStatus,
}

/// Extracts and verifies the bearer token, then loads the subject
/// account from the account store.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::Malformed)?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::Malformed)?;

    let account_id = state.tokens.verify(token)?;

    // A token whose subject no longer exists is indistinguishable from
    // bad credentials.
    let row = state
        .stores
        .accounts()
        .get(account_id)
        .map_err(|_| Error::Auth(AuthError::InvalidCredentials))?;

    let current = CurrentAccount {
        id: row.id,
        login: row.login,
        status: AccountStatus::parse(&row.status).unwrap_or(AccountStatus::Banned),
    };
    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}

/// Gate for endpoints that act on the account itself.
pub fn require_active(current: &CurrentAccount) -> ApiResult<()> {
    if current.status != AccountStatus::Ok {
        return Err(Error::validation("account is inactive").into());
    }
    Ok(())
}

/// Admin gate for mutating content endpoints. Composed explicitly at
/// each handler rather than baked into the router.
pub fn require_admin(state: &AppState, account_id: i64) -> ApiResult<()> {
    require_authority(&state.stores.grants(), account_id, Authority::Implementor)?;
    Ok(())
}
