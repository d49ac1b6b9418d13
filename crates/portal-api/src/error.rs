use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use portal_types::{AuthError, Error};
use serde_json::json;
use tracing::{debug, error};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Wire-level mapping of the typed error taxonomy. This is the only
/// place a portal error becomes an HTTP status.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError(Error::Auth(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            Error::Auth(AuthError::Forbidden) => {
                (StatusCode::FORBIDDEN, "insufficient authority".to_string())
            }
            // Expired vs malformed stays in the logs only; the client
            // just learns the credentials did not validate.
            Error::Auth(auth) => {
                debug!("authentication rejected: {auth}");
                (StatusCode::UNAUTHORIZED, "could not validate credentials".to_string())
            }
            Error::Configuration(msg) | Error::Storage(msg) => {
                error!("request failed: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        let body = Json(json!({ "detail": detail }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
