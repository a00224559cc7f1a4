use api_types::ErrorBody;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::{EngineError, ErrorKind};

pub use access::{Action, AllowAll, Authorizer, Tenant, ViewerList};
pub use export::trial_balance_csv;
pub use server::{ServerState, router, run, run_with_listener};

mod access;
mod accounts;
mod auxiliaries;
mod export;
mod extract;
mod reports;
mod server;
mod templates;
mod views;
mod vouchers;

pub enum ServerError {
    Engine(EngineError),
    /// Request the handler could not read; `details` carries the parser message.
    Generic {
        error: String,
        details: Option<String>,
    },
    /// Missing or malformed tenant header.
    Unauthorized(String),
    Internal(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::StateConflict => StatusCode::CONFLICT,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            ErrorBody {
                error: "internal server error".to_string(),
                details: Some(db_err.to_string()),
            }
        }
        other => ErrorBody {
            error: other.to_string(),
            details: None,
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic { error, details } => {
                (StatusCode::BAD_REQUEST, ErrorBody { error, details })
            }
            ServerError::Unauthorized(error) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error,
                    details: None,
                },
            ),
            ServerError::Internal(details) => {
                tracing::error!("internal error: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal server error".to_string(),
                        details: Some(details),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl ServerError {
    fn invalid_request(details: String) -> Self {
        Self::Generic {
            error: "invalid request".to_string(),
            details: Some(details),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::invalid_request(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::invalid_request(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::invalid_request(value.body_text())
    }
}

impl From<csv::Error> for ServerError {
    fn from(value: csv::Error) -> Self {
        Self::Internal(format!("csv export failed: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn state_conflicts_map_to_409() {
        for err in [
            EngineError::VoucherApproved("x".to_string()),
            EngineError::VoucherNotDraft("x".to_string()),
            EngineError::DuplicateAccount("x".to_string()),
            EngineError::InUse("x".to_string()),
        ] {
            assert_eq!(ServerError::from(err).into_response().status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn validation_maps_to_400() {
        for err in [
            EngineError::Unbalanced("x".to_string()),
            EngineError::InvalidAccount("x".to_string()),
            EngineError::LineMissingAccount("1".to_string()),
            EngineError::EmptyTemplate("x".to_string()),
        ] {
            assert_eq!(ServerError::from(err).into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn storage_maps_to_500() {
        let res = ServerError::from(EngineError::Database(DbErr::Custom("boom".to_string())))
            .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_tenant_maps_to_401() {
        let res = ServerError::Unauthorized("no tenant".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic {
            error: "bad".to_string(),
            details: None,
        }
        .into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
