use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Log in required")]
    NotAuthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotAuthorized | DomainError::RoleRequired(_) => {
                AppError::Forbidden(e.to_string())
            }
            DomainError::Validation(_) | DomainError::OfferNotFound(_) | DomainError::EmptyBasket => {
                AppError::BadRequest(e.to_string())
            }
            DomainError::InvalidState | DomainError::Conflict(_) => AppError::Conflict(e.to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "status": false,
            "error": message
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::caller::Role;
    use actix_web::ResponseError;

    #[test]
    fn not_authenticated_returns_403() {
        let resp = AppError::NotAuthenticated.error_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(err.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_authenticated_display() {
        assert_eq!(AppError::NotAuthenticated.to_string(), "Log in required");
    }

    #[test]
    fn wrong_role_maps_to_forbidden() {
        let app_err: AppError = DomainError::RoleRequired(Role::Shop).into();
        assert_eq!(app_err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(app_err.to_string(), "Only available to the shop role");
    }

    #[test]
    fn foreign_order_maps_to_forbidden() {
        let app_err: AppError = DomainError::NotAuthorized.into();
        assert_eq!(app_err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn validation_failures_map_to_bad_request() {
        for err in [
            DomainError::Validation("bad value".to_string()),
            DomainError::OfferNotFound(3),
            DomainError::EmptyBasket,
        ] {
            let app_err: AppError = err.into();
            assert_eq!(app_err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn lost_race_and_duplicates_map_to_conflict() {
        let state: AppError = DomainError::InvalidState.into();
        let dup: AppError = DomainError::Conflict("dup".to_string()).into();
        assert_eq!(state.status_code(), StatusCode::CONFLICT);
        assert_eq!(dup.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn domain_internal_maps_to_app_internal() {
        let app_err: AppError = DomainError::Internal("oops".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }
}
