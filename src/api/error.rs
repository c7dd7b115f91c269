use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::api::MessageResponse;
use crate::model::leave::CodeError;
use crate::rules::employee::EmployeeRuleError;
use crate::rules::{LeaveRuleError, TransitionError};

/// Everything a handler can fail with, rendered as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Leave(#[from] LeaveRuleError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Employee(#[from] EmployeeRuleError),

    #[error("Start date cannot be before today")]
    StartDateInPast,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal Server Error")]
    Database(#[from] sqlx::Error),

    #[error("Internal Server Error")]
    Corrupt(#[from] CodeError),

    #[error("Internal Server Error")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Leave(LeaveRuleError::DuplicateLeaveRange) => StatusCode::CONFLICT,
            ApiError::Leave(_) | ApiError::StartDateInPast | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Transition(_) | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Employee(
                EmployeeRuleError::DuplicateEmployeeId
                | EmployeeRuleError::DuplicateEmail
                | EmployeeRuleError::ManagerHasReports,
            ) => StatusCode::CONFLICT,
            ApiError::Employee(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Corrupt(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Database(e) => tracing::error!(error = %e, "Database error"),
            ApiError::Corrupt(e) => tracing::error!(error = %e, "Stored row could not be read"),
            ApiError::Internal(e) => tracing::error!(error = %e, "Internal error"),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(MessageResponse::new(self.to_string()))
    }
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn rule_errors_keep_their_messages() {
        let err = ApiError::from(LeaveRuleError::InsufficientPaidBalance);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Your paid leaves are not enough!");
    }

    #[test]
    fn duplicates_are_conflicts() {
        assert_eq!(
            ApiError::from(LeaveRuleError::DuplicateLeaveRange).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(EmployeeRuleError::DuplicateEmail).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(EmployeeRuleError::ManagerHasReports).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(EmployeeRuleError::ManagerNotFound).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn database_details_stay_out_of_the_body() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        assert_eq!(&body[..], br#"{"message":"Internal Server Error"}"#);
    }
}
