use crate::{api::error::ApiError, model::role::Role, models::Claims};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// The signed-in account, built from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
    pub role: Role,

    /// Business employee id; `None` for the HR account
    pub employee_id: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            email: claims.sub,
            role: claims.role,
            employee_id: claims.employee_id,
        }
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // inserted by auth_middleware
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("Missing token"))),
        }
    }
}

impl AuthUser {
    pub fn is_hr(&self) -> bool {
        self.role == Role::Hr
    }

    pub fn require_hr(&self) -> Result<(), ApiError> {
        if self.is_hr() {
            Ok(())
        } else {
            Err(ApiError::forbidden("HR only"))
        }
    }

    pub fn require_hr_or_manager(&self) -> Result<(), ApiError> {
        if matches!(self.role, Role::Hr | Role::Manager) {
            Ok(())
        } else {
            Err(ApiError::forbidden("HR/Manager only"))
        }
    }

    /// Employee id of a caller who submits their own leaves.
    pub fn require_leave_profile(&self) -> Result<&str, ApiError> {
        match self.employee_id.as_deref() {
            Some(id) if self.role.has_leave_profile() => Ok(id),
            _ => Err(ApiError::forbidden("No employee profile")),
        }
    }

    /// HR may act on anyone; everybody else only on their own email.
    pub fn can_view(&self, email: &str) -> bool {
        self.is_hr() || self.email.eq_ignore_ascii_case(email)
    }
}
