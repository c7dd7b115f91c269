use crate::{
    api::error::ApiError,
    auth::{
        jwt::{TokenSubject, generate_access_token, generate_refresh_token, verify_token},
        password::verify_password,
    },
    config::Config,
    model::role::Role,
    models::{Claims, LoginReqDto, LoginResponse, TokenType},
    rules::employee::normalize_email,
    utils::db_utils::fetch_employee_by_email,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

const UNKNOWN_EMAIL: &str = "User not existed with given mail!";
const WRONG_PASSWORD: &str = "Your password was incorrect";

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Issues an access/refresh pair and records the refresh token id.
async fn issue_session(
    subject: &TokenSubject,
    pool: &MySqlPool,
    config: &Config,
) -> Result<LoginResponse, ApiError> {
    let internal = |e: jsonwebtoken::errors::Error| ApiError::Internal(e.to_string());

    let access_token =
        generate_access_token(subject, &config.jwt_secret, config.access_token_ttl).map_err(internal)?;
    let (refresh_token, refresh_claims) =
        generate_refresh_token(subject, &config.jwt_secret, config.refresh_token_ttl)
            .map_err(internal)?;

    debug!(jti = %refresh_claims.jti, "Storing refresh token");

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (subject, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(&subject.email)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool)
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to store refresh token");
        ApiError::Database(e)
    })?;

    Ok(LoginResponse {
        access_token,
        refresh_token,
        role: subject.role,
    })
}

/// Current token subject for `email`, or `None` if the account is gone.
async fn resolve_subject(
    email: &str,
    pool: &MySqlPool,
    config: &Config,
) -> Result<Option<TokenSubject>, ApiError> {
    if email == config.hr_email {
        return Ok(Some(TokenSubject {
            email: config.hr_email.clone(),
            role: Role::Hr,
            employee_id: None,
        }));
    }

    Ok(fetch_employee_by_email(pool, email)
        .await?
        .map(|employee| TokenSubject {
            email: employee.email,
            role: employee.role,
            employee_id: Some(employee.emp_id),
        }))
}

/// Sign in
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Email or password missing", body = crate::api::MessageResponse),
        (status = 401, description = "Unknown email or wrong password", body = crate::api::MessageResponse,
         example = json!({"message": "Your password was incorrect"}))
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, ApiError> {
    info!("Login request received");

    let email = normalize_email(&user.email);
    if email.is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(ApiError::BadRequest("Email and password are required".into()));
    }

    let subject = if email == config.hr_email {
        if user.password != config.hr_password {
            info!("Invalid credentials: HR password mismatch");
            return Err(ApiError::Unauthorized(WRONG_PASSWORD.into()));
        }
        TokenSubject {
            email,
            role: Role::Hr,
            employee_id: None,
        }
    } else {
        debug!("Fetching employee from database");

        let employee = fetch_employee_by_email(pool.get_ref(), &email)
            .await?
            .ok_or_else(|| {
                info!("Invalid credentials: employee not found");
                ApiError::Unauthorized(UNKNOWN_EMAIL.into())
            })?;

        verify_password(&user.password, &employee.password_hash).map_err(|e| {
            info!(error = %e, "Invalid credentials: password mismatch");
            ApiError::Unauthorized(WRONG_PASSWORD.into())
        })?;

        TokenSubject {
            email: employee.email,
            role: employee.role,
            employee_id: Some(employee.emp_id),
        }
    };

    let session = issue_session(&subject, pool.get_ref(), config.get_ref()).await?;

    info!(role = %subject.role, "Login successful");

    Ok(HttpResponse::Ok().json(session))
}

fn refresh_claims(req: &HttpRequest, config: &Config) -> Option<Claims> {
    let claims = verify_token(bearer_token(req)?, &config.jwt_secret).ok()?;
    (claims.token_type == TokenType::Refresh).then_some(claims)
}

/// Rotate a refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = LoginResponse),
        (status = 401, description = "Missing, revoked or expired refresh token", body = crate::api::MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, ApiError> {
    let unauthorized = || ApiError::Unauthorized("Invalid refresh token".into());

    let claims = refresh_claims(&req, config.get_ref()).ok_or_else(unauthorized)?;

    let record = sqlx::query_as::<_, (u64, bool)>(
        "SELECT id, revoked FROM refresh_tokens WHERE jti = ?",
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await?;

    let token_id = match record {
        Some((id, false)) => id,
        _ => return Err(unauthorized()),
    };

    // a second use of the same token loses the race here
    let revoked = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ? AND revoked = FALSE")
        .bind(token_id)
        .execute(pool.get_ref())
        .await?;
    if revoked.rows_affected() == 0 {
        return Err(unauthorized());
    }

    let subject = resolve_subject(&claims.sub, pool.get_ref(), config.get_ref())
        .await?
        .ok_or_else(unauthorized)?;

    let session = issue_session(&subject, pool.get_ref(), config.get_ref()).await?;

    Ok(HttpResponse::Ok().json(session))
}

/// Sign out
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Refresh token revoked (or nothing to revoke)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let Some(claims) = refresh_claims(&req, config.get_ref()) else {
        return HttpResponse::NoContent().finish();
    };

    // idempotent
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
    }

    HttpResponse::NoContent().finish()
}
