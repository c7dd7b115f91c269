use crate::{
    api::{MessageResponse, error::ApiError, paging},
    auth::{auth::AuthUser, password::hash_password},
    config::Config,
    model::{
        employee::{Employee, EmployeeRow},
        role::Role,
    },
    rules::employee::{
        EmployeeChecks, EmployeeDraft, ValidEmployee, normalize_email, validate_employee,
    },
    utils::{
        db_utils::{
            EMPLOYEE_COLUMNS, Filters, SqlValue, employees_from_rows, fetch_employee_by_email,
            fetch_employee_by_id, fetch_managers, has_reports, manager_exists,
        },
        employee_index::{self, IndexKey},
    },
};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[serde(default)]
    #[schema(example = "PT-001")]
    pub emp_id: String,
    #[serde(default)]
    #[schema(example = "John Doe")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "john.doe@pal.tech")]
    pub email: String,
    pub role: Option<Role>,
    /// Required for employees; managers always report to HR
    #[schema(example = "jane.roe@pal.tech")]
    pub manager_email: Option<String>,
    #[serde(default)]
    #[schema(example = "secret1")]
    pub password: String,
}

/// Fields left out keep their stored value.
#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateEmployee {
    pub emp_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub manager_email: Option<String>,
    /// New password; leave out to keep the current one
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    pub role: Option<Role>,
    /// Forced to the caller for managers
    pub manager_email: Option<String>,
    pub email: Option<String>,
    /// Matches name, email or employee id
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

impl From<CreateEmployee> for EmployeeDraft {
    fn from(payload: CreateEmployee) -> Self {
        EmployeeDraft {
            emp_id: payload.emp_id,
            name: payload.name,
            email: payload.email,
            role: payload.role,
            manager_email: payload.manager_email,
            password: Some(payload.password),
        }
    }
}

/// Overlays `update` on the stored employee.
fn merge_update(current: &Employee, update: UpdateEmployee) -> EmployeeDraft {
    EmployeeDraft {
        emp_id: update.emp_id.unwrap_or_else(|| current.emp_id.clone()),
        name: update.name.unwrap_or_else(|| current.name.clone()),
        email: update.email.unwrap_or_else(|| current.email.clone()),
        role: Some(update.role.unwrap_or(current.role)),
        manager_email: update
            .manager_email
            .or_else(|| Some(current.manager_email.clone())),
        password: update.password,
    }
}

/// Resolves the store lookups validation needs. Values that are empty or
/// unchanged from `current` are not looked up.
async fn resolve_checks(
    pool: &MySqlPool,
    draft: &EmployeeDraft,
    current: Option<&Employee>,
) -> Result<EmployeeChecks, ApiError> {
    let emp_id = draft.emp_id.trim();
    let email = normalize_email(&draft.email);

    let emp_id_taken = !emp_id.is_empty()
        && current.is_none_or(|c| c.emp_id != emp_id)
        && employee_index::is_taken(pool, IndexKey::EmpId(emp_id)).await?;

    let email_taken = !email.is_empty()
        && current.is_none_or(|c| c.email != email)
        && employee_index::is_taken(pool, IndexKey::Email(&email)).await?;

    let manager = draft
        .manager_email
        .as_deref()
        .map(normalize_email)
        .filter(|m| !m.is_empty());
    // the stored row of the employee being edited never counts as their manager
    let manager_found = match (draft.role, manager) {
        (Some(Role::Employee), Some(manager)) if current.is_none_or(|c| c.email != manager) => {
            manager_exists(pool, &manager).await?
        }
        _ => false,
    };

    let reports = match current {
        Some(c) if c.role == Role::Manager && draft.role != Some(Role::Manager) => {
            has_reports(pool, &c.email).await?
        }
        _ => false,
    };

    debug!(emp_id_taken, email_taken, manager_found, reports, "Employee checks resolved");

    Ok(EmployeeChecks {
        emp_id_taken,
        email_taken,
        manager_exists: manager_found,
        has_reports: reports,
    })
}

fn hashed(password: &str) -> Result<String, ApiError> {
    hash_password(password).map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000"))
}

fn insert_error(e: sqlx::Error) -> ApiError {
    if is_unique_violation(&e) {
        ApiError::Conflict("Employee already exists".into())
    } else {
        ApiError::Database(e)
    }
}

async fn index_employee(valid: &ValidEmployee) {
    employee_index::mark_taken(IndexKey::Email(&valid.email)).await;
    employee_index::mark_taken(IndexKey::EmpId(&valid.emp_id)).await;
}

async fn forget_employee(employee: &Employee) {
    employee_index::forget(IndexKey::Email(&employee.email)).await;
    employee_index::forget(IndexKey::EmpId(&employee.emp_id)).await;
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = Employee),
        (status = 400, description = "Validation failed", body = MessageResponse,
         example = json!({"message": "Include domain ,include @pal.tech "})),
        (status = 403, description = "HR only", body = MessageResponse),
        (status = 409, description = "Employee id or email already taken", body = MessageResponse,
         example = json!({"message": "Employee email already taken"}))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CreateEmployee>,
) -> Result<impl Responder, ApiError> {
    auth.require_hr()?;

    let draft = EmployeeDraft::from(payload.into_inner());
    let checks = resolve_checks(pool.get_ref(), &draft, None).await?;
    let valid = validate_employee(&draft, &checks, &config.employee_policy(), true)?;

    let password = valid
        .password
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Field is required: password".into()))?;
    let password_hash = hashed(password)?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees (emp_id, name, email, role, manager_email, password)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&valid.emp_id)
    .bind(&valid.name)
    .bind(&valid.email)
    .bind(valid.role.as_ref())
    .bind(&valid.manager_email)
    .bind(&password_hash)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create employee");
        insert_error(e)
    })?;

    index_employee(&valid).await;

    let id = result.last_insert_id();
    info!(id, email = %valid.email, role = %valid.role, "Employee created");

    let employee = fetch_employee_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 403, description = "HR/Manager only", body = MessageResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<impl Responder, ApiError> {
    auth.require_hr_or_manager()?;

    let (page, per_page, offset) = paging(query.page, query.per_page, 20);

    let mut filters = Filters::new();
    if let Some(role) = query.role {
        filters.eq("role", SqlValue::String(role.to_string()));
    }
    let manager_email = if auth.is_hr() {
        query.manager_email.as_deref().map(normalize_email)
    } else {
        Some(auth.email.clone())
    };
    if let Some(manager_email) = manager_email {
        filters.eq("manager_email", SqlValue::String(manager_email));
    }
    if let Some(email) = query.email.as_deref() {
        filters.eq("email", SqlValue::String(normalize_email(email)));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let like = format!("%{search}%");
        filters.push(
            "(name LIKE ? OR email LIKE ? OR emp_id LIKE ?)",
            [
                SqlValue::String(like.clone()),
                SqlValue::String(like.clone()),
                SqlValue::String(like),
            ],
        );
    }
    let where_clause = filters.where_clause();

    let count_sql = format!("SELECT COUNT(*) FROM employees {where_clause}");
    debug!(sql = %count_sql, values = ?filters.values(), "Counting employees");

    let total = filters
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await?;

    let data_sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees {where_clause} ORDER BY id DESC LIMIT ? OFFSET ?"
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching employees");

    let rows = filters
        .bind_rows(sqlx::query_as::<_, EmployeeRow>(&data_sql))
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees_from_rows(rows),
        page,
        per_page,
        total,
    }))
}

/// Managers an employee can be assigned to
#[utoipa::path(
    get,
    path = "/api/employees/managers",
    responses(
        (status = 200, description = "All managers", body = [Employee]),
        (status = 403, description = "HR only", body = MessageResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_managers(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.require_hr()?;
    Ok(HttpResponse::Ok().json(fetch_managers(pool.get_ref()).await?))
}

/// Own profile
#[utoipa::path(
    get,
    path = "/api/employees/me",
    responses(
        (status = 200, description = "Profile of the caller", body = Employee),
        (status = 404, description = "Caller has no employee record", body = MessageResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<impl Responder, ApiError> {
    if auth.is_hr() {
        return Err(ApiError::not_found("Employee"));
    }
    let employee = fetch_employee_by_email(pool.get_ref(), &auth.email)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 400, description = "Validation failed", body = MessageResponse),
        (status = 403, description = "HR only", body = MessageResponse),
        (status = 404, description = "Employee not found", body = MessageResponse,
         example = json!({"message": "Employee not found"})),
        (status = 409, description = "Employee id or email already taken, or a manager with reports is demoted", body = MessageResponse,
         example = json!({"message": "Manager still has employees assigned"}))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    body: web::Json<UpdateEmployee>,
) -> Result<impl Responder, ApiError> {
    auth.require_hr()?;
    let employee_id = path.into_inner();

    let current = fetch_employee_by_id(pool.get_ref(), employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    let draft = merge_update(&current, body.into_inner());
    let checks = resolve_checks(pool.get_ref(), &draft, Some(&current)).await?;
    let valid = validate_employee(&draft, &checks, &config.employee_policy(), false)?;

    let password_hash = match valid.password.as_deref() {
        Some(password) => hashed(password)?,
        None => current.password_hash.clone(),
    };

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE employees
        SET emp_id = ?, name = ?, email = ?, role = ?, manager_email = ?, password = ?
        WHERE id = ?
        "#,
    )
    .bind(&valid.emp_id)
    .bind(&valid.name)
    .bind(&valid.email)
    .bind(valid.role.as_ref())
    .bind(&valid.manager_email)
    .bind(&password_hash)
    .bind(employee_id)
    .execute(&mut *tx)
    .await
    .map_err(insert_error)?;

    // leaves and reports reference the employee by email and business id
    if valid.email != current.email || valid.emp_id != current.emp_id {
        sqlx::query("UPDATE leaves SET email = ?, employee_id = ? WHERE email = ?")
            .bind(&valid.email)
            .bind(&valid.emp_id)
            .bind(&current.email)
            .execute(&mut *tx)
            .await?;
    }
    if valid.email != current.email {
        sqlx::query("UPDATE employees SET manager_email = ? WHERE manager_email = ?")
            .bind(&valid.email)
            .bind(&current.email)
            .execute(&mut *tx)
            .await?;
        // sessions are keyed by the old email
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE subject = ? AND revoked = FALSE")
            .bind(&current.email)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    forget_employee(&current).await;
    index_employee(&valid).await;

    info!(employee_id, email = %valid.email, "Employee updated");

    let employee = fetch_employee_by_id(pool.get_ref(), employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee together with their leave history
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 403, description = "HR only", body = MessageResponse),
        (status = 404, description = "Employee not found", body = MessageResponse, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_hr()?;
    let employee_id = path.into_inner();

    let employee = fetch_employee_by_id(pool.get_ref(), employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    let mut tx = pool.begin().await?;

    let leaves = sqlx::query("DELETE FROM leaves WHERE email = ?")
        .bind(&employee.email)
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    if deleted.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(ApiError::not_found("Employee"));
    }

    tx.commit().await?;

    forget_employee(&employee).await;

    info!(
        employee_id,
        email = %employee.email,
        leaves_removed = leaves.rows_affected(),
        "Employee deleted"
    );

    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully deleted")))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 403, description = "HR only", body = MessageResponse),
        (status = 404, description = "Employee not found", body = MessageResponse, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_hr()?;
    let employee_id = path.into_inner();

    let employee = fetch_employee_by_id(pool.get_ref(), employee_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    Ok(HttpResponse::Ok().json(employee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{TokenSubject, generate_access_token};
    use crate::auth::middleware::auth_middleware;
    use crate::config::tests::test_config;
    use actix_web::{App, http::StatusCode, middleware::from_fn, test as actix_test};

    fn stored() -> Employee {
        Employee {
            id: 9,
            emp_id: "PT-9".into(),
            name: "Ann Lee".into(),
            email: "ann@pal.tech".into(),
            role: Role::Employee,
            manager_email: "boss@pal.tech".into(),
            password_hash: "$argon2id$stored".into(),
        }
    }

    fn bearer(role: Role, email: &str) -> String {
        let config = test_config();
        let token = generate_access_token(
            &TokenSubject {
                email: email.to_string(),
                role,
                employee_id: (role != Role::Hr).then(|| "PT-5".to_string()),
            },
            &config.jwt_secret,
            60,
        )
        .unwrap();
        format!("Bearer {token}")
    }

    macro_rules! employee_app {
        () => {{
            let config = test_config();
            let pool = MySqlPool::connect_lazy(&config.database_url).unwrap();
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(pool))
                    .app_data(web::Data::new(config))
                    .service(
                        web::scope("/api/employees")
                            .wrap(from_fn(auth_middleware))
                            .service(
                                web::resource("")
                                    .route(web::post().to(create_employee))
                                    .route(web::get().to(list_employees)),
                            )
                            .route("/managers", web::get().to(list_managers))
                            .route("/{id}", web::delete().to(delete_employee)),
                    ),
            )
            .await
        }};
    }

    #[test]
    fn update_keeps_unset_fields() {
        let draft = merge_update(
            &stored(),
            UpdateEmployee {
                name: Some("Ann Smith".into()),
                ..UpdateEmployee::default()
            },
        );
        assert_eq!(draft.name, "Ann Smith");
        assert_eq!(draft.email, "ann@pal.tech");
        assert_eq!(draft.role, Some(Role::Employee));
        assert_eq!(draft.manager_email.as_deref(), Some("boss@pal.tech"));
        assert_eq!(draft.password, None);
    }

    #[test]
    fn create_payload_requires_a_password() {
        let payload: CreateEmployee =
            serde_json::from_value(serde_json::json!({"emp_id": "PT-1", "role": "manager"})).unwrap();
        let draft = EmployeeDraft::from(payload);
        assert_eq!(draft.password.as_deref(), Some(""));
        assert_eq!(draft.role, Some(Role::Manager));
    }

    #[actix_web::test]
    async fn only_hr_creates_employees() {
        let app = employee_app!();
        let req = actix_test::TestRequest::post()
            .uri("/api/employees")
            .insert_header(("Authorization", bearer(Role::Manager, "boss@pal.tech")))
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn empty_form_reports_first_missing_field() {
        let app = employee_app!();
        let req = actix_test::TestRequest::post()
            .uri("/api/employees")
            .insert_header(("Authorization", bearer(Role::Hr, "hr@pal.tech")))
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["message"], "Field is required: emp_id");
    }

    #[actix_web::test]
    async fn employees_cannot_browse_or_delete() {
        let app = employee_app!();
        let token = bearer(Role::Employee, "ann@pal.tech");

        let req = actix_test::TestRequest::get()
            .uri("/api/employees")
            .insert_header(("Authorization", token.clone()))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = actix_test::TestRequest::get()
            .uri("/api/employees/managers")
            .insert_header(("Authorization", token.clone()))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = actix_test::TestRequest::delete()
            .uri("/api/employees/3")
            .insert_header(("Authorization", token))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
