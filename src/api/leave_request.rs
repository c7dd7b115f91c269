use crate::{
    api::{MessageResponse, error::ApiError, paging},
    auth::auth::AuthUser,
    config::Config,
    model::leave::{ActionType, LeaveRecord, LeaveRow, LeaveStatus, LeaveType},
    rules::{
        LeaveBalance, compute_leave_balance, normalize_status_label,
        overlap::{ensure_changed, parse_leave_range},
    },
    utils::db_utils::{
        Filters, LEAVE_COLUMNS, SqlValue, fetch_employee_by_emp_id, fetch_leave,
        fetch_leaves_for_email, fetch_manager_of, fetch_team_leaves,
    },
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, info, warn};
use utoipa::{IntoParams, ToSchema};

pub const REASON_MAX_LENGTH: usize = 20;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-07-01", format = Date)]
    pub start_date: String,
    #[schema(example = "2026-07-03", format = Date)]
    pub end_date: String,
    pub leave_type: LeaveType,
    #[schema(example = "Family trip")]
    pub reason: String,
}

/// Fields left out keep their stored value.
#[derive(Deserialize, ToSchema)]
pub struct LeavePatch {
    #[schema(example = "2026-07-02", format = Date)]
    pub start_date: Option<String>,
    #[schema(example = "2026-07-04", format = Date)]
    pub end_date: Option<String>,
    pub leave_type: Option<LeaveType>,
    #[schema(example = "Moved trip")]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CancelLeave {
    #[schema(example = "Plans changed")]
    pub reason: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveFilter {
    /// Filter by stored status code
    pub status: Option<LeaveStatus>,
    /// Filter by leave type
    pub leave_type: Option<LeaveType>,
    /// Filter by requester email (HR only)
    pub email: Option<String>,
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    /// Items per page
    pub per_page: Option<u32>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BalanceQuery {
    /// Defaults to the caller; only HR may ask about someone else
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "PT-001")]
    pub employee_id: String,
    #[schema(example = "john.doe@pal.tech")]
    pub email: String,
    #[schema(example = "2026-07-01", value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-07-03", value_type = String, format = Date)]
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    #[schema(example = "Family trip")]
    pub reason: String,
    #[schema(example = 3)]
    pub day_difference: u32,
    pub status: LeaveStatus,
    /// Display form of `status`, e.g. `approved`
    #[schema(example = "pending")]
    pub status_label: String,
    #[schema(example = "hr@pal.tech")]
    pub responded_by: Option<String>,
    #[schema(example = "2026-06-20T09:00:00Z", value_type = Option<String>, format = DateTime)]
    pub created_at: Option<DateTime<Utc>>,
}

impl LeaveResponse {
    fn new(record: LeaveRecord, created_at: Option<DateTime<Utc>>) -> Self {
        LeaveResponse {
            id: record.id.unwrap_or_default(),
            employee_id: record.employee_id,
            email: record.email,
            start_date: record.start_date,
            end_date: record.end_date,
            leave_type: record.leave_type,
            reason: record.reason,
            day_difference: record.day_difference,
            status_label: normalize_status_label(record.status.as_ref()),
            status: record.status,
            responded_by: record.responded_by,
            created_at,
        }
    }
}

impl TryFrom<LeaveRow> for LeaveResponse {
    type Error = crate::model::leave::CodeError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let record = LeaveRecord::try_from(&row)?;
        Ok(LeaveResponse::new(record, row.created_at))
    }
}

fn responses_from_rows(rows: Vec<LeaveRow>) -> Vec<LeaveResponse> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            LeaveResponse::try_from(row)
                .map_err(|e| warn!(leave_id = id, error = %e, "Skipping leave row"))
                .ok()
        })
        .collect()
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = "john.doe@pal.tech")]
    pub email: String,
    #[schema(example = 5)]
    pub paid_days: u32,
    #[schema(example = 2)]
    pub unpaid_days: u32,
    #[schema(example = 20)]
    pub annual_allowance: u32,
    /// Negative once the allowance is overdrawn
    #[schema(example = 15)]
    pub remaining_paid_days: i64,
}

impl BalanceResponse {
    fn new(email: String, balance: LeaveBalance, allowance: u32) -> Self {
        BalanceResponse {
            email,
            paid_days: balance.paid_days,
            unpaid_days: balance.unpaid_days,
            annual_allowance: allowance,
            remaining_paid_days: balance.remaining_paid(allowance),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Trimmed reason, required and at most [`REASON_MAX_LENGTH`] characters.
fn validate_reason(reason: &str) -> Result<String, ApiError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ApiError::BadRequest("Field is required: reason".into()));
    }
    if reason.chars().count() > REASON_MAX_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Reason must be at most {REASON_MAX_LENGTH} characters"
        )));
    }
    Ok(reason.to_string())
}

fn ensure_not_past(start: NaiveDate, today: NaiveDate) -> Result<(), ApiError> {
    if start < today {
        Err(ApiError::StartDateInPast)
    } else {
        Ok(())
    }
}

async fn load_leave(pool: &MySqlPool, leave_id: u64) -> Result<(LeaveRecord, LeaveRow), ApiError> {
    let row = fetch_leave(pool, leave_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Leave request"))?;
    let record = LeaveRecord::try_from(&row)?;
    Ok((record, row))
}

async fn leave_response(pool: &MySqlPool, leave_id: u64) -> Result<LeaveResponse, ApiError> {
    let (record, row) = load_leave(pool, leave_id).await?;
    Ok(LeaveResponse::new(record, row.created_at))
}

/// Whether `auth` manages the employee who owns `email`.
async fn is_manager_of(pool: &MySqlPool, auth: &AuthUser, email: &str) -> Result<bool, ApiError> {
    let manager = fetch_manager_of(pool, email).await?;
    Ok(manager.is_some_and(|m| m.eq_ignore_ascii_case(&auth.email)))
}

fn require_owner(auth: &AuthUser, record: &LeaveRecord) -> Result<(), ApiError> {
    if record.email.eq_ignore_ascii_case(&auth.email) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Only the requester can change this leave"))
    }
}

fn stale() -> ApiError {
    ApiError::Conflict("Leave request is no longer pending".into())
}

fn stale_session() -> ApiError {
    ApiError::Unauthorized("Employee record changed, please sign in again".into())
}

/* =========================
Apply for leave
========================= */
#[utoipa::path(
    post,
    path = "/api/leaves",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveResponse),
        (status = 400, description = "Invalid dates, reason, or paid balance exceeded", body = MessageResponse,
         example = json!({"message": "Your paid leaves are not enough!"})),
        (status = 401, description = "Unauthorized, or the token predates an employee id change", body = MessageResponse),
        (status = 403, description = "Caller has no leave profile", body = MessageResponse),
        (status = 409, description = "Overlaps an existing leave", body = MessageResponse,
         example = json!({"message": "You have already applied for leave on these dates"}))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CreateLeave>,
) -> Result<impl Responder, ApiError> {
    let employee_id = auth.require_leave_profile()?.to_string();

    let reason = validate_reason(&payload.reason)?;
    let (start, end) = parse_leave_range(&payload.start_date, &payload.end_date)?;
    ensure_not_past(start, today())?;

    // the token may predate an email change
    let employee = fetch_employee_by_emp_id(pool.get_ref(), &employee_id)
        .await?
        .ok_or_else(stale_session)?;
    if employee.email != auth.email {
        warn!(token_email = %auth.email, email = %employee.email, "Leave submitted with a stale token");
    }

    let records = fetch_leaves_for_email(pool.get_ref(), &employee.email).await?;
    debug!(email = %employee.email, existing = records.len(), "Validating leave range");

    let days = config.leave_policy().validate_range(
        &records,
        &payload.start_date,
        &payload.end_date,
        payload.leave_type,
        None,
    )?;

    let result = sqlx::query(
        r#"
        INSERT INTO leaves
            (employee_id, email, start_date, end_date, leave_type, reason, day_difference, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&employee.emp_id)
    .bind(&employee.email)
    .bind(start)
    .bind(end)
    .bind(payload.leave_type.as_ref())
    .bind(&reason)
    .bind(days)
    .bind(LeaveStatus::Pending.as_ref())
    .execute(pool.get_ref())
    .await?;

    let leave_id = result.last_insert_id();
    info!(leave_id, email = %employee.email, days, "Leave request submitted");

    Ok(HttpResponse::Created().json(leave_response(pool.get_ref(), leave_id).await?))
}

/* =========================
Edit a pending leave
========================= */
#[utoipa::path(
    patch,
    path = "/api/leaves/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to edit")
    ),
    request_body = LeavePatch,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveResponse),
        (status = 400, description = "Nothing changed, invalid dates, or paid balance exceeded", body = MessageResponse,
         example = json!({"message": "Form not updated, please try again!"})),
        (status = 403, description = "Not the requester", body = MessageResponse),
        (status = 404, description = "Leave request not found", body = MessageResponse),
        (status = 409, description = "Not pending, or overlaps another leave", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    patch: web::Json<LeavePatch>,
) -> Result<impl Responder, ApiError> {
    auth.require_leave_profile()?;
    let leave_id = path.into_inner();

    let (original, _) = load_leave(pool.get_ref(), leave_id).await?;
    require_owner(&auth, &original)?;
    original.status.apply(ActionType::Modify)?;

    let patch = patch.into_inner();
    let start_raw = patch
        .start_date
        .unwrap_or_else(|| original.start_date.to_string());
    let end_raw = patch.end_date.unwrap_or_else(|| original.end_date.to_string());
    let leave_type = patch.leave_type.unwrap_or(original.leave_type);
    let reason = match patch.reason {
        Some(reason) => validate_reason(&reason)?,
        None => original.reason.clone(),
    };

    let (start, end) = parse_leave_range(&start_raw, &end_raw)?;
    ensure_changed(&original, start, end, leave_type, &reason)?;
    if start != original.start_date {
        ensure_not_past(start, today())?;
    }

    let records = fetch_leaves_for_email(pool.get_ref(), &original.email).await?;
    let days = config.leave_policy().validate_range(
        &records,
        &start_raw,
        &end_raw,
        leave_type,
        Some(&original),
    )?;

    let result = sqlx::query(
        r#"
        UPDATE leaves
        SET start_date = ?, end_date = ?, leave_type = ?, reason = ?, day_difference = ?, status = ?
        WHERE id = ?
        AND status = ?
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(leave_type.as_ref())
    .bind(&reason)
    .bind(days)
    .bind(LeaveStatus::Pending.as_ref())
    .bind(leave_id)
    .bind(LeaveStatus::Pending.as_ref())
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(stale());
    }

    info!(leave_id, days, "Leave request updated");

    Ok(HttpResponse::Ok().json(leave_response(pool.get_ref(), leave_id).await?))
}

/* =========================
Cancel a pending leave
========================= */
#[utoipa::path(
    put,
    path = "/api/leaves/{leave_id}/cancel",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    request_body = CancelLeave,
    responses(
        (status = 200, description = "Leave cancelled", body = MessageResponse,
         example = json!({"message": "Leave cancelled"})),
        (status = 400, description = "Reason missing", body = MessageResponse),
        (status = 403, description = "Not the requester", body = MessageResponse),
        (status = 404, description = "Leave request not found", body = MessageResponse),
        (status = 409, description = "Leave request is not pending", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CancelLeave>,
) -> Result<impl Responder, ApiError> {
    auth.require_leave_profile()?;
    let leave_id = path.into_inner();
    let reason = validate_reason(&payload.reason)?;

    let (record, _) = load_leave(pool.get_ref(), leave_id).await?;
    require_owner(&auth, &record)?;
    let next = record.status.apply(ActionType::Cancel)?;

    let result = sqlx::query(
        r#"
        UPDATE leaves
        SET status = ?, reason = ?
        WHERE id = ?
        AND status = ?
        "#,
    )
    .bind(next.as_ref())
    .bind(&reason)
    .bind(leave_id)
    .bind(LeaveStatus::Pending.as_ref())
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(stale());
    }

    info!(leave_id, "Leave request cancelled");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Leave cancelled")))
}

async fn respond(
    auth: &AuthUser,
    pool: &MySqlPool,
    leave_id: u64,
    action: ActionType,
) -> Result<LeaveStatus, ApiError> {
    let (record, _) = load_leave(pool, leave_id).await?;

    if record.email.eq_ignore_ascii_case(&auth.email) {
        return Err(ApiError::forbidden("You cannot respond to your own leave request"));
    }
    if !auth.is_hr() && !is_manager_of(pool, auth, &record.email).await? {
        return Err(ApiError::forbidden(
            "Only HR or the requester's manager can respond",
        ));
    }

    let next = record.status.apply(action)?;

    let result = sqlx::query(
        r#"
        UPDATE leaves
        SET status = ?, responded_by = ?
        WHERE id = ?
        AND status = ?
        "#,
    )
    .bind(next.as_ref())
    .bind(&auth.email)
    .bind(leave_id)
    .bind(LeaveStatus::Pending.as_ref())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(stale());
    }

    info!(leave_id, status = %next, responded_by = %auth.email, "Leave request answered");
    Ok(next)
}

/* =========================
Approve leave (HR or manager)
========================= */
#[utoipa::path(
    put,
    path = "/api/leaves/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved successfully", body = MessageResponse,
         example = json!({"message": "Leave approved"})),
        (status = 403, description = "Not HR or the requester's manager", body = MessageResponse),
        (status = 404, description = "Leave request not found", body = MessageResponse),
        (status = 409, description = "Leave request already processed", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_hr_or_manager()?;
    respond(&auth, pool.get_ref(), path.into_inner(), ActionType::Approve).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Leave approved")))
}

/* =========================
Reject leave (HR or manager)
========================= */
#[utoipa::path(
    put,
    path = "/api/leaves/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected successfully", body = MessageResponse,
         example = json!({"message": "Leave rejected"})),
        (status = 403, description = "Not HR or the requester's manager", body = MessageResponse),
        (status = 404, description = "Leave request not found", body = MessageResponse),
        (status = 409, description = "Leave request already processed", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_hr_or_manager()?;
    respond(&auth, pool.get_ref(), path.into_inner(), ActionType::Reject).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Leave rejected")))
}

#[utoipa::path(
    delete,
    path = "/api/leaves/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = MessageResponse),
        (status = 403, description = "HR only", body = MessageResponse),
        (status = 404, description = "Leave request not found", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_hr()?;
    let leave_id = path.into_inner();

    let result = sqlx::query("DELETE FROM leaves WHERE id = ?")
        .bind(leave_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Leave request"));
    }

    info!(leave_id, "Leave request deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Successfully deleted")))
}

/// Leave application details
#[utoipa::path(
    get,
    path = "/api/leaves/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the requester, their manager, or HR", body = MessageResponse),
        (status = 404, description = "Leave request not found", body = MessageResponse,
         example = json!({"message": "Leave request not found"}))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let leave_id = path.into_inner();
    let (record, row) = load_leave(pool.get_ref(), leave_id).await?;

    if !auth.can_view(&record.email) && !is_manager_of(pool.get_ref(), &auth, &record.email).await? {
        return Err(ApiError::forbidden("You cannot view this leave request"));
    }

    Ok(HttpResponse::Ok().json(LeaveResponse::new(record, row.created_at)))
}

/// Leave history
#[utoipa::path(
    get,
    path = "/api/leaves",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list, newest first", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<impl Responder, ApiError> {
    let (page, per_page, offset) = paging(query.page, query.per_page, 10);

    let mut filters = Filters::new();
    match (auth.is_hr(), query.email.as_deref()) {
        (true, Some(email)) => {
            filters.eq("email", SqlValue::String(email.trim().to_lowercase()));
        }
        (true, None) => {}
        (false, _) => {
            filters.eq("email", SqlValue::String(auth.email.clone()));
        }
    }
    if let Some(status) = query.status {
        filters.eq("status", SqlValue::String(status.to_string()));
    }
    if let Some(leave_type) = query.leave_type {
        filters.eq("leave_type", SqlValue::String(leave_type.to_string()));
    }
    let where_clause = filters.where_clause();

    let count_sql = format!("SELECT COUNT(*) FROM leaves {where_clause}");
    let total = filters
        .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool.get_ref())
        .await?;

    let data_sql = format!(
        "SELECT {LEAVE_COLUMNS} FROM leaves {where_clause} \
         ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
    );
    debug!(sql = %data_sql, values = ?filters.values(), page, per_page, "Fetching leaves");

    let rows = filters
        .bind_rows(sqlx::query_as::<_, LeaveRow>(&data_sql))
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: responses_from_rows(rows),
        page,
        per_page,
        total,
    }))
}

/// Leaves of the caller's direct reports
#[utoipa::path(
    get,
    path = "/api/leaves/team",
    responses(
        (status = 200, description = "Team leave list, newest first", body = [LeaveResponse]),
        (status = 403, description = "HR/Manager only", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn team_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.require_hr_or_manager()?;
    let rows = fetch_team_leaves(pool.get_ref(), &auth.email).await?;
    Ok(HttpResponse::Ok().json(responses_from_rows(rows)))
}

/// Paid and unpaid days used
#[utoipa::path(
    get,
    path = "/api/leaves/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Leave balance", body = BalanceResponse),
        (status = 403, description = "Only HR may query other employees", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<BalanceQuery>,
) -> Result<impl Responder, ApiError> {
    let email = query
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_else(|| auth.email.clone());

    if !auth.can_view(&email) {
        return Err(ApiError::forbidden("You can only view your own balance"));
    }

    let records = fetch_leaves_for_email(pool.get_ref(), &email).await?;
    let balance = compute_leave_balance(&records);

    Ok(HttpResponse::Ok().json(BalanceResponse::new(
        email,
        balance,
        config.annual_paid_allowance,
    )))
}
