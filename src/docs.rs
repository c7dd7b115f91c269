use crate::api::MessageResponse;
use crate::api::employee::{CreateEmployee, EmployeeListResponse, UpdateEmployee};
use crate::api::leave_request::{
    BalanceResponse, CancelLeave, CreateLeave, LeaveListResponse, LeavePatch, LeaveResponse,
};
use crate::model::employee::Employee;
use crate::model::leave::{LeaveStatus, LeaveType};
use crate::model::role::Role;
use crate::models::{LoginReqDto, LoginResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Desk API",
        version = "1.0.0",
        description = r#"
## Leave Desk

Leave requests and approvals for a small organisation.

### Key Features
- **Employees**: HR creates, edits and removes employees and managers
- **Leaves**: apply, edit or cancel pending requests; managers and HR approve or reject
- **Balance**: paid and unpaid days used against the annual paid allowance

### Security
Everything under `/api` needs an access token (`Authorization: Bearer ...`).
Use `/auth/refresh` with the refresh token to rotate both.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::team_leaves,
        crate::api::leave_request::leave_balance,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::list_managers,
        crate::api::employee::get_me,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            MessageResponse,
            LoginReqDto,
            LoginResponse,
            Role,
            LeaveType,
            LeaveStatus,
            CreateLeave,
            LeavePatch,
            CancelLeave,
            LeaveResponse,
            LeaveListResponse,
            BalanceResponse,
            CreateEmployee,
            UpdateEmployee,
            Employee,
            EmployeeListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign in, token rotation and sign out"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Employee", description = "Employee management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
