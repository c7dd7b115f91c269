use thiserror::Error;

use crate::model::role::Role;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeePolicy {
    /// Suffix every employee and manager email must contain, e.g. `@pal.tech`.
    pub email_domain: String,
    /// Managers report to this account.
    pub hr_email: String,
}

/// Employee fields after a create payload or a merged update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub emp_id: String,
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
    pub manager_email: Option<String>,
    /// Plain-text password; `None` on updates that keep the current one.
    pub password: Option<String>,
}

/// Lookups the caller resolved against the store before validating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmployeeChecks {
    pub emp_id_taken: bool,
    pub email_taken: bool,
    pub manager_exists: bool,
    /// The stored employee is a manager with direct reports.
    pub has_reports: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEmployee {
    pub emp_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub manager_email: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmployeeRuleError {
    #[error("Field is required: {0}")]
    MissingField(&'static str),

    #[error("Employee Id already Taken")]
    DuplicateEmployeeId,

    #[error("Include domain ,include {domain} ")]
    InvalidDomain { domain: String },

    #[error("Employee email already taken")]
    DuplicateEmail,

    #[error("Password minimum length is {}", MIN_PASSWORD_LENGTH)]
    PasswordTooShort,

    #[error("Manager not found!")]
    ManagerNotFound,

    #[error("Role {0} cannot be assigned")]
    RoleNotAssignable(Role),

    #[error("Manager still has employees assigned")]
    ManagerHasReports,
}

/// Normalised form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates an employee the way the HR form does, in the same order:
/// required fields, id, domain, email, password, then manager assignment.
pub fn validate_employee(
    draft: &EmployeeDraft,
    checks: &EmployeeChecks,
    policy: &EmployeePolicy,
    require_password: bool,
) -> Result<ValidEmployee, EmployeeRuleError> {
    let emp_id = draft.emp_id.trim();
    let name = draft.name.trim();
    let email = normalize_email(&draft.email);

    if emp_id.is_empty() {
        return Err(EmployeeRuleError::MissingField("emp_id"));
    }
    if name.is_empty() {
        return Err(EmployeeRuleError::MissingField("name"));
    }
    if email.is_empty() {
        return Err(EmployeeRuleError::MissingField("email"));
    }
    let role = draft.role.ok_or(EmployeeRuleError::MissingField("role"))?;
    let password = draft.password.as_deref().filter(|p| !p.is_empty());
    if require_password && password.is_none() {
        return Err(EmployeeRuleError::MissingField("password"));
    }
    if !role.is_assignable() {
        return Err(EmployeeRuleError::RoleNotAssignable(role));
    }

    if checks.emp_id_taken {
        return Err(EmployeeRuleError::DuplicateEmployeeId);
    }
    if !email.contains(&policy.email_domain) {
        return Err(invalid_domain(policy));
    }
    if checks.email_taken {
        return Err(EmployeeRuleError::DuplicateEmail);
    }
    if password.is_some_and(|p| p.chars().count() < MIN_PASSWORD_LENGTH) {
        return Err(EmployeeRuleError::PasswordTooShort);
    }

    let manager_email = match role {
        Role::Employee => {
            let manager = draft
                .manager_email
                .as_deref()
                .map(normalize_email)
                .filter(|m| !m.is_empty())
                .ok_or(EmployeeRuleError::ManagerNotFound)?;
            if !manager.contains(&policy.email_domain) {
                return Err(invalid_domain(policy));
            }
            if manager == email || !checks.manager_exists {
                return Err(EmployeeRuleError::ManagerNotFound);
            }
            manager
        }
        _ => normalize_email(&policy.hr_email),
    };

    if role != Role::Manager && checks.has_reports {
        return Err(EmployeeRuleError::ManagerHasReports);
    }

    Ok(ValidEmployee {
        emp_id: emp_id.to_string(),
        name: name.to_string(),
        email,
        role,
        manager_email,
        password: password.map(str::to_string),
    })
}

fn invalid_domain(policy: &EmployeePolicy) -> EmployeeRuleError {
    EmployeeRuleError::InvalidDomain {
        domain: policy.email_domain.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> EmployeePolicy {
        EmployeePolicy {
            email_domain: "@pal.tech".to_string(),
            hr_email: "hr@pal.tech".to_string(),
        }
    }

    fn draft() -> EmployeeDraft {
        EmployeeDraft {
            emp_id: "PT-10".to_string(),
            name: "Ann Lee".to_string(),
            email: " Ann.Lee@pal.tech ".to_string(),
            role: Some(Role::Employee),
            manager_email: Some("boss@pal.tech".to_string()),
            password: Some("secret1".to_string()),
        }
    }

    fn ok_checks() -> EmployeeChecks {
        EmployeeChecks {
            manager_exists: true,
            ..EmployeeChecks::default()
        }
    }

    #[test]
    fn valid_employee_is_normalised() {
        let valid = validate_employee(&draft(), &ok_checks(), &policy(), true).unwrap();
        assert_eq!(valid.email, "ann.lee@pal.tech");
        assert_eq!(valid.manager_email, "boss@pal.tech");
        assert_eq!(valid.password.as_deref(), Some("secret1"));
    }

    #[test]
    fn required_fields_come_first() {
        let mut d = draft();
        d.name = "  ".to_string();
        let checks = EmployeeChecks {
            emp_id_taken: true,
            ..ok_checks()
        };
        assert_eq!(
            validate_employee(&d, &checks, &policy(), true),
            Err(EmployeeRuleError::MissingField("name"))
        );

        let mut d = draft();
        d.password = None;
        assert_eq!(
            validate_employee(&d, &ok_checks(), &policy(), true),
            Err(EmployeeRuleError::MissingField("password"))
        );
        assert!(validate_employee(&d, &ok_checks(), &policy(), false).is_ok());
    }

    #[test]
    fn duplicate_id_is_reported_before_domain() {
        let mut d = draft();
        d.email = "ann@gmail.com".to_string();
        let checks = EmployeeChecks {
            emp_id_taken: true,
            ..ok_checks()
        };
        assert_eq!(
            validate_employee(&d, &checks, &policy(), true),
            Err(EmployeeRuleError::DuplicateEmployeeId)
        );
        assert_eq!(
            validate_employee(&d, &ok_checks(), &policy(), true).unwrap_err().to_string(),
            "Include domain ,include @pal.tech "
        );
    }

    #[test]
    fn duplicate_email_and_short_password() {
        let checks = EmployeeChecks {
            email_taken: true,
            ..ok_checks()
        };
        assert_eq!(
            validate_employee(&draft(), &checks, &policy(), true),
            Err(EmployeeRuleError::DuplicateEmail)
        );

        let mut d = draft();
        d.password = Some("12345".to_string());
        let err = validate_employee(&d, &ok_checks(), &policy(), true).unwrap_err();
        assert_eq!(err, EmployeeRuleError::PasswordTooShort);
        assert_eq!(err.to_string(), "Password minimum length is 6");
    }

    #[test]
    fn employees_need_an_existing_manager() {
        let mut d = draft();
        d.manager_email = None;
        assert_eq!(
            validate_employee(&d, &ok_checks(), &policy(), true),
            Err(EmployeeRuleError::ManagerNotFound)
        );

        let missing = EmployeeChecks::default();
        assert_eq!(
            validate_employee(&draft(), &missing, &policy(), true),
            Err(EmployeeRuleError::ManagerNotFound)
        );

        let mut d = draft();
        d.manager_email = Some("boss@elsewhere.com".to_string());
        assert!(matches!(
            validate_employee(&d, &ok_checks(), &policy(), true),
            Err(EmployeeRuleError::InvalidDomain { .. })
        ));
    }

    #[test]
    fn employee_cannot_manage_themselves() {
        let mut d = draft();
        d.manager_email = Some("ANN.LEE@pal.tech".to_string());
        assert_eq!(
            validate_employee(&d, &ok_checks(), &policy(), false),
            Err(EmployeeRuleError::ManagerNotFound)
        );
    }

    #[test]
    fn manager_with_reports_keeps_the_role() {
        let checks = EmployeeChecks {
            has_reports: true,
            ..ok_checks()
        };
        assert_eq!(
            validate_employee(&draft(), &checks, &policy(), false),
            Err(EmployeeRuleError::ManagerHasReports)
        );

        let mut d = draft();
        d.role = Some(Role::Manager);
        let valid = validate_employee(&d, &checks, &policy(), false).unwrap();
        assert_eq!(valid.role, Role::Manager);
    }

    #[test]
    fn managers_report_to_hr() {
        let mut d = draft();
        d.role = Some(Role::Manager);
        d.manager_email = Some("someone@pal.tech".to_string());
        let valid = validate_employee(&d, &EmployeeChecks::default(), &policy(), true).unwrap();
        assert_eq!(valid.manager_email, "hr@pal.tech");
    }

    #[test]
    fn hr_role_cannot_be_assigned() {
        let mut d = draft();
        d.role = Some(Role::Hr);
        assert_eq!(
            validate_employee(&d, &ok_checks(), &policy(), true),
            Err(EmployeeRuleError::RoleNotAssignable(Role::Hr))
        );
    }
}
