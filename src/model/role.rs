use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Hr,
    Manager,
    Employee,
}

impl Role {
    /// Roles that submit their own leave requests.
    pub fn has_leave_profile(&self) -> bool {
        matches!(self, Role::Manager | Role::Employee)
    }

    /// Roles that can be given through the employee form.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Role::Manager | Role::Employee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_codes_are_lowercase() {
        assert_eq!(Role::Hr.to_string(), "hr");
        assert_eq!(Role::Manager.as_ref(), "manager");
        assert_eq!(Role::from_str("employee").unwrap(), Role::Employee);
        assert!(Role::from_str("admin").is_err());
    }

    #[test]
    fn hr_has_no_leave_profile() {
        assert!(!Role::Hr.has_leave_profile());
        assert!(Role::Manager.has_leave_profile());
        assert!(!Role::Hr.is_assignable());
    }

    #[test]
    fn role_serde_matches_codes() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
        let role: Role = serde_json::from_str("\"hr\"").unwrap();
        assert_eq!(role, Role::Hr);
    }
}
