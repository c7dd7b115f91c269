use serde::Serialize;
use utoipa::ToSchema;

use crate::model::leave::CodeError;
use crate::model::role::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "emp_id": "PT-001",
        "name": "John Doe",
        "email": "john.doe@pal.tech",
        "role": "employee",
        "manager_email": "jane.roe@pal.tech"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "PT-001")]
    pub emp_id: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@pal.tech")]
    pub email: String,

    pub role: Role,

    #[schema(example = "jane.roe@pal.tech")]
    pub manager_email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmployeeRow {
    pub id: u64,
    pub emp_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub manager_email: String,
    pub password: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = CodeError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(|_| CodeError {
            field: "role",
            value: row.role.clone(),
        })?;

        Ok(Employee {
            id: row.id,
            emp_id: row.emp_id,
            name: row.name,
            email: row.email,
            role,
            manager_email: row.manager_email,
            password_hash: row.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_never_serialised() {
        let employee = Employee {
            id: 3,
            emp_id: "PT-3".to_string(),
            name: "Ann".to_string(),
            email: "ann@pal.tech".to_string(),
            role: Role::Employee,
            manager_email: "boss@pal.tech".to_string(),
            password_hash: "$argon2id$secret".to_string(),
        };
        let value = serde_json::to_value(&employee).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["role"], "employee");
    }

    #[test]
    fn row_with_unknown_role_is_rejected() {
        let row = EmployeeRow {
            id: 1,
            emp_id: "PT-1".to_string(),
            name: "Bob".to_string(),
            email: "bob@pal.tech".to_string(),
            role: "admin".to_string(),
            manager_email: "hr@pal.tech".to_string(),
            password: "x".to_string(),
        };
        assert_eq!(Employee::try_from(row).unwrap_err().field, "role");
    }
}
