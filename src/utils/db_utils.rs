use sqlx::mysql::MySqlArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{MySql, MySqlPool};

use crate::model::employee::{Employee, EmployeeRow};
use crate::model::leave::{LeaveRecord, LeaveRow, records_from_rows};
use crate::model::role::Role;

pub const EMPLOYEE_COLUMNS: &str = "id, emp_id, name, email, role, manager_email, password";

pub const LEAVE_COLUMNS: &str = "id, employee_id, email, start_date, end_date, leave_type, \
     reason, day_difference, status, responded_by, created_at";

/// Bindable value of a list filter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
}

/// `WHERE` clause assembled from optional filters, bound in push order.
#[derive(Debug, Default)]
pub struct Filters {
    conditions: Vec<String>,
    values: Vec<SqlValue>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `condition` (with one `?` per value) joined by `AND`.
    pub fn push(&mut self, condition: &str, values: impl IntoIterator<Item = SqlValue>) -> &mut Self {
        self.conditions.push(condition.to_string());
        self.values.extend(values);
        self
    }

    pub fn eq(&mut self, column: &str, value: SqlValue) -> &mut Self {
        self.push(&format!("{column} = ?"), [value])
    }

    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn bind_rows<'q, O>(
        &self,
        mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    ) -> QueryAs<'q, MySql, O, MySqlArguments> {
        for value in &self.values {
            query = match value.clone() {
                SqlValue::String(v) => query.bind(v),
                SqlValue::U64(v) => query.bind(v),
            };
        }
        query
    }

    pub fn bind_scalar<'q, O>(
        &self,
        mut query: QueryScalar<'q, MySql, O, MySqlArguments>,
    ) -> QueryScalar<'q, MySql, O, MySqlArguments> {
        for value in &self.values {
            query = match value.clone() {
                SqlValue::String(v) => query.bind(v),
                SqlValue::U64(v) => query.bind(v),
            };
        }
        query
    }
}

fn employee_from_row(row: EmployeeRow) -> Option<Employee> {
    let id = row.id;
    match Employee::try_from(row) {
        Ok(employee) => Some(employee),
        Err(e) => {
            tracing::warn!(employee_id = id, error = %e, "Skipping employee row");
            None
        }
    }
}

pub fn employees_from_rows(rows: Vec<EmployeeRow>) -> Vec<Employee> {
    rows.into_iter().filter_map(employee_from_row).collect()
}

pub async fn fetch_employee_by_email(
    pool: &MySqlPool,
    email: &str,
) -> Result<Option<Employee>, sqlx::Error> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = ?");
    let row = sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row.and_then(employee_from_row))
}

pub async fn fetch_employee_by_id(pool: &MySqlPool, id: u64) -> Result<Option<Employee>, sqlx::Error> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
    let row = sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.and_then(employee_from_row))
}

/// Looks up by business id (`emp_id`), which tokens carry as `employee_id`.
pub async fn fetch_employee_by_emp_id(
    pool: &MySqlPool,
    emp_id: &str,
) -> Result<Option<Employee>, sqlx::Error> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE emp_id = ?");
    let row = sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(emp_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.and_then(employee_from_row))
}

pub async fn manager_exists(pool: &MySqlPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE email = ? AND role = ? LIMIT 1)",
    )
    .bind(email)
    .bind(Role::Manager.as_ref())
    .fetch_one(pool)
    .await
}

pub async fn has_reports(pool: &MySqlPool, manager_email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE manager_email = ? LIMIT 1)",
    )
    .bind(manager_email)
    .fetch_one(pool)
    .await
}

pub async fn fetch_managers(pool: &MySqlPool) -> Result<Vec<Employee>, sqlx::Error> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE role = ? ORDER BY name");
    let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(Role::Manager.as_ref())
        .fetch_all(pool)
        .await?;
    Ok(employees_from_rows(rows))
}

/// Every leave of one requester, the snapshot the rule checks run against.
pub async fn fetch_leaves_for_email(
    pool: &MySqlPool,
    email: &str,
) -> Result<Vec<LeaveRecord>, sqlx::Error> {
    let sql = format!("SELECT {LEAVE_COLUMNS} FROM leaves WHERE email = ?");
    let rows = sqlx::query_as::<_, LeaveRow>(&sql)
        .bind(email)
        .fetch_all(pool)
        .await?;
    Ok(records_from_rows(&rows))
}

pub async fn fetch_leave(pool: &MySqlPool, id: u64) -> Result<Option<LeaveRow>, sqlx::Error> {
    let sql = format!("SELECT {LEAVE_COLUMNS} FROM leaves WHERE id = ?");
    sqlx::query_as::<_, LeaveRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Leaves of everyone whose manager is `manager_email`, newest first.
pub async fn fetch_team_leaves(
    pool: &MySqlPool,
    manager_email: &str,
) -> Result<Vec<LeaveRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM leaves l \
         JOIN employees e ON e.email = l.email \
         WHERE e.manager_email = ? \
         ORDER BY l.created_at DESC, l.id DESC",
        prefixed_leave_columns("l")
    );
    sqlx::query_as::<_, LeaveRow>(&sql)
        .bind(manager_email)
        .fetch_all(pool)
        .await
}

/// Manager email of the employee who owns `email`, if they still exist.
pub async fn fetch_manager_of(pool: &MySqlPool, email: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT manager_email FROM employees WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

fn prefixed_leave_columns(alias: &str) -> String {
    LEAVE_COLUMNS
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_have_no_where() {
        let filters = Filters::new();
        assert_eq!(filters.where_clause(), "");
        assert!(filters.values().is_empty());
    }

    #[test]
    fn filters_join_with_and_in_push_order() {
        let mut filters = Filters::new();
        filters
            .eq("status", SqlValue::String("pending".into()))
            .push(
                "(name LIKE ? OR email LIKE ?)",
                [SqlValue::String("%an%".into()), SqlValue::String("%an%".into())],
            )
            .eq("id", SqlValue::U64(7));
        assert_eq!(
            filters.where_clause(),
            "WHERE status = ? AND (name LIKE ? OR email LIKE ?) AND id = ?"
        );
        assert_eq!(filters.values().len(), 4);
        assert_eq!(filters.values()[3], SqlValue::U64(7));
    }

    #[test]
    fn team_query_qualifies_every_column() {
        let cols = prefixed_leave_columns("l");
        assert!(cols.starts_with("l.id, l.employee_id"));
        assert!(cols.ends_with("l.created_at"));
        assert!(!cols.contains("l. "));
    }
}
