use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Paid,
    Unpaid,
}

/// Lifecycle state of a leave request.
///
/// The stored codes for decisions are `approve` and `reject`; the label
/// spellings `approved` and `rejected` parse to the same variants.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
pub enum LeaveStatus {
    #[serde(rename = "pending")]
    #[strum(to_string = "pending")]
    Pending,
    #[serde(rename = "approve")]
    #[strum(to_string = "approve", serialize = "approved")]
    Approved,
    #[serde(rename = "reject")]
    #[strum(to_string = "reject", serialize = "rejected")]
    Rejected,
    #[serde(rename = "cancelled")]
    #[strum(to_string = "cancelled")]
    Cancelled,
}

impl LeaveStatus {
    /// Whether a record in this state still consumes days and blocks its range.
    pub fn is_counted(&self) -> bool {
        !matches!(self, LeaveStatus::Cancelled | LeaveStatus::Rejected)
    }
}

/// Action a user asks to perform on an existing leave request.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActionType {
    Modify,
    Approve,
    Reject,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRecord {
    pub id: Option<u64>,
    pub employee_id: String,
    pub email: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: String,
    pub day_difference: u32,
    pub status: LeaveStatus,
    pub responded_by: Option<String>,
}

/// Raw `leaves` row; enum columns are kept as their stored codes.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeaveRow {
    pub id: u64,
    pub employee_id: String,
    pub email: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: String,
    pub reason: String,
    pub day_difference: u32,
    pub status: String,
    pub responded_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised {field} code '{value}'")]
pub struct CodeError {
    pub field: &'static str,
    pub value: String,
}

impl TryFrom<&LeaveRow> for LeaveRecord {
    type Error = CodeError;

    fn try_from(row: &LeaveRow) -> Result<Self, Self::Error> {
        let leave_type = row.leave_type.parse::<LeaveType>().map_err(|_| CodeError {
            field: "leave_type",
            value: row.leave_type.clone(),
        })?;
        let status = row.status.parse::<LeaveStatus>().map_err(|_| CodeError {
            field: "status",
            value: row.status.clone(),
        })?;

        Ok(LeaveRecord {
            id: Some(row.id),
            employee_id: row.employee_id.clone(),
            email: row.email.clone(),
            start_date: row.start_date,
            end_date: row.end_date,
            leave_type,
            reason: row.reason.clone(),
            day_difference: row.day_difference,
            status,
            responded_by: row.responded_by.clone(),
        })
    }
}

/// Converts loaded rows into records, dropping rows with unknown codes.
pub fn records_from_rows(rows: &[LeaveRow]) -> Vec<LeaveRecord> {
    rows.iter()
        .filter_map(|row| match LeaveRecord::try_from(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(leave_id = row.id, error = %e, "Skipping leave row");
                None
            }
        })
        .collect()
}
