use thiserror::Error;

use crate::model::leave::{ActionType, LeaveStatus};

/// Maps a stored status code to the label shown to users.
pub fn normalize_status_label(status: &str) -> String {
    match status {
        "approve" => "approved".to_string(),
        "reject" => "rejected".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot {action} a leave request that is {}", .from.label())]
pub struct TransitionError {
    pub from: LeaveStatus,
    pub action: ActionType,
}

impl LeaveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }

    /// Status after `action`. Only pending requests move; approved, rejected
    /// and cancelled are final.
    pub fn apply(self, action: ActionType) -> Result<LeaveStatus, TransitionError> {
        match (self, action) {
            (LeaveStatus::Pending, ActionType::Modify) => Ok(LeaveStatus::Pending),
            (LeaveStatus::Pending, ActionType::Approve) => Ok(LeaveStatus::Approved),
            (LeaveStatus::Pending, ActionType::Reject) => Ok(LeaveStatus::Rejected),
            (LeaveStatus::Pending, ActionType::Cancel) => Ok(LeaveStatus::Cancelled),
            (from, action) => Err(TransitionError { from, action }),
        }
    }
}
