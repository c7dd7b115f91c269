use thiserror::Error;

/// Business-rule outcomes of a leave submission.
///
/// These are expected results, returned as values; the HTTP layer turns
/// each one into a message for the user to correct and resubmit.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LeaveRuleError {
    #[error("Invalid date format")]
    InvalidDateFormat,

    #[error("End date should be greater than start date.")]
    InvalidDateRange,

    #[error("You have already applied for leave on these dates")]
    DuplicateLeaveRange,

    #[error("Your paid leaves are not enough!")]
    InsufficientPaidBalance,

    #[error("Form not updated, please try again!")]
    NoChangeDetected,
}
