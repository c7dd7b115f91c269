use chrono::NaiveDate;

use crate::model::leave::{LeaveRecord, LeaveType};
use crate::rules::balance::{ANNUAL_PAID_ALLOWANCE, compute_leave_balance};
use crate::rules::error::LeaveRuleError;

/// Quota settings the validator checks paid requests against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeavePolicy {
    pub annual_paid_allowance: u32,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            annual_paid_allowance: ANNUAL_PAID_ALLOWANCE,
        }
    }
}

impl LeavePolicy {
    pub fn new(annual_paid_allowance: u32) -> Self {
        Self {
            annual_paid_allowance,
        }
    }

    /// Decides whether `[start_date, end_date]` may be submitted, returning
    /// its inclusive day count.
    ///
    /// `exclude` is the stored version of a record being edited. It is left
    /// out of both the conflict scan and the paid total, so the check reads
    /// "would swapping the old range for the new one stay within allowance".
    pub fn validate_range(
        &self,
        records: &[LeaveRecord],
        start_date: &str,
        end_date: &str,
        leave_type: LeaveType,
        exclude: Option<&LeaveRecord>,
    ) -> Result<u32, LeaveRuleError> {
        let (start, end) = parse_leave_range(start_date, end_date)?;

        let others: Vec<&LeaveRecord> = records
            .iter()
            .filter(|leave| !is_excluded(leave, exclude))
            .collect();

        let conflict = others.iter().any(|leave| {
            leave.status.is_counted()
                && ranges_overlap(start, end, leave.start_date, leave.end_date)
        });
        if conflict {
            return Err(LeaveRuleError::DuplicateLeaveRange);
        }

        let candidate_days = day_difference(start, end);

        if leave_type == LeaveType::Paid {
            let used = compute_leave_balance(others.iter().copied()).paid_days;
            let left = i64::from(self.annual_paid_allowance)
                - i64::from(used)
                - i64::from(candidate_days);
            if left < 0 {
                return Err(LeaveRuleError::InsufficientPaidBalance);
            }
        }

        Ok(candidate_days)
    }
}

/// [`LeavePolicy::validate_range`] under the default allowance.
#[cfg_attr(not(test), allow(dead_code))]
pub fn validate_leave_range(
    records: &[LeaveRecord],
    start_date: &str,
    end_date: &str,
    leave_type: LeaveType,
    exclude: Option<&LeaveRecord>,
) -> Result<u32, LeaveRuleError> {
    LeavePolicy::default().validate_range(records, start_date, end_date, leave_type, exclude)
}

pub fn parse_leave_date(value: &str) -> Result<NaiveDate, LeaveRuleError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| LeaveRuleError::InvalidDateFormat)
}

/// Parses both ends and rejects a start after the end.
pub fn parse_leave_range(
    start_date: &str,
    end_date: &str,
) -> Result<(NaiveDate, NaiveDate), LeaveRuleError> {
    let start = parse_leave_date(start_date)?;
    let end = parse_leave_date(end_date)?;
    if start > end {
        return Err(LeaveRuleError::InvalidDateRange);
    }
    Ok((start, end))
}

/// Inclusive number of calendar days in `[start, end]`; `start <= end`.
pub fn day_difference(start: NaiveDate, end: NaiveDate) -> u32 {
    ((end - start).num_days() + 1).max(0) as u32
}

/// Inclusive-endpoint interval overlap.
pub fn ranges_overlap(
    start: NaiveDate,
    end: NaiveDate,
    other_start: NaiveDate,
    other_end: NaiveDate,
) -> bool {
    (start >= other_start && start <= other_end)
        || (end >= other_start && end <= other_end)
        || (other_start >= start && other_end <= end)
}

fn is_excluded(leave: &LeaveRecord, exclude: Option<&LeaveRecord>) -> bool {
    match exclude {
        Some(original) if original.id.is_some() => leave.id == original.id,
        Some(original) => leave == original,
        None => false,
    }
}

/// Rejects an edit that leaves dates, type and reason as they were.
pub fn ensure_changed(
    original: &LeaveRecord,
    start_date: NaiveDate,
    end_date: NaiveDate,
    leave_type: LeaveType,
    reason: &str,
) -> Result<(), LeaveRuleError> {
    let unchanged = original.start_date == start_date
        && original.end_date == end_date
        && original.leave_type == leave_type
        && original.reason == reason;
    if unchanged {
        return Err(LeaveRuleError::NoChangeDetected);
    }
    Ok(())
}
