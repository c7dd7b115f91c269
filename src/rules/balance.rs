use serde::Serialize;
use utoipa::ToSchema;

use crate::model::leave::{LeaveRecord, LeaveType};

/// Paid days granted per employee per year.
pub const ANNUAL_PAID_ALLOWANCE: u32 = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveBalance {
    #[schema(example = 5)]
    pub paid_days: u32,
    #[schema(example = 2)]
    pub unpaid_days: u32,
}

impl LeaveBalance {
    /// Paid days still available. Negative only after an administrative
    /// override booked more than the allowance.
    pub fn remaining_paid(&self, allowance: u32) -> i64 {
        i64::from(allowance) - i64::from(self.paid_days)
    }
}

/// Totals paid and unpaid days over records that are neither cancelled nor
/// rejected. Order of the input does not matter.
pub fn compute_leave_balance<'a, I>(records: I) -> LeaveBalance
where
    I: IntoIterator<Item = &'a LeaveRecord>,
{
    records
        .into_iter()
        .filter(|leave| leave.status.is_counted())
        .fold(LeaveBalance::default(), |mut balance, leave| {
            match leave.leave_type {
                LeaveType::Paid => balance.paid_days += leave.day_difference,
                LeaveType::Unpaid => balance.unpaid_days += leave.day_difference,
            }
            balance
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave::LeaveStatus;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn leave(leave_type: LeaveType, status: LeaveStatus, days: u32) -> LeaveRecord {
        LeaveRecord {
            id: None,
            employee_id: "PT-1".to_string(),
            email: "ann@pal.tech".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            leave_type,
            reason: "rest".to_string(),
            day_difference: days,
            status,
            responded_by: None,
        }
    }

    #[test]
    fn empty_history_has_zero_balance() {
        let records: Vec<LeaveRecord> = Vec::new();
        let balance = compute_leave_balance(&records);
        assert_eq!(balance, LeaveBalance::default());
        assert_eq!(balance.remaining_paid(ANNUAL_PAID_ALLOWANCE), 20);
    }

    #[test]
    fn cancelled_and_rejected_are_not_counted() {
        let records = vec![
            leave(LeaveType::Paid, LeaveStatus::Approved, 3),
            leave(LeaveType::Paid, LeaveStatus::Pending, 2),
            leave(LeaveType::Paid, LeaveStatus::Cancelled, 4),
            leave(LeaveType::Unpaid, LeaveStatus::Rejected, 6),
            leave(LeaveType::Unpaid, LeaveStatus::Approved, 1),
        ];
        let balance = compute_leave_balance(&records);
        assert_eq!(balance.paid_days, 5);
        assert_eq!(balance.unpaid_days, 1);
        assert_eq!(balance.remaining_paid(ANNUAL_PAID_ALLOWANCE), 15);
    }

    #[test]
    fn remaining_can_go_negative_after_override() {
        let records = vec![leave(LeaveType::Paid, LeaveStatus::Approved, 23)];
        assert_eq!(compute_leave_balance(&records).remaining_paid(20), -3);
    }

    fn arb_leave() -> impl Strategy<Value = LeaveRecord> {
        let leave_type = prop_oneof![Just(LeaveType::Paid), Just(LeaveType::Unpaid)];
        let status = prop_oneof![
            Just(LeaveStatus::Pending),
            Just(LeaveStatus::Approved),
            Just(LeaveStatus::Rejected),
            Just(LeaveStatus::Cancelled),
        ];
        (leave_type, status, 1u32..60).prop_map(|(t, s, d)| leave(t, s, d))
    }

    proptest! {
        #[test]
        fn totals_never_exceed_booked_days(records in prop::collection::vec(arb_leave(), 0..40)) {
            let balance = compute_leave_balance(&records);
            let booked: u32 = records.iter().map(|r| r.day_difference).sum();
            prop_assert!(balance.paid_days + balance.unpaid_days <= booked);

            if records.iter().all(|r| r.status.is_counted()) {
                prop_assert_eq!(balance.paid_days + balance.unpaid_days, booked);
            }
        }

        #[test]
        fn balance_is_idempotent_and_order_free(records in prop::collection::vec(arb_leave(), 0..40)) {
            let first = compute_leave_balance(&records);
            prop_assert_eq!(first, compute_leave_balance(&records));

            let mut reversed = records.clone();
            reversed.reverse();
            prop_assert_eq!(first, compute_leave_balance(&reversed));
        }
    }
}
