//! Leave accounting and conflict rules.
//!
//! Everything here is synchronous and pure: callers load the subject's
//! records, hand them over as slices, and persist whatever is accepted.

pub mod balance;
pub mod employee;
pub mod error;
pub mod overlap;
pub mod status;

pub use balance::{ANNUAL_PAID_ALLOWANCE, LeaveBalance, compute_leave_balance};
pub use error::LeaveRuleError;
pub use overlap::LeavePolicy;
pub use status::{TransitionError, normalize_status_label};
