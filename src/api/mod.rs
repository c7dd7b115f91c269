pub mod employee;
pub mod error;
pub mod leave_request;

use serde::Serialize;
use utoipa::ToSchema;

/// Body of every error and acknowledgement response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Leave approved")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Clamps `page`/`per_page` query values and returns `(page, per_page, offset)`.
pub(crate) fn paging(page: Option<u32>, per_page: Option<u32>, default_per_page: u32) -> (u32, u32, u64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(default_per_page).clamp(1, 100);
    let offset = u64::from(page - 1) * u64::from(per_page);
    (page, per_page, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_defaults_and_bounds() {
        assert_eq!(paging(None, None, 10), (1, 10, 0));
        assert_eq!(paging(Some(0), Some(500), 10), (1, 100, 0));
        assert_eq!(paging(Some(3), Some(20), 10), (3, 20, 40));
    }
}
