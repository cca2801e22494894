//! `?page=&per_page=` query parameters.

use serde::Deserialize;

use ecodeli_core::types::pagination::PageRequest;

/// Query parameters for paginated endpoints. Out-of-range values are
/// clamped by `PageRequest::new`, never rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page", alias = "page_size")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl PaginationParams {
    pub fn into_page_request(self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page":0,"per_page":5000}"#).unwrap();
        let page = params.into_page_request();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 100);
    }

    #[test]
    fn accepts_page_size_alias() {
        let params: PaginationParams = serde_json::from_str(r#"{"page_size":7}"#).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 7);
    }
}
