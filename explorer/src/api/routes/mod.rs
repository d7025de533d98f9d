pub mod addresses;
pub mod blocks;
pub mod charts;
pub mod mempool;
pub mod names;
pub mod peers;
pub mod pool;
pub mod search;
pub mod status;
pub mod transactions;

use serde::Deserialize;

use crate::error::{ExplorerError, Result};

pub const MAX_PAGE_LIMIT: i64 = 50;
pub const DEFAULT_PAGE_LIMIT: i64 = 25;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageParams {
    /// Validated `(limit, offset)`; limits above the cap are an input error,
    /// not a silent clamp.
    pub fn resolve(&self) -> Result<(i64, i64)> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if limit < 1 || limit > MAX_PAGE_LIMIT {
            return Err(ExplorerError::Input(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ExplorerError::Input("offset must be non-negative".into()));
        }
        Ok((limit, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_bounded() {
        let params = PageParams {
            limit: Some(50),
            offset: Some(10),
        };
        assert_eq!(params.resolve().unwrap(), (50, 10));

        let params = PageParams {
            limit: Some(51),
            offset: None,
        };
        assert!(params.resolve().is_err());

        let params = PageParams {
            limit: None,
            offset: Some(-1),
        };
        assert!(params.resolve().is_err());
    }
}
