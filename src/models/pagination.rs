use crate::error::app_error::AppError;
use rocket::serde::Serialize;
use schemars::JsonSchema;

/// `limit`/`offset` query parameters as received.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A checked page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

impl OffsetParams {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    /// Oversized limits are capped; zero or negative values are rejected.
    #[allow(clippy::result_large_err)]
    pub fn window(&self) -> Result<PageWindow, AppError> {
        let limit = match self.limit {
            Some(limit) if limit < 1 => return Err(AppError::BadRequest("limit must be at least 1".to_string())),
            Some(limit) => limit.min(Self::MAX_LIMIT),
            None => Self::DEFAULT_LIMIT,
        };
        let offset = match self.offset {
            Some(offset) if offset < 0 => return Err(AppError::BadRequest("offset must not be negative".to_string())),
            Some(offset) => offset,
            None => 0,
        };

        Ok(PageWindow { limit, offset })
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct OffsetPage<T> {
    pub data: Vec<T>,
    pub limit: i64,
    pub offset: i64,
    /// Total number of items across all pages
    pub total_items: i64,
}

impl<T> OffsetPage<T> {
    pub fn new(data: Vec<T>, window: PageWindow, total_items: i64) -> Self {
        Self {
            data,
            limit: window.limit,
            offset: window.offset,
            total_items,
        }
    }
}
