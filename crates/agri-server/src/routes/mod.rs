//! Route handlers, one module per resource.

pub mod auth;
pub mod blockchain;
pub mod farmers;
pub mod health;
pub mod iot;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;

use agri_core::repository::{MAX_PAGE_SIZE, PaginatedResult};
use agri_core::{AgriError, AgriResult};
use axum::Json;
use axum::http::HeaderName;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// `?limit=&offset=` for paged lists.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?limit=` for "most recent" views.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    pub fn resolve(&self, default: usize) -> AgriResult<usize> {
        match self.limit {
            None => Ok(default),
            Some(l) if l < 0 => Err(AgriError::validation(
                "limit must be a non-negative integer",
            )),
            Some(l) => Ok((l as u64).min(MAX_PAGE_SIZE) as usize),
        }
    }
}

/// Render a page as a JSON array with the total in `X-Total-Count`.
pub fn paged<T: Serialize>(page: PaginatedResult<T>) -> Response {
    (
        [(TOTAL_COUNT_HEADER, page.total.to_string())],
        Json(page.items),
    )
        .into_response()
}
