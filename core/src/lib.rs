//! Request/response core of the todo and category API client.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). Whoever owns a transport
//! executes the round-trip, which keeps this crate deterministic and
//! testable with plain data.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Every endpoint is split into `build_*` (produces a request) and
//!   `parse_*` (consumes a response), so the I/O boundary is explicit.
//! - Form limits are checked in `build_*`; an invalid input never becomes a
//!   request.
//! - `ListQuery` leaves unset filters out of the query string.
//! - `Statistics` derives the summary counters from one fetched page.

pub mod client;
pub mod error;
pub mod http;
pub mod query;
pub mod stats;
pub mod types;
pub mod validate;

pub use client::TodoClient;
pub use error::{ApiError, FieldError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::ListQuery;
pub use stats::Statistics;
pub use types::{
    Category, CategoryId, CategoryInput, Pagination, Priority, SortField, SortOrder, Todo,
    TodoId, TodoInput, TodoPage,
};
