//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the HTTP round-trip, keeping the core deterministic
//! and free of I/O dependencies. Inputs are validated in `build_*`, so an
//! invalid form fails before any request exists.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FieldError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::ListQuery;
use crate::types::{Category, CategoryId, CategoryInput, Todo, TodoId, TodoInput, TodoPage};
use crate::validate::{validate_category, validate_todo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- todos --

    pub fn build_list_todos(&self, query: &ListQuery) -> Result<HttpRequest, ApiError> {
        let qs = query.to_query_string()?;
        let path = if qs.is_empty() {
            format!("{}/todos", self.base_url)
        } else {
            format!("{}/todos?{qs}", self.base_url)
        };
        Ok(HttpRequest::empty(HttpMethod::Get, path))
    }

    pub fn build_get_todo(&self, id: TodoId) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Get, self.todo_path(id))
    }

    pub fn build_create_todo(&self, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        validate_todo(input)?;
        let body = to_json(input)?;
        Ok(HttpRequest::json(
            HttpMethod::Post,
            format!("{}/todos", self.base_url),
            body,
        ))
    }

    pub fn build_update_todo(&self, id: TodoId, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        validate_todo(input)?;
        let body = to_json(input)?;
        Ok(HttpRequest::json(HttpMethod::Put, self.todo_path(id), body))
    }

    pub fn build_delete_todo(&self, id: TodoId) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Delete, self.todo_path(id))
    }

    /// The server flips `completed` itself; no body is sent.
    pub fn build_toggle_complete(&self, id: TodoId) -> HttpRequest {
        HttpRequest::empty(
            HttpMethod::Patch,
            format!("{}/complete", self.todo_path(id)),
        )
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<TodoPage, ApiError> {
        check_status(&response, &[200])?;
        from_json(&response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, &[200])?;
        from_json(&response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, &[201])?;
        from_json(&response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, &[200])?;
        from_json(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[204, 200])
    }

    pub fn parse_toggle_complete(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, &[200])?;
        from_json(&response)
    }

    // -- categories --

    pub fn build_list_categories(&self) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Get, format!("{}/categories", self.base_url))
    }

    pub fn build_get_category(&self, id: CategoryId) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Get, self.category_path(id))
    }

    pub fn build_create_category(&self, input: &CategoryInput) -> Result<HttpRequest, ApiError> {
        validate_category(input)?;
        let body = to_json(input)?;
        Ok(HttpRequest::json(
            HttpMethod::Post,
            format!("{}/categories", self.base_url),
            body,
        ))
    }

    pub fn build_update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<HttpRequest, ApiError> {
        validate_category(input)?;
        let body = to_json(input)?;
        Ok(HttpRequest::json(HttpMethod::Put, self.category_path(id), body))
    }

    pub fn build_delete_category(&self, id: CategoryId) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Delete, self.category_path(id))
    }

    pub fn parse_list_categories(&self, response: HttpResponse) -> Result<Vec<Category>, ApiError> {
        check_status(&response, &[200])?;
        from_json(&response)
    }

    pub fn parse_get_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        check_status(&response, &[200])?;
        from_json(&response)
    }

    pub fn parse_create_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        check_status(&response, &[201])?;
        from_json(&response)
    }

    pub fn parse_update_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        check_status(&response, &[200])?;
        from_json(&response)
    }

    pub fn parse_delete_category(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[204, 200])
    }

    fn todo_path(&self, id: TodoId) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    fn category_path(&self, id: CategoryId) -> String {
        format!("{}/categories/{id}", self.base_url)
    }
}

/// Error payload the backend sends with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }

    let parsed: Option<ErrorBody> = serde_json::from_str(&response.body).ok();
    let message = parsed
        .as_ref()
        .and_then(|b| b.error.clone())
        .unwrap_or_else(|| response.body.trim().to_string());

    match response.status {
        400 | 422 => {
            let fields = parsed
                .map(|b| {
                    b.fields
                        .into_iter()
                        .map(|(field, message)| FieldError { field, message })
                        .collect()
                })
                .unwrap_or_default();
            Err(ApiError::Validation { message, fields })
        }
        status => Err(ApiError::Api { status, message }),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
