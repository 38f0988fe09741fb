use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern compiles"));

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub(crate) fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub category_id: Option<u64>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Debug, Deserialize)]
pub struct TodoInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl TodoInput {
    pub(crate) fn validate(&self) -> Result<(), AppError> {
        let mut fields = BTreeMap::new();
        if self.title.trim().is_empty() {
            fields.insert("title", "title is required".to_string());
        } else if self.title.chars().count() > 255 {
            fields.insert("title", "title must be less than 255 characters".to_string());
        }
        if self.description.chars().count() > 1000 {
            fields.insert(
                "description",
                "description must be less than 1000 characters".to_string(),
            );
        }
        AppError::from_fields(fields)
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub color: String,
}

impl CategoryInput {
    pub(crate) fn validate(&self) -> Result<(), AppError> {
        let mut fields = BTreeMap::new();
        let len = self.name.trim().chars().count();
        if len == 0 {
            fields.insert("name", "name is required".to_string());
        } else if !(2..=50).contains(&len) {
            fields.insert("name", "name must be between 2 and 50 characters".to_string());
        }
        if !HEX_COLOR.is_match(&self.color) {
            fields.insert(
                "color",
                "color must be a valid hex color (e.g., #3B82F6)".to_string(),
            );
        }
        AppError::from_fields(fields)
    }
}

/// Raw `GET /todos` parameters. Parsed leniently: anything unparseable
/// falls back to the default instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub completed: Option<String>,
    pub category_id: Option<String>,
    pub priority: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TodoPage {
    pub data: Vec<Todo>,
    pub pagination: Pagination,
}
