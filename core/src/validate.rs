//! Client-side input checks.
//!
//! The same limits the forms enforce: a request that would fail these never
//! leaves the process. Lengths count characters, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ApiError, FieldError};
use crate::types::{CategoryInput, TodoInput};

pub const TITLE_MAX: usize = 255;
pub const DESCRIPTION_MAX: usize = 1000;
pub const CATEGORY_NAME_MIN: usize = 2;
pub const CATEGORY_NAME_MAX: usize = 50;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern compiles"));

pub fn is_hex_color(color: &str) -> bool {
    HEX_COLOR.is_match(color)
}

pub fn validate_todo(input: &TodoInput) -> Result<(), ApiError> {
    let mut fields = Vec::new();

    let title = input.title.trim();
    if title.is_empty() {
        fields.push(FieldError::new("title", "title is required"));
    } else if input.title.chars().count() > TITLE_MAX {
        fields.push(FieldError::new(
            "title",
            format!("title must be at most {TITLE_MAX} characters"),
        ));
    }

    if input.description.chars().count() > DESCRIPTION_MAX {
        fields.push(FieldError::new(
            "description",
            format!("description must be at most {DESCRIPTION_MAX} characters"),
        ));
    }

    finish(fields)
}

pub fn validate_category(input: &CategoryInput) -> Result<(), ApiError> {
    let mut fields = Vec::new();

    let name_len = input.name.trim().chars().count();
    if name_len == 0 {
        fields.push(FieldError::new("name", "name is required"));
    } else if !(CATEGORY_NAME_MIN..=CATEGORY_NAME_MAX).contains(&name_len) {
        fields.push(FieldError::new(
            "name",
            format!("name must be {CATEGORY_NAME_MIN}-{CATEGORY_NAME_MAX} characters"),
        ));
    }

    if !is_hex_color(&input.color) {
        fields.push(FieldError::new(
            "color",
            "color must be a hex color like #3B82F6",
        ));
    }

    finish(fields)
}

fn finish(fields: Vec<FieldError>) -> Result<(), ApiError> {
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(fields))
    }
}
