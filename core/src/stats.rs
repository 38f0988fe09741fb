//! Summary counters shown above the todo list.
//!
//! `total` is the backend's match count for the active filters, but the
//! `active` / `completed` split only looks at the rows of the fetched page.
//! With more than one page the progress figure therefore understates the
//! real completion rate.

use serde::{Deserialize, Serialize};

use crate::types::TodoPage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: u64,
    pub active: u64,
    pub completed: u64,
    /// Whole percent, rounded half up.
    pub progress: u8,
}

impl Statistics {
    pub fn from_page(page: &TodoPage) -> Self {
        let completed = page.data.iter().filter(|t| t.completed).count() as u64;
        let active = page.data.len() as u64 - completed;
        let total = page.pagination.total;
        Self {
            total,
            active,
            completed,
            progress: percent(completed, total),
        }
    }
}

fn percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part * 200 + whole) / (whole * 2);
    rounded.min(100) as u8
}
