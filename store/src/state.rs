//! The store's view of the world: filter and paging state plus the
//! snapshot handed to subscribers.

use std::collections::BTreeSet;

use todo_api::{
    Category, CategoryId, ListQuery, Priority, SortField, SortOrder, Statistics, Todo, TodoId,
};

/// Paging, search and filter state.
///
/// Fields are private so the one rule that matters holds everywhere: any
/// change to the search text or a filter sends the list back to page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    page: u32,
    page_size: u32,
    search_query: String,
    completed: Option<bool>,
    category_id: Option<CategoryId>,
    priority: Option<Priority>,
}

impl FilterState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search_query: String::new(),
            completed: None,
            category_id: None,
            priority: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn completed(&self) -> Option<bool> {
        self.completed
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn has_active_filters(&self) -> bool {
        self.completed.is_some() || self.category_id.is_some() || self.priority.is_some()
    }

    /// Pages are 1-based; 0 is treated as 1.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Keeps the current page.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.page = 1;
    }

    pub fn set_completed(&mut self, completed: Option<bool>) {
        self.completed = completed;
        self.page = 1;
    }

    pub fn set_category_id(&mut self, category_id: Option<CategoryId>) {
        self.category_id = category_id;
        self.page = 1;
    }

    pub fn set_priority(&mut self, priority: Option<Priority>) {
        self.priority = priority;
        self.page = 1;
    }

    /// Drops the completion, category and priority filters. The search text
    /// stays.
    pub fn clear_filters(&mut self) {
        self.completed = None;
        self.category_id = None;
        self.priority = None;
        self.page = 1;
    }

    pub fn to_query(&self, sort_by: SortField, sort_order: SortOrder) -> ListQuery {
        ListQuery {
            page: Some(self.page),
            limit: Some(self.page_size),
            search: Some(self.search_query.clone()).filter(|s| !s.is_empty()),
            sort_by: Some(sort_by),
            sort_order: Some(sort_order),
            completed: self.completed,
            category_id: self.category_id,
            priority: self.priority,
        }
    }
}

/// Everything a view needs to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub todos: Vec<Todo>,
    pub categories: Vec<Category>,
    /// Set while the latest list request is in flight.
    pub loading: bool,
    pub statistics: Statistics,
    pub filters: FilterState,
    /// Backend match count for the current filters, across all pages.
    pub total: u64,
    /// Todos with a toggle request in flight.
    pub pending_toggles: BTreeSet<TodoId>,
    /// A mutation went through but the list could not be reloaded after it.
    pub list_stale: bool,
}

impl Snapshot {
    pub fn new(filters: FilterState) -> Self {
        Self {
            todos: Vec::new(),
            categories: Vec::new(),
            loading: false,
            statistics: Statistics::default(),
            filters,
            total: 0,
            pending_toggles: BTreeSet::new(),
            list_stale: false,
        }
    }

    pub fn todo(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn is_pending(&self, id: TodoId) -> bool {
        self.pending_toggles.contains(&id)
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.filters.page_size()))
    }

    /// False when everything fits on one page.
    pub fn needs_pagination(&self) -> bool {
        self.total > u64::from(self.filters.page_size())
    }
}
