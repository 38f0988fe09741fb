//! The single source of truth for the todo UI.
//!
//! # Design
//! The snapshot lives in a `tokio::sync::watch` channel: every change
//! notifies subscribers, and readers only ever see whole snapshots.
//! Setters change filter state and then reload the list themselves, so a
//! view never has to remember to refresh.
//!
//! Several list requests may be in flight at once (typing in the search
//! box, flipping filters). Each refresh takes a number from a monotonically
//! increasing counter before it sends its request, and may only write the
//! snapshot if no newer refresh has started by the time its response
//! arrives. The check and the write happen under the channel's lock, so the
//! snapshot always shows the result of the most recently issued request.
//!
//! Mutations that fail leave the snapshot alone. Mutations that succeed
//! reload the list; if only that reload fails the caller still gets the
//! mutated value, and the snapshot is flagged `list_stale`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use todo_api::{
    ApiError, Category, CategoryId, CategoryInput, Priority, SortField,
    SortOrder, Statistics, Todo, TodoId, TodoInput,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::gateway::ApiGateway;
use crate::state::{FilterState, Snapshot};
use crate::transport::Transport;

/// How a list refresh ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The response was written to the snapshot.
    Applied,
    /// A newer refresh started first; this response was dropped.
    Superseded,
}

/// A mutation the server accepted.
#[derive(Debug)]
pub struct Mutation<T> {
    pub value: T,
    /// Set when the follow-up reload failed. The mutation still happened.
    pub refresh_error: Option<ApiError>,
}

impl<T> Mutation<T> {
    pub fn refresh_failed(&self) -> bool {
        self.refresh_error.is_some()
    }
}

/// Cheaply cloneable handle; clones share one snapshot.
pub struct TodoStore<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for TodoStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T> {
    gateway: ApiGateway<T>,
    state: watch::Sender<Snapshot>,
    latest_request: AtomicU64,
    sort_by: SortField,
    sort_order: SortOrder,
}

impl<T: Transport> TodoStore<T> {
    pub fn new(config: &StoreConfig, transport: T) -> Self {
        let snapshot = Snapshot::new(FilterState::new(config.page_size));
        let (state, _) = watch::channel(snapshot);
        Self {
            inner: Arc::new(Inner {
                gateway: ApiGateway::new(&config.base_url, transport),
                state,
                latest_request: AtomicU64::new(0),
                sort_by: config.sort_by,
                sort_order: config.sort_order,
            }),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.state.borrow().clone()
    }

    /// Receives every snapshot change from now on.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.state.subscribe()
    }

    /// Initial load: categories, then the first page of todos. Both are
    /// attempted even if the first fails.
    pub async fn load(&self) -> Result<(), ApiError> {
        let categories = self.refresh_categories().await;
        let todos = self.refresh_todos().await;
        categories?;
        todos.map(|_| ())
    }

    // -- list --

    pub async fn refresh_todos(&self) -> Result<Refresh, ApiError> {
        let token = self.inner.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let mut query = None;
        self.inner.state.send_modify(|s| {
            s.loading = true;
            query = Some(s.filters.to_query(self.inner.sort_by, self.inner.sort_order));
        });
        let query = query.unwrap_or_default();
        debug!(token, ?query, "refreshing todos");

        match self.inner.gateway.list_todos(&query).await {
            Ok(page) => {
                let statistics = Statistics::from_page(&page);
                let applied = self.inner.state.send_if_modified(|s| {
                    if !self.is_latest(token) {
                        return false;
                    }
                    s.total = page.pagination.total;
                    s.todos = page.data;
                    s.statistics = statistics;
                    s.loading = false;
                    s.list_stale = false;
                    true
                });
                if applied {
                    Ok(Refresh::Applied)
                } else {
                    debug!(token, "discarding stale todo list response");
                    Ok(Refresh::Superseded)
                }
            }
            Err(err) => {
                let latest = self.inner.state.send_if_modified(|s| {
                    if !self.is_latest(token) {
                        return false;
                    }
                    s.loading = false;
                    true
                });
                if latest {
                    warn!(token, error = %err, "failed to load todos");
                    Err(err)
                } else {
                    debug!(token, error = %err, "discarding stale todo list failure");
                    Ok(Refresh::Superseded)
                }
            }
        }
    }

    pub async fn refresh_categories(&self) -> Result<(), ApiError> {
        let categories = self
            .inner
            .gateway
            .list_categories()
            .await
            .inspect_err(|err| warn!(error = %err, "failed to load categories"))?;
        debug!(count = categories.len(), "loaded categories");
        self.inner.state.send_modify(|s| s.categories = categories);
        Ok(())
    }

    // -- paging and filters --

    pub async fn set_current_page(&self, page: u32) -> Result<Refresh, ApiError> {
        self.update_filters(|f| f.set_page(page));
        self.refresh_todos().await
    }

    pub async fn set_page_size(&self, page_size: u32) -> Result<Refresh, ApiError> {
        self.update_filters(|f| f.set_page_size(page_size));
        self.refresh_todos().await
    }

    /// Page and size together, as a pager reports them.
    pub async fn set_pagination(&self, page: u32, page_size: u32) -> Result<Refresh, ApiError> {
        self.update_filters(|f| {
            f.set_page_size(page_size);
            f.set_page(page);
        });
        self.refresh_todos().await
    }

    pub async fn set_search_query(&self, query: impl Into<String>) -> Result<Refresh, ApiError> {
        let query = query.into();
        self.update_filters(|f| f.set_search_query(query));
        self.refresh_todos().await
    }

    pub async fn set_filter_completed(&self, completed: Option<bool>) -> Result<Refresh, ApiError> {
        self.update_filters(|f| f.set_completed(completed));
        self.refresh_todos().await
    }

    pub async fn set_filter_category_id(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Refresh, ApiError> {
        self.update_filters(|f| f.set_category_id(category_id));
        self.refresh_todos().await
    }

    pub async fn set_filter_priority(&self, priority: Option<Priority>) -> Result<Refresh, ApiError> {
        self.update_filters(|f| f.set_priority(priority));
        self.refresh_todos().await
    }

    pub async fn clear_filters(&self) -> Result<Refresh, ApiError> {
        self.update_filters(FilterState::clear_filters);
        self.refresh_todos().await
    }

    // -- todo mutations --

    pub async fn create_todo(&self, input: &TodoInput) -> Result<Mutation<Todo>, ApiError> {
        let todo = self
            .inner
            .gateway
            .create_todo(input)
            .await
            .inspect_err(|err| warn!(error = %err, "failed to create todo"))?;
        info!(id = todo.id, "created todo");
        Ok(self.reload_after(todo).await)
    }

    pub async fn update_todo(
        &self,
        id: TodoId,
        input: &TodoInput,
    ) -> Result<Mutation<Todo>, ApiError> {
        let todo = self
            .inner
            .gateway
            .update_todo(id, input)
            .await
            .inspect_err(|err| warn!(id, error = %err, "failed to update todo"))?;
        info!(id, "updated todo");
        Ok(self.reload_after(todo).await)
    }

    /// A todo that is already gone counts as deleted.
    pub async fn delete_todo(&self, id: TodoId) -> Result<Mutation<()>, ApiError> {
        match self.inner.gateway.delete_todo(id).await {
            Ok(()) => info!(id, "deleted todo"),
            Err(ApiError::NotFound) => debug!(id, "todo was already deleted"),
            Err(err) => {
                warn!(id, error = %err, "failed to delete todo");
                return Err(err);
            }
        }
        Ok(self.reload_after(()).await)
    }

    /// The server flips the flag. While the request is in flight the id is
    /// listed in `pending_toggles`; the snapshot itself only changes once the
    /// list has been reloaded.
    pub async fn toggle_complete(&self, id: TodoId) -> Result<Mutation<Todo>, ApiError> {
        self.inner.state.send_modify(|s| {
            s.pending_toggles.insert(id);
        });

        let todo = match self.inner.gateway.toggle_complete(id).await {
            Ok(todo) => todo,
            Err(err) => {
                warn!(id, error = %err, "failed to toggle todo");
                self.clear_pending(id);
                return Err(err);
            }
        };
        debug!(id, completed = todo.completed, "toggled todo");

        let mutation = self.reload_after(todo).await;
        self.clear_pending(id);
        Ok(mutation)
    }

    /// Reads one todo straight from the backend without touching the
    /// snapshot.
    pub async fn fetch_todo(&self, id: TodoId) -> Result<Todo, ApiError> {
        self.inner.gateway.get_todo(id).await
    }

    // -- category mutations --

    pub async fn create_category(
        &self,
        input: &CategoryInput,
    ) -> Result<Mutation<Category>, ApiError> {
        let category = self
            .inner
            .gateway
            .create_category(input)
            .await
            .inspect_err(|err| warn!(error = %err, "failed to create category"))?;
        info!(id = category.id, name = %category.name, "created category");
        let refresh_error = self.refresh_categories().await.err();
        Ok(Mutation {
            value: category,
            refresh_error,
        })
    }

    /// Todos embed their category, so the list is reloaded too.
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Mutation<Category>, ApiError> {
        let category = self
            .inner
            .gateway
            .update_category(id, input)
            .await
            .inspect_err(|err| warn!(id, error = %err, "failed to update category"))?;
        info!(id, "updated category");
        Ok(self.reload_categories_after(category).await)
    }

    /// A category that is already gone counts as deleted. The backend
    /// decides what happens to todos that referenced it.
    pub async fn delete_category(&self, id: CategoryId) -> Result<Mutation<()>, ApiError> {
        match self.inner.gateway.delete_category(id).await {
            Ok(()) => info!(id, "deleted category"),
            Err(ApiError::NotFound) => debug!(id, "category was already deleted"),
            Err(err) => {
                warn!(id, error = %err, "failed to delete category");
                return Err(err);
            }
        }
        Ok(self.reload_categories_after(()).await)
    }

    pub async fn fetch_category(&self, id: CategoryId) -> Result<Category, ApiError> {
        self.inner.gateway.get_category(id).await
    }

    // -- internals --

    fn is_latest(&self, token: u64) -> bool {
        self.inner.latest_request.load(Ordering::SeqCst) == token
    }

    fn update_filters(&self, update: impl FnOnce(&mut FilterState)) {
        self.inner.state.send_modify(|s| update(&mut s.filters));
    }

    fn clear_pending(&self, id: TodoId) {
        self.inner.state.send_modify(|s| {
            s.pending_toggles.remove(&id);
        });
    }

    async fn reload_after<V>(&self, value: V) -> Mutation<V> {
        match self.refresh_todos().await {
            Ok(_) => Mutation {
                value,
                refresh_error: None,
            },
            Err(err) => {
                warn!(error = %err, "mutation succeeded but the list could not be reloaded");
                self.inner.state.send_modify(|s| s.list_stale = true);
                Mutation {
                    value,
                    refresh_error: Some(err),
                }
            }
        }
    }

    async fn reload_categories_after<V>(&self, value: V) -> Mutation<V> {
        let categories = self.refresh_categories().await;
        let mut mutation = self.reload_after(value).await;
        if let Err(err) = categories {
            mutation.refresh_error.get_or_insert(err);
        }
        mutation
    }
}
