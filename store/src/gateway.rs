//! Async API gateway: build, execute and parse in one call.
//!
//! Each method is a single fire-once round-trip. Errors from the client or
//! the transport are returned untouched; deciding what a failure means is
//! left to the caller.

use todo_api::{
    ApiError, Category, CategoryId, CategoryInput, HttpRequest, HttpResponse, ListQuery, Todo,
    TodoClient, TodoId, TodoInput, TodoPage,
};
use tracing::{debug, warn};

use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct ApiGateway<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> ApiGateway<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: TodoClient::new(base_url),
            transport,
        }
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    pub async fn list_todos(&self, query: &ListQuery) -> Result<TodoPage, ApiError> {
        let request = self.client.build_list_todos(query)?;
        let response = self.send(request).await?;
        self.client.parse_list_todos(response)
    }

    pub async fn get_todo(&self, id: TodoId) -> Result<Todo, ApiError> {
        let response = self.send(self.client.build_get_todo(id)).await?;
        self.client.parse_get_todo(response)
    }

    pub async fn create_todo(&self, input: &TodoInput) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(input)?;
        let response = self.send(request).await?;
        self.client.parse_create_todo(response)
    }

    pub async fn update_todo(&self, id: TodoId, input: &TodoInput) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(id, input)?;
        let response = self.send(request).await?;
        self.client.parse_update_todo(response)
    }

    pub async fn delete_todo(&self, id: TodoId) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }

    pub async fn toggle_complete(&self, id: TodoId) -> Result<Todo, ApiError> {
        let response = self.send(self.client.build_toggle_complete(id)).await?;
        self.client.parse_toggle_complete(response)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let response = self.send(self.client.build_list_categories()).await?;
        self.client.parse_list_categories(response)
    }

    pub async fn get_category(&self, id: CategoryId) -> Result<Category, ApiError> {
        let response = self.send(self.client.build_get_category(id)).await?;
        self.client.parse_get_category(response)
    }

    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let request = self.client.build_create_category(input)?;
        let response = self.send(request).await?;
        self.client.parse_create_category(response)
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let request = self.client.build_update_category(id, input)?;
        let response = self.send(request).await?;
        self.client.parse_update_category(response)
    }

    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete_category(id)).await?;
        self.client.parse_delete_category(response)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        let result = self.transport.execute(request).await;
        match &result {
            Ok(response) => debug!(%method, %path, status = response.status, "api call"),
            Err(err) => warn!(%method, %path, error = %err, "api call failed in transport"),
        }
        result
    }
}
