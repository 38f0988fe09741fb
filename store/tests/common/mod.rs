#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use todo_api::{ApiError, HttpMethod, HttpRequest, HttpResponse};
use todo_store::{StoreConfig, TodoStore, Transport};
use tokio::sync::oneshot;

pub const BASE_URL: &str = "http://todo.test/api";

enum Reply {
    Now(Result<HttpResponse, ApiError>),
    Later(oneshot::Receiver<HttpResponse>),
}

#[derive(Default)]
struct FakeState {
    requests: Vec<HttpRequest>,
    replies: VecDeque<Reply>,
}

/// Answers requests from a script, in order, and records what was sent.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, body: Value) {
        let body = if body.is_null() {
            String::new()
        } else {
            body.to_string()
        };
        self.push(Reply::Now(Ok(HttpResponse::new(status, body))));
    }

    pub fn fail(&self, err: ApiError) {
        self.push(Reply::Now(Err(err)));
    }

    /// The next request waits until the returned sender fires.
    pub fn reply_later(&self) -> oneshot::Sender<HttpResponse> {
        let (tx, rx) = oneshot::channel();
        self.push(Reply::Later(rx));
        tx
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub async fn wait_for_requests(&self, count: usize) {
        while self.request_count() < count {
            tokio::task::yield_now().await;
        }
    }

    fn push(&self, reply: Reply) {
        self.state.lock().unwrap().replies.push_back(reply);
    }
}

impl Transport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request);
            state.replies.pop_front()
        };
        match reply {
            Some(Reply::Now(result)) => result,
            Some(Reply::Later(rx)) => rx
                .await
                .map_err(|_| ApiError::Network("reply dropped".to_string())),
            None => Err(ApiError::Network("no scripted reply".to_string())),
        }
    }
}

pub fn store(transport: &FakeTransport) -> TodoStore<FakeTransport> {
    TodoStore::new(&StoreConfig::new(BASE_URL), transport.clone())
}

pub fn todo_json(id: u64, title: &str, completed: bool, priority: &str) -> Value {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    json!({
        "id": id,
        "title": title,
        "description": "",
        "completed": completed,
        "priority": priority,
        "category_id": null,
        "due_date": null,
        "created_at": created,
        "updated_at": created,
    })
}

pub fn category_json(id: u64, name: &str, color: &str) -> Value {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    json!({ "id": id, "name": name, "color": color, "created_at": created })
}

pub fn page_json(todos: Vec<Value>, page: u32, limit: u32, total: u64) -> Value {
    let total_pages = total.div_ceil(u64::from(limit));
    json!({
        "data": todos,
        "pagination": {
            "current_page": page,
            "per_page": limit,
            "total": total,
            "total_pages": total_pages,
        }
    })
}

pub fn page_response(todos: Vec<Value>, total: u64) -> HttpResponse {
    HttpResponse::new(200, page_json(todos, 1, 10, total).to_string())
}

pub fn is_list_request(request: &HttpRequest) -> bool {
    request.method == HttpMethod::Get && request.path.starts_with(&format!("{BASE_URL}/todos?"))
}
