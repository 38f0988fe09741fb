mod common;

use common::*;
use todo_api::{ApiError, HttpResponse, Priority, Statistics};
use todo_store::Refresh;
use tracing_test::traced_test;

fn list_path(query: &str) -> String {
    format!("{BASE_URL}/todos?{query}")
}

#[tokio::test]
async fn newest_request_wins_when_responses_arrive_out_of_order() {
    let transport = FakeTransport::new();
    let first = transport.reply_later();
    let second = transport.reply_later();
    let store = store(&transport);

    let alpha = tokio::spawn({
        let store = store.clone();
        async move { store.set_search_query("alpha").await }
    });
    transport.wait_for_requests(1).await;
    let beta = tokio::spawn({
        let store = store.clone();
        async move { store.set_search_query("beta").await }
    });
    transport.wait_for_requests(2).await;

    second
        .send(page_response(vec![todo_json(2, "beta task", false, "high")], 1))
        .unwrap();
    assert_eq!(beta.await.unwrap().unwrap(), Refresh::Applied);

    first
        .send(page_response(
            vec![
                todo_json(1, "alpha task", false, "low"),
                todo_json(3, "alpha again", true, "low"),
            ],
            2,
        ))
        .unwrap();
    assert_eq!(alpha.await.unwrap().unwrap(), Refresh::Superseded);

    let snapshot = store.snapshot();
    let titles: Vec<_> = snapshot.todos.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["beta task"]);
    assert_eq!(snapshot.total, 1);
    assert_eq!(snapshot.filters.search_query(), "beta");
    assert!(!snapshot.loading);

    let requests = transport.requests();
    assert!(requests[0].path.contains("search=alpha&"));
    assert!(requests[1].path.contains("search=beta&"));
}

#[tokio::test]
async fn stale_response_does_not_clear_loading() {
    let transport = FakeTransport::new();
    let first = transport.reply_later();
    let second = transport.reply_later();
    let store = store(&transport);

    let older = tokio::spawn({
        let store = store.clone();
        async move { store.refresh_todos().await }
    });
    transport.wait_for_requests(1).await;
    let newer = tokio::spawn({
        let store = store.clone();
        async move { store.refresh_todos().await }
    });
    transport.wait_for_requests(2).await;
    assert!(store.snapshot().loading);

    first
        .send(page_response(vec![todo_json(1, "old", false, "low")], 1))
        .unwrap();
    assert_eq!(older.await.unwrap().unwrap(), Refresh::Superseded);
    let snapshot = store.snapshot();
    assert!(snapshot.loading);
    assert!(snapshot.todos.is_empty());

    second.send(page_response(Vec::new(), 0)).unwrap();
    assert_eq!(newer.await.unwrap().unwrap(), Refresh::Applied);
    assert!(!store.snapshot().loading);
}

#[tokio::test]
async fn stale_failure_is_not_reported() {
    let transport = FakeTransport::new();
    let first = transport.reply_later();
    let second = transport.reply_later();
    let store = store(&transport);

    let older = tokio::spawn({
        let store = store.clone();
        async move { store.refresh_todos().await }
    });
    transport.wait_for_requests(1).await;
    let newer = tokio::spawn({
        let store = store.clone();
        async move { store.refresh_todos().await }
    });
    transport.wait_for_requests(2).await;

    second
        .send(page_response(vec![todo_json(5, "fresh", false, "medium")], 1))
        .unwrap();
    assert_eq!(newer.await.unwrap().unwrap(), Refresh::Applied);

    first
        .send(HttpResponse::new(500, r#"{"error":"boom"}"#))
        .unwrap();
    assert_eq!(older.await.unwrap().unwrap(), Refresh::Superseded);
    assert_eq!(store.snapshot().todos[0].title, "fresh");
}

#[tokio::test]
async fn loading_is_set_while_request_is_in_flight() {
    let transport = FakeTransport::new();
    let reply = transport.reply_later();
    let store = store(&transport);
    assert!(!store.snapshot().loading);

    let refresh = tokio::spawn({
        let store = store.clone();
        async move { store.refresh_todos().await }
    });
    transport.wait_for_requests(1).await;
    assert!(store.snapshot().loading);

    reply.send(page_response(Vec::new(), 0)).unwrap();
    refresh.await.unwrap().unwrap();
    assert!(!store.snapshot().loading);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_list() {
    let transport = FakeTransport::new();
    transport.reply(200, page_json(vec![todo_json(1, "keep me", false, "low")], 1, 10, 1));
    transport.fail(ApiError::Network("connection refused".to_string()));
    let store = store(&transport);

    store.refresh_todos().await.unwrap();
    let err = store.refresh_todos().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.todos.len(), 1);
    assert_eq!(snapshot.todos[0].title, "keep me");
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn server_error_surfaces_status_and_message() {
    let transport = FakeTransport::new();
    transport.reply(500, serde_json::json!({ "error": "database is down" }));
    let store = store(&transport);

    match store.refresh_todos().await {
        Err(ApiError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database is down");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn filter_setters_reset_page_in_request() {
    let transport = FakeTransport::new();
    for _ in 0..3 {
        transport.reply(200, page_json(Vec::new(), 1, 10, 0));
    }
    let store = store(&transport);

    store.set_current_page(3).await.unwrap();
    store.set_filter_priority(Some(Priority::High)).await.unwrap();
    store.set_filter_completed(Some(false)).await.unwrap();

    let paths: Vec<_> = transport.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        [
            list_path("page=3&limit=10&sort_by=created_at&sort_order=desc"),
            list_path("page=1&limit=10&sort_by=created_at&sort_order=desc&priority=high"),
            list_path(
                "page=1&limit=10&sort_by=created_at&sort_order=desc&completed=false&priority=high"
            ),
        ]
    );
}

#[tokio::test]
async fn page_size_change_keeps_page() {
    let transport = FakeTransport::new();
    for _ in 0..3 {
        transport.reply(200, page_json(Vec::new(), 1, 10, 0));
    }
    let store = store(&transport);

    store.set_current_page(2).await.unwrap();
    store.set_page_size(25).await.unwrap();
    store.set_pagination(4, 5).await.unwrap();

    let requests = transport.requests();
    assert!(requests[1].path.contains("page=2&limit=25&"));
    assert!(requests[2].path.contains("page=4&limit=5&"));
    assert_eq!(store.snapshot().filters.page_size(), 5);
}

#[tokio::test]
async fn category_zero_is_sent_as_a_filter() {
    let transport = FakeTransport::new();
    transport.reply(200, page_json(Vec::new(), 1, 10, 0));
    let store = store(&transport);

    store.set_filter_category_id(Some(0)).await.unwrap();
    assert!(transport.requests()[0].path.ends_with("&category_id=0"));
}

#[tokio::test]
async fn clear_filters_keeps_search() {
    let transport = FakeTransport::new();
    for _ in 0..3 {
        transport.reply(200, page_json(Vec::new(), 1, 10, 0));
    }
    let store = store(&transport);

    store.set_search_query("taxes").await.unwrap();
    store.set_filter_priority(Some(Priority::Low)).await.unwrap();
    store.clear_filters().await.unwrap();

    let last = transport.requests().pop().unwrap();
    assert_eq!(
        last.path,
        list_path("page=1&limit=10&search=taxes&sort_by=created_at&sort_order=desc")
    );
    assert!(!store.snapshot().filters.has_active_filters());
}

#[tokio::test]
async fn statistics_follow_fetched_page() {
    let transport = FakeTransport::new();
    transport.reply(
        200,
        page_json(
            vec![
                todo_json(1, "a", true, "low"),
                todo_json(2, "b", false, "low"),
                todo_json(3, "c", false, "high"),
            ],
            1,
            10,
            3,
        ),
    );
    let store = store(&transport);

    store.refresh_todos().await.unwrap();
    assert_eq!(
        store.snapshot().statistics,
        Statistics {
            total: 3,
            active: 2,
            completed: 1,
            progress: 33,
        }
    );
}

#[tokio::test]
async fn subscribers_see_new_snapshot() {
    let transport = FakeTransport::new();
    transport.reply(200, page_json(vec![todo_json(1, "a", false, "low")], 1, 10, 1));
    let store = store(&transport);
    let mut rx = store.subscribe();

    store.refresh_todos().await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().todos.len(), 1);
}

#[tokio::test]
async fn load_fetches_categories_then_todos() {
    let transport = FakeTransport::new();
    transport.reply(200, serde_json::json!([category_json(1, "Work", "#3B82F6")]));
    transport.reply(200, page_json(vec![todo_json(1, "a", false, "low")], 1, 10, 1));
    let store = store(&transport);

    store.load().await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].path, format!("{BASE_URL}/categories"));
    assert!(is_list_request(&requests[1]));
    let snapshot = store.snapshot();
    assert_eq!(snapshot.categories[0].name, "Work");
    assert_eq!(snapshot.todos.len(), 1);
}

#[tokio::test]
async fn load_still_fetches_todos_when_categories_fail() {
    let transport = FakeTransport::new();
    transport.reply(500, serde_json::json!({ "error": "nope" }));
    transport.reply(200, page_json(vec![todo_json(1, "a", false, "low")], 1, 10, 1));
    let store = store(&transport);

    assert!(store.load().await.is_err());
    assert_eq!(store.snapshot().todos.len(), 1);
}

#[traced_test]
#[tokio::test]
async fn stale_response_is_logged() {
    let transport = FakeTransport::new();
    let first = transport.reply_later();
    let second = transport.reply_later();
    let store = store(&transport);

    // Driven from the test task so the events land in the test's span.
    let (older, newer, ()) = tokio::join!(
        store.refresh_todos(),
        async {
            transport.wait_for_requests(1).await;
            store.refresh_todos().await
        },
        async {
            transport.wait_for_requests(2).await;
            second.send(page_response(Vec::new(), 0)).unwrap();
            while store.snapshot().loading {
                tokio::task::yield_now().await;
            }
            first.send(page_response(Vec::new(), 0)).unwrap();
        },
    );

    assert_eq!(newer.unwrap(), Refresh::Applied);
    assert_eq!(older.unwrap(), Refresh::Superseded);
    assert!(logs_contain("discarding stale todo list response"));
}
