//! The store driven against the mock server over real HTTP.

use todo_api::{CategoryInput, Priority, TodoInput};
use todo_store::{StoreConfig, TodoStore, UreqTransport};
use tokio::net::TcpListener;

async fn start() -> TodoStore<UreqTransport> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));

    let config = StoreConfig::new(format!("http://{addr}/api"));
    TodoStore::new(&config, UreqTransport::new())
}

#[tokio::test(flavor = "multi_thread")]
async fn created_todo_shows_up_in_the_list() {
    let store = start().await;
    store.load().await.unwrap();
    let before = store.snapshot().statistics.total;

    let input = TodoInput::new("Buy milk").priority(Priority::Low);
    let mutation = store.create_todo(&input).await.unwrap();
    assert!(!mutation.refresh_failed());

    let snapshot = store.snapshot();
    let todo = snapshot.todo(mutation.value.id).unwrap();
    assert_eq!(todo.title, "Buy milk");
    assert_eq!(todo.priority, Priority::Low);
    assert!(!todo.completed);
    assert_eq!(snapshot.statistics.total, before + 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn priority_and_completion_filters_combine() {
    let store = start().await;
    for (title, priority, completed) in [
        ("Ship release", Priority::High, false),
        ("Fix outage", Priority::High, true),
        ("Tidy desk", Priority::Low, false),
    ] {
        let input = TodoInput::new(title).priority(priority).completed(completed);
        store.create_todo(&input).await.unwrap();
    }

    store.set_filter_priority(Some(Priority::High)).await.unwrap();
    store.set_filter_completed(Some(false)).await.unwrap();

    let snapshot = store.snapshot();
    let titles: Vec<_> = snapshot.todos.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Ship release"]);
    assert_eq!(snapshot.total, 1);

    store.clear_filters().await.unwrap();
    assert_eq!(store.snapshot().total, 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn search_matches_title_and_description() {
    let store = start().await;
    store
        .create_todo(&TodoInput::new("Groceries").description("milk and eggs"))
        .await
        .unwrap();
    store.create_todo(&TodoInput::new("Call Mum")).await.unwrap();

    store.set_search_query("MILK").await.unwrap();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.todos.len(), 1);
    assert_eq!(snapshot.todos[0].title, "Groceries");
}

#[tokio::test(flavor = "multi_thread")]
async fn deleted_todo_is_gone_and_second_delete_is_harmless() {
    let store = start().await;
    let id = store
        .create_todo(&TodoInput::new("Temporary"))
        .await
        .unwrap()
        .value
        .id;

    store.delete_todo(id).await.unwrap();
    assert!(store.snapshot().todo(id).is_none());
    assert!(store.fetch_todo(id).await.unwrap_err().is_not_found());

    store.delete_todo(id).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn toggle_flips_both_ways() {
    let store = start().await;
    let id = store
        .create_todo(&TodoInput::new("Water plants"))
        .await
        .unwrap()
        .value
        .id;

    let on = store.toggle_complete(id).await.unwrap();
    assert!(on.value.completed);
    assert!(store.snapshot().todo(id).unwrap().completed);
    assert_eq!(store.snapshot().statistics.completed, 1);

    let off = store.toggle_complete(id).await.unwrap();
    assert!(!off.value.completed);
    assert!(!store.snapshot().todo(id).unwrap().completed);
    assert!(!store.snapshot().is_pending(id));
}

#[tokio::test(flavor = "multi_thread")]
async fn paging_walks_through_the_list() {
    let store = start().await;
    store.set_page_size(2).await.unwrap();
    for i in 1..=5 {
        store.create_todo(&TodoInput::new(format!("Task {i}"))).await.unwrap();
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.total, 5);
    assert_eq!(snapshot.todos.len(), 2);
    assert_eq!(snapshot.total_pages(), 3);

    store.set_current_page(3).await.unwrap();
    assert_eq!(store.snapshot().todos.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn category_lifecycle() {
    let store = start().await;

    let work = store
        .create_category(&CategoryInput::new("Work", "#3B82F6"))
        .await
        .unwrap()
        .value;
    assert_eq!(store.snapshot().categories.len(), 1);

    let err = store
        .create_category(&CategoryInput::new("W", "#3B82F6"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    let err = store
        .create_category(&CategoryInput::new("Work", "blue"))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let todo = store
        .create_todo(&TodoInput::new("Quarterly report").category_id(work.id))
        .await
        .unwrap()
        .value;
    let embedded = store.snapshot().todo(todo.id).unwrap().category.clone();
    assert_eq!(embedded.unwrap().name, "Work");

    store.set_filter_category_id(Some(work.id)).await.unwrap();
    assert_eq!(store.snapshot().total, 1);
    store.clear_filters().await.unwrap();

    let renamed = store
        .update_category(work.id, &CategoryInput::new("Office", "#10B981"))
        .await
        .unwrap()
        .value;
    assert_eq!(renamed.name, "Office");
    assert_eq!(store.fetch_category(work.id).await.unwrap().color, "#10B981");

    store.delete_category(work.id).await.unwrap();
    let snapshot = store.snapshot();
    assert!(snapshot.categories.is_empty());
    assert!(snapshot.todo(todo.id).unwrap().category_id.is_none());
}
