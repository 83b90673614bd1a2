use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tempfile::TempDir;

use global_search::config::{ApiConfig, Config};
use global_search::search::search_once;
use global_search::session;
use global_search::source_http::HttpDataSource;
use global_search::store_file::FileKeyValueStore;
use global_search_core::controller::ViewState;
use global_search_core::models::{Collection, Scope, SearchQuery};
use global_search_core::navigator::NavKey;
use global_search_core::source::DataSource;

async fn projects(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    assert_eq!(params.get("limit").map(String::as_str), Some("20"));
    Json(json!([
        {"id": 1, "title": "Quarterly Review 2024", "description": "Q3 numbers", "created_at": "2024-05-01T10:00:00Z"},
        {"id": 2, "title": "Garden", "description": "Plant tomatoes"}
    ]))
}

async fn goals() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
}

async fn tasks(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    // Only active tasks when the status filter is passed through.
    let mut items = vec![json!({
        "id": 10,
        "title": "Prepare quarterly review slides",
        "status": "active",
        "priority": 2,
        "due_date": "2024-06-01",
        "tags": [{"name": "work"}]
    })];
    if params.get("status").map(String::as_str) != Some("active") {
        items.push(json!({"id": 11, "title": "Archive quarterly review", "status": "done"}));
    }
    Json(json!(items))
}

async fn contexts() -> impl IntoResponse {
    "this is not json"
}

async fn notes() -> impl IntoResponse {
    Json(json!({"error": "not a list"}))
}

async fn tags() -> impl IntoResponse {
    Json(json!([{"id": 5, "name": "quarterly review"}]))
}

async fn start_server() -> String {
    let app = Router::new()
        .route("/api/v1/projects", get(projects))
        .route("/api/v1/goals", get(goals))
        .route("/api/v1/tasks", get(tasks))
        .route("/api/v1/contexts", get(contexts))
        .route("/api/v1/notes", get(notes))
        .route("/api/v1/tags", get(tags));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn api(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        limit: 20,
    }
}

fn test_config(tmp: &TempDir, base_url: &str) -> Config {
    let mut cfg = Config::minimal();
    cfg.api = api(base_url);
    cfg.search.debounce_ms = 0;
    cfg.storage.path = tmp.path().join("state").join("search-state.json");
    cfg
}

#[tokio::test]
async fn test_fetch_single_collection() {
    let base = start_server().await;
    let source = HttpDataSource::new(&api(&base)).unwrap();
    let query = SearchQuery::new("quarterly", Scope::Projects);

    let entities = source.fetch(Collection::Projects, &query).await.unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].label(), "Quarterly Review 2024");
}

#[tokio::test]
async fn test_fetch_error_status_and_bad_body_fail() {
    let base = start_server().await;
    let source = HttpDataSource::new(&api(&base)).unwrap();
    let query = SearchQuery::new("x", Scope::All);

    let err = source.fetch(Collection::Goals, &query).await.unwrap_err();
    assert!(err.to_string().contains("500"));
    assert!(source.fetch(Collection::Contexts, &query).await.is_err());
    assert!(source
        .fetch(Collection::Notes, &query)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_partial_failure_keeps_successful_collections() {
    let base = start_server().await;
    let tmp = TempDir::new().unwrap();
    let source = Arc::new(HttpDataSource::new(&api(&base)).unwrap());
    let store = Arc::new(FileKeyValueStore::new(tmp.path().join("state.json")));

    let groups = search_once(source, store, &SearchQuery::new("quarterly review", Scope::All))
        .await
        .unwrap();

    let kinds: Vec<Collection> = groups.iter().map(|g| g.kind).collect();
    // Exact tag match (100) first, then the project title match, then tasks.
    assert_eq!(
        kinds,
        vec![Collection::Tags, Collection::Projects, Collection::Tasks]
    );
    assert_eq!(groups[2].items.len(), 2);
}

#[tokio::test]
async fn test_total_failure_is_an_error() {
    let base = start_server().await;
    let tmp = TempDir::new().unwrap();
    let source = Arc::new(HttpDataSource::new(&api(&base)).unwrap());
    let store = Arc::new(FileKeyValueStore::new(tmp.path().join("state.json")));

    let result = search_once(source, store, &SearchQuery::new("quarterly", Scope::Goals)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_filters_sent_as_query_params() {
    let base = start_server().await;
    let tmp = TempDir::new().unwrap();
    let source = Arc::new(HttpDataSource::new(&api(&base)).unwrap());
    let store = Arc::new(FileKeyValueStore::new(tmp.path().join("state.json")));

    let mut filters = BTreeMap::new();
    filters.insert("status".to_string(), "active".to_string());
    let query = SearchQuery::new("quarterly", Scope::Tasks).with_filters(filters);

    let groups = search_once(source, store, &query).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].items.len(), 1);
    assert_eq!(groups[0].items[0].entity.label(), "Prepare quarterly review slides");
}

#[tokio::test]
async fn test_reserved_filter_does_not_override_params() {
    let base = start_server().await;
    let source = HttpDataSource::new(&api(&base)).unwrap();

    let mut filters = BTreeMap::new();
    filters.insert("limit".to_string(), "999".to_string());
    let query = SearchQuery::new("quarterly", Scope::Projects).with_filters(filters);

    // The handler asserts limit=20; a second limit param would fail the request.
    let entities = source.fetch(Collection::Projects, &query).await.unwrap();
    assert_eq!(entities.len(), 2);
}

#[tokio::test]
async fn test_activation_persists_across_sessions() {
    let base = start_server().await;
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp, &base);

    let mut controller = session::controller(&cfg).unwrap();
    controller.open();
    controller.handle_input("garden");
    assert!(controller.run_pending().await);
    assert!(matches!(controller.view(), ViewState::Results { .. }));

    let activation = controller
        .handle_key(NavKey::Enter { new_tab: false })
        .unwrap();
    assert_eq!(activation.url, "/projects/2");
    assert!(cfg.storage.path.exists());

    let reopened = session::controller(&cfg).unwrap();
    assert_eq!(reopened.history().len(), 1);
    assert_eq!(reopened.history()[0].query, "garden");
    assert_eq!(reopened.recent_items()[0].entity.label(), "Garden");
}
