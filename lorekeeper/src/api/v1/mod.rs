pub mod dto;
pub mod handlers;
pub mod openapi;
pub mod response;
pub mod router;

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::api::routes::create_router;
    use crate::api::state::AppState;
    use crate::config::{
        Config, DatabaseConfig, DocumentConfig, EmbeddingsConfig, RetrievalConfig, ServerConfig,
    };
    use crate::error::Result;
    use crate::llm::prompts::NO_RESULTS_MESSAGE;
    use crate::models::ScoredChunk;
    use crate::services::NearestNeighborProvider;

    struct StubIndex {
        ready: bool,
        results: Vec<ScoredChunk>,
    }

    #[async_trait::async_trait]
    impl NearestNeighborProvider for StubIndex {
        async fn query(&self, _text: &str, k: u32) -> Result<Vec<ScoredChunk>> {
            Ok(self.results.iter().take(k as usize).cloned().collect())
        }

        fn is_ready(&self) -> bool {
            self.ready
        }
    }

    // A unique on-disk SQLite file per test. libsql reopens the database by path
    // on every `connect()`, so a file-backed store keeps the schema across those
    // transient connections (an in-memory DB would be dropped when the init
    // connection closes). Each call gets its own file so tests stay isolated.
    fn temp_db_url() -> String {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::sync::OnceLock;
        static DIR: OnceLock<tempfile::TempDir> = OnceLock::new();
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let dir = DIR.get_or_init(|| tempfile::tempdir().unwrap());
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        dir.path()
            .join(format!("test-{n}.db"))
            .to_string_lossy()
            .into_owned()
    }

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: temp_db_url(),
                auth_token: None,
                local_path: None,
            },
            embeddings: EmbeddingsConfig {
                model: "local/BAAI/bge-small-en-v1.5".to_string(),
                dimensions: 384,
                batch_size: 256,
            },
            document: DocumentConfig {
                spec_file_path: "spec.md".to_string(),
                chunk_size: 1000,
                chunk_overlap: 200,
            },
            retrieval: RetrievalConfig {
                max_results: 3,
                similarity_threshold: 0.35,
                max_context_length: 4000,
                history_fetch_limit: 20,
                history_render_limit: 10,
            },
            llm: None,
        }
    }

    async fn test_state(index: StubIndex) -> AppState {
        let config = test_config();
        let raw_db = crate::db::Database::new(&config.database).await.unwrap();
        let db: Arc<dyn crate::db::DatabaseBackend> =
            Arc::new(crate::db::LibSqlBackend::new(raw_db));
        let llm = crate::llm::LlmProvider::new(config.llm.as_ref());

        AppState::new(config, db, Arc::new(index), llm)
    }

    fn ready_index() -> StubIndex {
        StubIndex {
            ready: true,
            results: Vec::new(),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_status_and_readiness() {
        let app = create_router(test_state(ready_index()).await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "healthy");
        assert_eq!(json["data"]["vector_store_ready"], true);
        assert_eq!(json["data"]["llm"]["status"], "unavailable");
    }

    #[tokio::test]
    async fn openapi_json_is_valid() {
        let app = create_router(test_state(ready_index()).await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let version = json["openapi"]
            .as_str()
            .expect("openapi field should be a string");
        assert!(version.starts_with("3"));
    }

    #[tokio::test]
    async fn chat_rejects_empty_question() {
        let app = create_router(test_state(ready_index()).await);

        let response = app
            .oneshot(post_json("/api/v1/chat", r#"{"question": ""}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn chat_rejects_out_of_range_max_results() {
        let app = create_router(test_state(ready_index()).await);

        let response = app
            .oneshot(post_json(
                "/api/v1/chat",
                r#"{"question": "q", "maxResults": 11}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_before_index_ready_is_service_unavailable() {
        let app = create_router(
            test_state(StubIndex {
                ready: false,
                results: Vec::new(),
            })
            .await,
        );

        let response = app
            .oneshot(post_json("/api/v1/chat", r#"{"question": "anything"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "service_unavailable");
    }

    #[tokio::test]
    async fn chat_with_no_results_returns_fixed_message() {
        let app = create_router(test_state(ready_index()).await);

        let response = app
            .oneshot(post_json(
                "/api/v1/chat",
                r#"{"question": "something unknown"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["answer"], NO_RESULTS_MESSAGE);
        assert_eq!(json["data"]["confidence"], 0.0);
        assert_eq!(json["data"]["sources"].as_array().unwrap().len(), 0);
        assert!(json["data"]["sessionId"].is_string());
    }

    #[tokio::test]
    async fn session_crud_round_trip() {
        let app = create_router(test_state(ready_index()).await);

        // Create
        let response = app
            .clone()
            .oneshot(post_json("/api/v1/sessions", r#"{"title": "My run"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(created["data"]["title"], "My run");

        // Get
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Update title
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/api/v1/sessions/{id}"))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"title": "Renamed"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["data"]["title"], "Renamed");

        // Messages of a fresh session are empty
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/sessions/{id}/messages"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let messages = body_json(response).await;
        assert_eq!(messages["data"].as_array().unwrap().len(), 0);

        // Delete, then the session is gone
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_session_lookups_return_not_found() {
        let app = create_router(test_state(ready_index()).await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/sessions/does-not-exist/messages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "not_found");
    }
}
