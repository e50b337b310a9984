//! 실제 axum 서버와 `HttpContentStore`를 연결한 테스트
//!
//! 임의 포트에 API 라우터를 띄우고 reqwest로 저장 엔드포인트를 호출합니다.

use axum::Router;
use notara::autosave::{ContentSave, ContentStore, HttpContentStore, SaveError};
use notara::models::{CreateDocumentRequest, Document};
use notara::{db, routes};

/// 서버를 띄우고 기본 URL과 미리 만든 문서를 반환합니다.
async fn serve(max_content_bytes: usize) -> (String, Document) {
    let pool = db::connect_in_memory().await.expect("pool");
    let doc = db::create_document(&pool, &CreateDocumentRequest::default())
        .await
        .expect("create document");

    let state = routes::AppState {
        pool,
        max_content_bytes,
    };
    let app = Router::new().nest("/api/v1", routes::api_router(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    (format!("http://{addr}"), doc)
}

#[tokio::test]
async fn saves_document_larger_than_default_body_limit() {
    let (base_url, doc) = serve(4 * 1024 * 1024).await;
    let store = HttpContentStore::new(base_url);

    let content = "a".repeat(3 * 1024 * 1024);
    let saved = store
        .update_content(&ContentSave::new(&doc.id, content.clone(), 1))
        .await
        .expect("large save");

    assert_eq!(saved.version, 2);
    assert_eq!(saved.size_bytes, content.len() as i64);
}

#[tokio::test]
async fn oversized_content_is_a_validation_error() {
    let (base_url, doc) = serve(16).await;
    let store = HttpContentStore::new(base_url);

    let err = store
        .update_content(&ContentSave::new(&doc.id, "x".repeat(64), 1))
        .await
        .unwrap_err();

    assert!(matches!(err, SaveError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn stale_version_is_a_conflict() {
    let (base_url, doc) = serve(1024).await;
    let store = HttpContentStore::new(base_url);

    store
        .update_content(&ContentSave::new(&doc.id, "first", 1))
        .await
        .expect("first save");
    let err = store
        .update_content(&ContentSave::new(&doc.id, "second", 1))
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let current = store.fetch_document(&doc.id).await.expect("fetch");
    assert_eq!(current.content, "first");
    assert_eq!(current.version, 2);
}
