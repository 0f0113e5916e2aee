use super::server::StatusServer;
use crate::check::CheckResult;
use crate::store::ResultStore;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn result(label: &str) -> CheckResult {
    CheckResult {
        config_label: label.to_string(),
        host: "web01".to_string(),
        command: "LoadAverage".to_string(),
        ..CheckResult::default()
    }
}

async fn get(server: &StatusServer, uri: &str) -> (StatusCode, String) {
    let response = server
        .create_app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[test]
fn test_status_server_creation() {
    let server = StatusServer::new("0.0.0.0:9050", "Hostwatch Agent", ResultStore::new());
    assert_eq!(server.listen, "0.0.0.0:9050");
    assert_eq!(server.identity, "Hostwatch Agent");
}

#[tokio::test]
async fn test_whoareyou_and_ping() {
    let server = StatusServer::new("127.0.0.1:0", "Hostwatch Scraper", ResultStore::new());

    let (status, body) = get(&server, "/whoareyou").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hostwatch Scraper");

    let (status, body) = get(&server, "/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "pong");
}

#[tokio::test]
async fn test_checks_lists_without_clearing() {
    let store = ResultStore::new();
    store.append(result("cpu")).await;
    let server = StatusServer::new("127.0.0.1:0", "Hostwatch Agent", store.clone());

    let (status, body) = get(&server, "/checks").await;
    assert_eq!(status, StatusCode::OK);
    let decoded: Vec<CheckResult> = serde_json::from_str(&body).unwrap();
    assert_eq!(decoded, vec![result("cpu")]);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_empty_store_serves_empty_array() {
    let server = StatusServer::new("127.0.0.1:0", "Hostwatch Agent", ResultStore::new());
    let (_, body) = get(&server, "/checks").await;
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_checkandclear_drains_store() {
    let store = ResultStore::new();
    store.append(result("cpu")).await;
    store.append(result("mem")).await;
    let server = StatusServer::new("127.0.0.1:0", "Hostwatch Agent", store.clone());

    let (_, body) = get(&server, "/checkandclear").await;
    let decoded: Vec<CheckResult> = serde_json::from_str(&body).unwrap();
    assert_eq!(decoded.len(), 2);
    assert!(store.is_empty().await);

    let (_, body) = get(&server, "/checkandclear").await;
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_statusof_filters_by_service() {
    let store = ResultStore::new();
    store.append(result("cpu")).await;
    store.append(result("mem")).await;
    store.append(result("cpu")).await;
    let server = StatusServer::new("127.0.0.1:0", "Hostwatch Agent", store);

    let (status, body) = get(&server, "/statusof?service=cpu").await;
    assert_eq!(status, StatusCode::OK);
    let decoded: Vec<CheckResult> = serde_json::from_str(&body).unwrap();
    assert_eq!(decoded.len(), 2);
    assert!(decoded.iter().all(|r| r.config_label == "cpu"));

    let (_, body) = get(&server, "/statusof?service=disk").await;
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_statusof_without_service_is_plain_text_error() {
    let server = StatusServer::new("127.0.0.1:0", "Hostwatch Agent", ResultStore::new());

    let (status, body) = get(&server, "/statusof").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "missing service to retrieve");

    let (status, _) = get(&server, "/statusof?service=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_serve_stops_on_cancel() {
    let server = StatusServer::new("127.0.0.1:0", "Hostwatch Agent", ResultStore::new());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let token = CancellationToken::new();

    let handle = {
        let server = server.clone();
        let token = token.clone();
        tokio::spawn(async move { server.serve(listener, token).await })
    };

    token.cancel();
    handle.await.unwrap().unwrap();
}
