use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, MutexGuard,
};

use catalog_api::{CatalogApiClient, CatalogApiConfig, CatalogApiError, SearchField, MAX_RESULTS};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

struct ScriptedResponse {
    status: u16,
    body: Vec<u8>,
}

fn response_json(status: u16, body: &str) -> ScriptedResponse {
    ScriptedResponse {
        status,
        body: body.as_bytes().to_vec(),
    }
}

/// Request line of one received request.
#[derive(Debug, Clone)]
struct RecordedRequest {
    method: String,
    target: String,
}

struct ScriptedServer {
    base_url: String,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    async fn new(scripts: Vec<ScriptedResponse>) -> Self {
        let scripts = Arc::new(scripts);
        let request_count = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local TCP listener should bind");
        let addr = listener
            .local_addr()
            .expect("resolved local listener address");
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn({
            let request_count = Arc::clone(&request_count);
            let requests = Arc::clone(&requests);

            async move {
                while let Ok((socket, _)) = listener.accept().await {
                    let scripts = Arc::clone(&scripts);
                    let request_count = Arc::clone(&request_count);
                    let requests = Arc::clone(&requests);
                    tokio::spawn(async move {
                        serve_one(socket, scripts, request_count, requests).await;
                    });
                }
            }
        });

        Self {
            base_url,
            request_count,
            requests,
            handle,
        }
    }

    fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Acquire)
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        lock_unpoisoned(&self.requests).clone()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn client_for(server: &ScriptedServer) -> CatalogApiClient {
    CatalogApiClient::new(CatalogApiConfig::new().with_base_url(&server.base_url))
        .expect("client")
}

fn docs_body(count: usize) -> String {
    let docs = (0..count)
        .map(|index| {
            json!({
                "key": format!("/works/OL{index}W"),
                "title": format!("Dune {index}"),
                "author_name": ["Frank Herbert"],
                "first_publish_year": 1965,
            })
        })
        .collect::<Vec<_>>();
    json!({ "numFound": count, "docs": docs }).to_string()
}

#[tokio::test]
async fn search_sends_one_request_and_caps_results() {
    let server = ScriptedServer::new(vec![response_json(200, &docs_body(50))]).await;
    let client = client_for(&server);

    let records = client
        .search("dune", SearchField::Title)
        .await
        .expect("search should succeed");

    assert_eq!(server.request_count(), 1);
    assert_eq!(records.len(), MAX_RESULTS);
    let keys = records.iter().map(|record| record.key.as_str()).collect::<Vec<_>>();
    let expected = (0..MAX_RESULTS)
        .map(|index| format!("/works/OL{index}W"))
        .collect::<Vec<_>>();
    assert_eq!(keys, expected);

    let requests = server.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].target, "/search.json?title=dune");
}

#[tokio::test]
async fn search_trims_query_before_sending() {
    let server = ScriptedServer::new(vec![response_json(200, &docs_body(1))]).await;
    let client = client_for(&server);

    client
        .search("  frank herbert ", SearchField::Author)
        .await
        .expect("search should succeed");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target, "/search.json?author=frank+herbert");
}

#[tokio::test]
async fn blank_query_sends_nothing() {
    let server = ScriptedServer::new(vec![response_json(200, &docs_body(3))]).await;
    let client = client_for(&server);

    for query in ["", "   ", "\t\n"] {
        let records = client
            .search(query, SearchField::Subject)
            .await
            .expect("blank search is not an error");
        assert!(records.is_empty());
    }

    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn zero_docs_is_an_empty_success() {
    let server = ScriptedServer::new(vec![response_json(200, r#"{"numFound":0,"docs":[]}"#)]).await;
    let client = client_for(&server);

    let records = client
        .search("zzzzzz", SearchField::Isbn)
        .await
        .expect("empty result is still a success");
    assert!(records.is_empty());
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    let server = ScriptedServer::new(vec![response_json(200, "<html>oops</html>")]).await;
    let client = client_for(&server);

    let error = client
        .search("dune", SearchField::Title)
        .await
        .expect_err("html body must not decode");
    assert!(matches!(error, CatalogApiError::Decode(_)));
    assert!(error.is_transport());
}

#[tokio::test]
async fn error_status_is_reported_without_retry() {
    let server = ScriptedServer::new(vec![
        response_json(503, r#"{"error":"busy"}"#),
        response_json(200, &docs_body(2)),
    ])
    .await;
    let client = client_for(&server);

    let error = client
        .search("dune", SearchField::Title)
        .await
        .expect_err("503 must fail");
    assert!(matches!(error, CatalogApiError::Status(status) if status.as_u16() == 503));
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn unreachable_server_is_a_request_failure() {
    let server = ScriptedServer::new(Vec::new()).await;
    let base_url = server.base_url.clone();
    drop(server);
    tokio::task::yield_now().await;

    let client = CatalogApiClient::new(
        CatalogApiConfig::new()
            .with_base_url(format!("{base_url}/closed"))
            .with_timeout(std::time::Duration::from_secs(2)),
    )
    .expect("client");

    let result = client.search("dune", SearchField::Title).await;
    assert!(result.is_err());
}

async fn serve_one(
    mut socket: TcpStream,
    scripts: Arc<Vec<ScriptedResponse>>,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let Some(request) = read_request_line(&mut socket).await else {
        return;
    };
    let index = request_count.fetch_add(1, Ordering::AcqRel);
    lock_unpoisoned(&requests).push(request);

    let Some(script) = scripts.get(index).or_else(|| scripts.last()) else {
        return;
    };

    let head = format!(
        "HTTP/1.1 {} Scripted\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
        script.status,
        script.body.len()
    );
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(&script.body).await;
    let _ = socket.shutdown().await;
}

/// Searches are bodiless GETs, so reading up to the blank line is enough.
async fn read_request_line(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    while !buffer.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    let head = String::from_utf8_lossy(&buffer);
    let mut request_line = head.lines().next()?.split_whitespace();
    Some(RecordedRequest {
        method: request_line.next()?.to_string(),
        target: request_line.next()?.to_string(),
    })
}
