//! `HttpFlatSource` against a local one-shot HTTP stub.

use flat_scout::api::{ApiEndpoints, FlatSource, HttpFlatSource};
use flat_scout::error::ApiError;
use flat_scout::models::{FavoriteMutation, FavoriteStatus};
use flat_scout::{ListingRoute, ListingScreen, Session};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

enum Reply {
    Respond { status: &'static str, body: String },
    Hang,
}

/// Serve a single connection and hand back the raw request it received
async fn stub(reply: Reply) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/api/", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        match reply {
            Reply::Respond { status, body } => {
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                let _ = stream.shutdown().await;
            }
            Reply::Hang => tokio::time::sleep(Duration::from_secs(60)).await,
        }
        request
    });

    (base, handle)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8(buf).unwrap()
}

fn body_of(request: &str) -> &str {
    request.split_once("\r\n\r\n").map_or("", |(_, body)| body)
}

fn source(base: &str) -> HttpFlatSource {
    HttpFlatSource::with_endpoints(
        ApiEndpoints::with_base(base),
        Duration::from_secs(30),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn respond(status: &'static str, body: Value) -> Reply {
    Reply::Respond {
        status,
        body: body.to_string(),
    }
}

#[tokio::test]
async fn test_server_error_leaves_empty_collection() {
    let (base, server) = stub(respond("500 Internal Server Error", json!({}))).await;
    let mut screen = ListingScreen::new(
        Arc::new(source(&base)),
        Session::new("viewer", None),
        ListingRoute::all(),
    );

    assert!(!screen.load().await);
    assert!(screen.flats().is_empty());
    assert!(screen.favorites().is_empty());
    assert!(!screen.is_loading());

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/flats "));
}

#[tokio::test]
async fn test_listing_decodes_api_payload() {
    let payload = json!([
        { "_id": "a", "city": "Quito", "streetNumber": 12, "user": { "_id": "u1" } },
        { "_id": "b", "city": "Quito", "streetNumber": "N34-12", "user": { "_id": "u2" } }
    ]);
    let (base, server) = stub(respond("200 OK", payload)).await;

    let flats = source(&base).list_favorites("viewer").await.unwrap();

    assert_eq!(flats.len(), 2);
    assert_eq!(flats[0].street_number, "12");
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/flats/favorites/viewer "));
}

#[tokio::test]
async fn test_hanging_listing_fails_after_listing_timeout() {
    let (base, _server) = stub(Reply::Hang).await;
    let mut screen = ListingScreen::new(
        Arc::new(source(&base)),
        Session::new("viewer", None),
        ListingRoute::all(),
    );

    let started = Instant::now();
    let loaded = screen.load().await;
    let elapsed = started.elapsed();

    assert!(!loaded);
    assert!(screen.flats().is_empty());
    assert!(elapsed >= Duration::from_millis(4900), "gave up after {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(10), "gave up after {:?}", elapsed);
}

#[tokio::test]
async fn test_hanging_listing_reports_timeout() {
    let (base, _server) = stub(Reply::Hang).await;

    let result = source(&base).list_all().await;

    assert!(matches!(result, Err(ApiError::Timeout)));
}

#[tokio::test]
async fn test_ok_search_means_favorited() {
    let (base, server) = stub(respond("200 OK", json!({ "search": "ok" }))).await;

    let favorited = source(&base).favorite_status("f1", "u1").await.unwrap();

    assert!(favorited);
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/favorites/f1/u1 "));
}

#[tokio::test]
async fn test_other_search_means_not_favorited() {
    let (base, _server) = stub(respond("200 OK", json!({ "search": "none" }))).await;

    let favorited = source(&base).favorite_status("f1", "u1").await.unwrap();

    assert!(!favorited);
}

#[tokio::test]
async fn test_mutation_posts_json_body() {
    let (base, server) = stub(respond("200 OK", json!({}))).await;
    let mutation = FavoriteMutation {
        flat: "f1".to_string(),
        user: "u1".to_string(),
        status: FavoriteStatus::Active,
    };

    source(&base).set_favorite(&mutation).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/favorites "));
    assert!(request.to_lowercase().contains("content-type: application/json"));
    let body: Value = serde_json::from_str(body_of(&request)).unwrap();
    assert_eq!(body, json!({ "flat": "f1", "user": "u1", "status": "active" }));
}

#[tokio::test]
async fn test_rejected_mutation_reports_status() {
    let (base, _server) = stub(respond("500 Internal Server Error", json!({}))).await;
    let mutation = FavoriteMutation {
        flat: "f1".to_string(),
        user: "u1".to_string(),
        status: FavoriteStatus::Inactive,
    };

    let result = source(&base).set_favorite(&mutation).await;

    assert!(matches!(result, Err(ApiError::Status(500))));
}
