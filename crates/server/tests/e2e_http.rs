//! End-to-end HTTP tests for the Edulib server.
//!
//! Each test starts the real router on an ephemeral port and talks to it
//! with an HTTP client:
//! - Library listing
//! - File downloads and content types
//! - Traversal attempts and error bodies

use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

use library::{Category, Entry, LibraryManager, LibraryOptions};
use server::config::ServerConfig;
use server::{http, ErrorBody, HealthBody, LibraryListing};
use tempfile::TempDir;
use tokio::sync::oneshot;

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
    _temp_dir: TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

/// Library with `Math/algebra.txt` (10 bytes), a hidden `.cache` and a
/// secret file next to (not inside) the root.
async fn start_server(config: ServerConfig) -> TestServer {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("library");
    fs::create_dir_all(root.join("Math")).unwrap();
    fs::write(root.join("Math/algebra.txt"), "0123456789").unwrap();
    fs::write(root.join(".cache"), "cached").unwrap();
    fs::write(temp_dir.path().join("secret.txt"), "top secret").unwrap();

    let library = Arc::new(LibraryManager::open(&root, LibraryOptions::default()).unwrap());
    let app = http::router(library, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    let handle = tokio::spawn(http::serve(listener, app, async {
        let _ = rx.await;
    }));

    TestServer {
        addr,
        shutdown: Some(tx),
        handle,
        _temp_dir: temp_dir,
    }
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_library_listing() {
    let server = start_server(ServerConfig::default()).await;

    let response = reqwest::get(server.url("/library")).await.unwrap();
    assert_eq!(response.status(), 200);

    let listing: LibraryListing = response.json().await.unwrap();
    assert!(listing.success);
    assert_eq!(listing.items.len(), 1);

    let Entry::Folder(math) = &listing.items[0] else {
        panic!("expected folder");
    };
    assert_eq!(math.name, "Math");

    let Entry::File(algebra) = &math.children[0] else {
        panic!("expected file");
    };
    assert_eq!(algebra.path, "Math/algebra.txt");
    assert_eq!(algebra.size_human, "10.0 B");
    assert_eq!(algebra.category, Category::Documents);

    server.stop().await;
}

#[tokio::test]
async fn test_health() {
    let server = start_server(ServerConfig::default()).await;

    let body: HealthBody = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body.success);
    assert_eq!(body.status, "ok");

    server.stop().await;
}

// =============================================================================
// Serving
// =============================================================================

#[tokio::test]
async fn test_download_file() {
    let server = start_server(ServerConfig::default()).await;

    let response = reqwest::get(server.url("/library/Math/algebra.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/plain"
    );
    assert_eq!(response.headers().get("content-length").unwrap(), "10");
    assert_eq!(response.text().await.unwrap(), "0123456789");

    server.stop().await;
}

#[tokio::test]
async fn test_download_percent_encoded_name() {
    let server = start_server(ServerConfig::default()).await;

    let response = reqwest::get(server.url("/library/Math%2Falgebra.txt"))
        .await
        .unwrap();
    // Decoded by the router into an ordinary relative path.
    assert_eq!(response.status(), 200);

    server.stop().await;
}

#[tokio::test]
async fn test_traversal_is_not_found() {
    let server = start_server(ServerConfig::default()).await;

    for path in [
        "/library/..%2Fsecret.txt",
        "/library/Math%2F..%2F..%2Fsecret.txt",
        "/library/..%2F..%2Fetc%2Fpasswd",
        "/library/Math/..%2F..%2Fetc%2Fpasswd",
        "/library/missing.pdf",
    ] {
        let response = reqwest::get(server.url(path)).await.unwrap();
        assert_eq!(response.status(), 404, "{path}");

        let body: ErrorBody = response.json().await.unwrap();
        assert!(!body.success);
        assert_eq!(body.error, "File not found");
    }

    server.stop().await;
}

#[tokio::test]
async fn test_undecodable_path_is_not_found() {
    let server = start_server(ServerConfig::default()).await;

    for path in ["/library/%FF", "/library/..%2F%FF", "/library/Math/%C3%28.txt"] {
        let response = reqwest::get(server.url(path)).await.unwrap();
        assert_eq!(response.status(), 404, "{path}");
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );

        let body: ErrorBody = response.json().await.unwrap();
        assert!(!body.success);
        assert_eq!(body.error, "File not found");
    }

    server.stop().await;
}

#[tokio::test]
async fn test_folder_is_bad_request() {
    let server = start_server(ServerConfig::default()).await;

    let response = reqwest::get(server.url("/library/Math")).await.unwrap();
    assert_eq!(response.status(), 400);

    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error, "Invalid file path");

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_endpoint() {
    let server = start_server(ServerConfig::default()).await;

    let response = reqwest::get(server.url("/chat")).await.unwrap();
    assert_eq!(response.status(), 404);

    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error, "Endpoint not found");

    server.stop().await;
}

// =============================================================================
// Optional layers
// =============================================================================

#[tokio::test]
async fn test_static_dir() {
    let static_dir = TempDir::new().unwrap();
    fs::write(static_dir.path().join("app.css"), "body {}").unwrap();

    let config = ServerConfig {
        static_dir: Some(static_dir.path().to_path_buf()),
        ..ServerConfig::default()
    };
    let server = start_server(config).await;

    let response = reqwest::get(server.url("/static/app.css")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "body {}");

    server.stop().await;
}

#[tokio::test]
async fn test_cors_header() {
    let server = start_server(ServerConfig::default()).await;

    let response = reqwest::Client::new()
        .get(server.url("/library"))
        .header("origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );

    server.stop().await;
}
