//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use quiz_service::config::ServiceConfig;
use quiz_service::http::HttpServer;
use quiz_service::lifecycle::startup::QUESTION_SERVICE;
use quiz_service::lifecycle::Shutdown;
use quiz_service::provider::HttpQuestionProvider;
use quiz_service::quiz::QuizOrchestrator;
use quiz_service::resilience::Resilient;
use quiz_service::store::MemoryQuizStore;

/// A request as seen by the mock question service.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: String,
}

/// Start a programmable mock question service on `addr` (port 0 picks one).
pub async fn start_question_service<F, Fut>(addr: SocketAddr, f: F) -> SocketAddr
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let local_addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    local_addr
}

async fn read_request(socket: &mut TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (target, String::new()),
    };

    Some(MockRequest {
        method,
        path,
        query,
        body: String::from_utf8_lossy(&buf[header_end..]).into_owned(),
    })
}

/// A running quiz service plus the handles tests inspect.
#[allow(dead_code)]
pub struct TestService {
    pub addr: SocketAddr,
    pub store: Arc<MemoryQuizStore>,
    pub orchestrator: Arc<QuizOrchestrator>,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<()>,
}

#[allow(dead_code)]
impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Config pointing at `question_service` with fast retries.
pub fn test_config(question_service: SocketAddr) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.question_service.base_url = format!("http://{}/", question_service);
    config.question_service.connect_timeout_ms = 200;
    config.resilience.retry.base_delay_ms = 10;
    config.resilience.retry.max_delay_ms = 20;
    config.resilience.retry.call_timeout_ms = 1000;
    config.observability.metrics_enabled = false;
    config
}

/// Start the quiz service on an ephemeral port.
pub async fn start_quiz_service(config: ServiceConfig) -> TestService {
    let store = Arc::new(MemoryQuizStore::new());
    let provider = Arc::new(HttpQuestionProvider::new(&config.question_service).unwrap());
    let resilient = Resilient::from_config(QUESTION_SERVICE, &config.resilience);
    let orchestrator = Arc::new(QuizOrchestrator::new(store.clone(), provider, resilient));

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::with_orchestrator(config, orchestrator.clone());

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    TestService {
        addr,
        store,
        orchestrator,
        shutdown,
        handle,
    }
}

/// Client without connection pooling or proxy detection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
