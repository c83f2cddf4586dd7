use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use crumbs::{
    compliance::ComplianceMode,
    cookies::CookieSet,
    handler::{self, CookieEcho, Handler},
    request::Request,
    response::Response,
    server::Server,
    status,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::{mpsc, Notify},
    time::timeout,
};

const HOST: &str = "127.0.0.1";

/// Hands each request's cookies back to the test.
struct CaptureHandler {
    tx: mpsc::Sender<CookieSet>,
}

#[async_trait]
impl Handler for CaptureHandler {
    async fn handle(&self, r: &Request) -> Result<Response, handler::Error> {
        self.tx
            .send(r.cookies().clone())
            .await
            .map_err(|e| handler::Error::Failed(e.to_string()))?;
        Ok(Response::new(status::OK))
    }
}

async fn start_server(
    port: u16,
    handler: impl Handler + 'static,
) -> (Arc<mpsc::Sender<bool>>, Arc<Notify>) {
    let mut server = Server::new(HOST, port).with_compliance(ComplianceMode::Rfc6265);
    server.route_default(handler);
    let ready = server.start_notifier();
    let shutdown = server.shutdown();

    tokio::spawn(async move { server.start().await.unwrap() });
    ready.notified().await;
    shutdown
}

async fn shutdown_server(shutdown: (Arc<mpsc::Sender<bool>>, Arc<Notify>)) {
    shutdown.0.send(true).await.unwrap();
    shutdown.1.notified().await;
}

/// Writes a raw request and hangs up without reading the response.
async fn send_and_close(port: u16, raw: &str) {
    let mut stream = TcpStream::connect(format!("{}:{}", HOST, port))
        .await
        .unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    stream.flush().await.unwrap();
}

async fn exchange(port: u16, raw: &str) -> String {
    let mut stream = TcpStream::connect(format!("{}:{}", HOST, port))
        .await
        .unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut buf = vec![];
    timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .unwrap()
        .unwrap();
    String::from_utf8(buf).unwrap()
}

async fn expect_two_cookies(rx: &mut mpsc::Receiver<CookieSet>) {
    let cookies = timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(cookies.len(), 2);
    assert_eq!(
        cookies.pairs(),
        vec![("COOKIE1", "ABC"), ("COOKIE2", "123")]
    );
}

#[tokio::test]
async fn cookies_single_header_separated_by_comma() {
    let port = 7911;
    let (tx, mut rx) = mpsc::channel(1);
    let shutdown = start_server(port, CaptureHandler { tx }).await;

    send_and_close(
        port,
        "GET / HTTP/1.1\n\
         Host: localhost\n\
         Cookie: $Version=\"1\"; COOKIE1=\"ABC\", $Version=\"1\"; COOKIE2=\"123\"\n\
         \n\
         Content\n",
    )
    .await;

    expect_two_cookies(&mut rx).await;
    shutdown_server(shutdown).await;
}

#[tokio::test]
async fn cookies_single_header_separated_by_semicolon() {
    let port = 7912;
    let (tx, mut rx) = mpsc::channel(1);
    let shutdown = start_server(port, CaptureHandler { tx }).await;

    send_and_close(
        port,
        "GET / HTTP/1.1\n\
         Host: localhost\n\
         Cookie: $Version=\"1\"; COOKIE1=\"ABC\"; $Version=\"1\"; COOKIE2=\"123\"\n\
         \n\
         Content\n",
    )
    .await;

    expect_two_cookies(&mut rx).await;
    shutdown_server(shutdown).await;
}

#[tokio::test]
async fn cookies_multiple_headers() {
    let port = 7913;
    let (tx, mut rx) = mpsc::channel(1);
    let shutdown = start_server(port, CaptureHandler { tx }).await;

    send_and_close(
        port,
        "GET / HTTP/1.1\r\n\
         Host: localhost:7913\r\n\
         Cookie: COOKIE1=ABC\r\n\
         Cookie: COOKIE2=123\r\n\
         \r\n",
    )
    .await;

    expect_two_cookies(&mut rx).await;
    shutdown_server(shutdown).await;
}

#[tokio::test]
async fn cookie_echo() {
    crumbs::logger::init();

    let port = 7914;
    let shutdown = start_server(port, CookieEcho).await;

    let response = exchange(
        port,
        "GET /echo HTTP/1.1\r\n\
         Cookie: A=1; garbage; B=2\r\n\
         Cookie: A=3\r\n\
         \r\n",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    let (_, body) = response.split_once("\r\n\r\n").unwrap();
    let cookies: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        cookies,
        serde_json::json!([
            {"name": "A", "value": "1"},
            {"name": "B", "value": "2"},
        ])
    );

    shutdown_server(shutdown).await;
}

#[tokio::test]
async fn no_cookies() {
    let port = 7915;
    let shutdown = start_server(port, CookieEcho).await;

    let response = exchange(port, "GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.ends_with("\r\n\r\n[]"));

    shutdown_server(shutdown).await;
}

#[tokio::test]
async fn bad_request() {
    let port = 7916;
    let shutdown = start_server(port, CookieEcho).await;

    let response = exchange(port, "BIT / HTTP/1.1\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));

    shutdown_server(shutdown).await;
}
