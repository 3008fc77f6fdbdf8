//! Integration tests for the HTTP transport
//!
//! Each test builds an engine, serves it on a free local port through
//! `may_minihttp` and talks raw HTTP/1.1 to it, covering:
//! - request parsing (method, path, query, headers, body)
//! - response encoding (status line, headers, body)
//! - 404 and panic handling over the wire
//! - server start, readiness and shutdown

mod common;

use common::http::{get, send_request};
use common::test_server::TestServer;
use grove::engine::Engine;
use grove::middleware::{logger, request_span};
use http::StatusCode;
use serde_json::Value;

fn demo_engine() -> Engine {
    let mut engine = Engine::new();
    engine.use_middleware(request_span());
    engine
        .get("/", |c| c.html(StatusCode::OK, "<h1>hello grove</h1>"))
        .unwrap();
    engine
        .get("/hello", |c| {
            let name = c.query("name").unwrap_or_default().to_string();
            c.string(
                StatusCode::OK,
                format!("hello {name}, you're at {}\n", c.path()),
            );
        })
        .unwrap();
    engine
        .get("/headers", |c| {
            let agent = c.header("user-agent").unwrap_or("none").to_string();
            c.set_header("X-Agent", &agent);
            c.string(StatusCode::OK, agent);
        })
        .unwrap();
    engine.get("/panic", |_| panic!("deliberate")).unwrap();

    let mut v1 = engine.group("/v1").unwrap();
    v1.use_middleware(logger());
    v1.post("/login", |c| {
        let body: Value = serde_json::from_slice(c.body()).unwrap_or(Value::Null);
        c.json(StatusCode::OK, &serde_json::json!({ "username": body["username"] }));
    })
    .unwrap();
    engine
}

#[test]
fn test_html_root() {
    let server = TestServer::start(demo_engine());
    let resp = get(&server.addr(), "/");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("content-type"), Some("text/html"));
    assert_eq!(resp.text(), "<h1>hello grove</h1>");
}

#[test]
fn test_query_string() {
    let server = TestServer::start(demo_engine());
    let resp = get(&server.addr(), "/hello?name=geektutu");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("content-type"), Some("text/plain"));
    assert_eq!(resp.text(), "hello geektutu, you're at /hello\n");
}

#[test]
fn test_request_and_response_headers() {
    let server = TestServer::start(demo_engine());
    let resp = send_request(
        &server.addr(),
        "GET /headers HTTP/1.1\r\nHost: localhost\r\nUser-Agent: grove-test\r\n\r\n",
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("x-agent"), Some("grove-test"));
    assert_eq!(resp.text(), "grove-test");
}

#[test]
fn test_json_post() {
    let server = TestServer::start(demo_engine());
    let body = r#"{"username":"geek","password":"1234"}"#;
    let resp = send_request(
        &server.addr(),
        &format!(
            "POST /v1/login HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        ),
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("content-type"), Some("application/json"));
    let json: Value = serde_json::from_slice(&resp.body).unwrap();
    assert_eq!(json["username"], "geek");
}

#[test]
fn test_route_404() {
    let server = TestServer::start(demo_engine());
    let resp = get(&server.addr(), "/nope");
    assert_eq!(resp.status, 404);
    assert_eq!(resp.text(), "404 NOT FOUND /nope\n");

    let resp = send_request(
        &server.addr(),
        "DELETE / HTTP/1.1\r\nHost: localhost\r\n\r\n",
    );
    assert_eq!(resp.status, 404);
}

#[test]
fn test_panic_returns_500_and_server_survives() {
    let server = TestServer::start(demo_engine());
    let resp = get(&server.addr(), "/panic");
    assert_eq!(resp.status, 500);

    let resp = get(&server.addr(), "/hello?name=after");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.text(), "hello after, you're at /hello\n");
}

#[test]
fn test_start_wait_stop() {
    common::test_server::setup_may_runtime();
    let addr = common::test_server::free_addr();
    let handle = demo_engine().seal().start(addr).unwrap();
    handle.wait_ready().unwrap();
    assert_eq!(handle.addr(), addr);
    assert_eq!(get(&addr, "/").status, 200);
    handle.stop();
}
