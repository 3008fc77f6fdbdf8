//! Integration tests for the engine: groups, middleware chains and dispatch.
//!
//! Requests are dispatched in-process through `RouteTable::handle`; the
//! transport is covered by `server_tests.rs`.

use grove::context::{HttpRequest, HttpResponse};
use grove::engine::{Engine, RouteTable};
use grove::middleware::logger;
use http::{Method, StatusCode};
use std::sync::{Arc, Mutex};

type Trace = Arc<Mutex<Vec<String>>>;

fn tracer(trace: &Trace, name: &'static str) -> impl Fn(&mut grove::Context) + Send + Sync + 'static {
    let trace = Arc::clone(trace);
    move |c: &mut grove::Context| {
        trace.lock().unwrap().push(format!("{name}:before"));
        c.next();
        trace.lock().unwrap().push(format!("{name}:after"));
    }
}

fn get(table: &RouteTable, target: &str) -> HttpResponse {
    table.handle(HttpRequest::new(Method::GET, target))
}

#[test]
fn test_nested_group_middleware_order() {
    let trace: Trace = Arc::new(Mutex::new(Vec::new()));
    let mut engine = Engine::new();
    engine.use_middleware(tracer(&trace, "root"));
    {
        let mut v1 = engine.group("/v1").unwrap();
        v1.use_middleware(tracer(&trace, "A"));
        let mut v2 = v1.group("/v2").unwrap();
        v2.use_middleware(tracer(&trace, "B"));
        let t = Arc::clone(&trace);
        v2.get("/hello", move |c| {
            t.lock().unwrap().push("route".to_string());
            c.string(StatusCode::OK, "hi");
        })
        .unwrap();
    }
    let table = engine.seal();

    let resp = get(&table, "/v1/v2/hello");
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        *trace.lock().unwrap(),
        vec![
            "root:before",
            "A:before",
            "B:before",
            "route",
            "B:after",
            "A:after",
            "root:after"
        ]
    );
}

#[test]
fn test_group_middleware_scoped_to_prefix() {
    let trace: Trace = Arc::new(Mutex::new(Vec::new()));
    let mut engine = Engine::new();
    engine
        .group("/api")
        .unwrap()
        .use_middleware(tracer(&trace, "api"))
        .get("/users", |c| c.string(StatusCode::OK, "users"))
        .unwrap();
    engine
        .get("/apiv2/users", |c| c.string(StatusCode::OK, "v2"))
        .unwrap();
    let table = engine.seal();

    assert_eq!(get(&table, "/apiv2/users").text(), "v2");
    assert!(trace.lock().unwrap().is_empty());

    assert_eq!(get(&table, "/api/users").text(), "users");
    assert_eq!(trace.lock().unwrap().len(), 2);
}

#[test]
fn test_group_middleware_runs_for_unmatched_path() {
    let trace: Trace = Arc::new(Mutex::new(Vec::new()));
    let mut engine = Engine::new();
    engine
        .group("/v1")
        .unwrap()
        .use_middleware(tracer(&trace, "v1"));
    let table = engine.seal();

    let resp = get(&table, "/v1/missing");
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.text(), "404 NOT FOUND /v1/missing\n");
    assert_eq!(*trace.lock().unwrap(), vec!["v1:before", "v1:after"]);
}

#[test]
fn test_short_circuit_skips_route() {
    let hits = Arc::new(Mutex::new(0));
    let h = Arc::clone(&hits);
    let mut engine = Engine::new();
    let mut admin = engine.group("/admin").unwrap();
    admin.use_middleware(|c| {
        if c.header("authorization").is_none() {
            c.json(
                StatusCode::UNAUTHORIZED,
                &serde_json::json!({ "error": "unauthorized" }),
            );
            return;
        }
        c.next();
    });
    admin
        .get("/panel", move |c| {
            *h.lock().unwrap() += 1;
            c.string(StatusCode::OK, "panel");
        })
        .unwrap();
    let table = engine.seal();

    let resp = get(&table, "/admin/panel");
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(*hits.lock().unwrap(), 0);

    let resp = table.handle(
        HttpRequest::new(Method::GET, "/admin/panel").with_header("Authorization", "Bearer x"),
    );
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(*hits.lock().unwrap(), 1);
}

#[test]
fn test_middleware_sees_final_status() {
    let seen = Arc::new(Mutex::new(None));
    let s = Arc::clone(&seen);
    let mut engine = Engine::new();
    engine.use_middleware(move |c| {
        c.next();
        *s.lock().unwrap() = Some(c.status());
    });
    engine.use_middleware(logger());
    engine
        .post("/items", |c| c.string(StatusCode::CREATED, "made"))
        .unwrap();
    let table = engine.seal();

    let resp = table.handle(HttpRequest::new(Method::POST, "/items"));
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(*seen.lock().unwrap(), Some(StatusCode::CREATED));
}

#[test]
fn test_headers_after_status_are_ignored() {
    let mut engine = Engine::new();
    engine.use_middleware(|c| {
        c.next();
        c.set_header("X-Late", "1");
    });
    engine
        .get("/h", |c| {
            c.set_header("X-Early", "1");
            c.string(StatusCode::OK, "h");
        })
        .unwrap();
    let resp = get(&engine.seal(), "/h");
    assert_eq!(resp.header("x-early"), Some("1"));
    assert!(resp.header("x-late").is_none());
}

#[test]
fn test_handler_without_status_defaults_to_ok() {
    let mut engine = Engine::new();
    engine.get("/silent", |_| {}).unwrap();
    engine.get("/raw", |c| c.write(b"raw")).unwrap();
    let table = engine.seal();

    let resp = get(&table, "/silent");
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.is_empty());

    let resp = get(&table, "/raw");
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.text(), "raw");
}

#[test]
fn test_panic_in_middleware_is_contained() {
    let mut engine = Engine::new();
    engine
        .group("/boom")
        .unwrap()
        .use_middleware(|_| panic!("middleware exploded"));
    engine.get("/ok", |c| c.string(StatusCode::OK, "fine")).unwrap();
    let table = engine.seal();

    let resp = get(&table, "/boom/anything");
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(get(&table, "/ok").text(), "fine");
}

#[test]
fn test_re_registration_replaces_handler() {
    let mut engine = Engine::new();
    engine.get("/v", |c| c.string(StatusCode::OK, "one")).unwrap();
    engine.get("/v", |c| c.string(StatusCode::OK, "two")).unwrap();
    let table = engine.seal();
    assert_eq!(table.routes().len(), 1);
    assert_eq!(get(&table, "/v").text(), "two");
}

#[test]
fn test_query_and_form_values() {
    let mut engine = Engine::new();
    engine
        .post("/form", |c| {
            let user = c.post_form("user").unwrap_or_default();
            let page = c.query("page").unwrap_or("1").to_string();
            c.string(StatusCode::OK, format!("{user}@{page}"));
        })
        .unwrap();
    let table = engine.seal();

    let resp = table.handle(
        HttpRequest::new(Method::POST, "/form?page=3&user=query")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body("user=body+name"),
    );
    assert_eq!(resp.text(), "body name@3");

    let resp = table.handle(HttpRequest::new(Method::POST, "/form?user=query"));
    assert_eq!(resp.text(), "query@1");
}

#[test]
fn test_static_files_mount() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("css")).unwrap();
    std::fs::write(dir.path().join("css/site.css"), "h1 {}").unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();

    let mut engine = Engine::new();
    engine
        .group("/v1")
        .unwrap()
        .static_files("/assets", dir.path())
        .unwrap();
    let table = engine.seal();

    let resp = get(&table, "/v1/assets/css/site.css");
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("content-type"), Some("text/css"));
    assert_eq!(resp.text(), "h1 {}");

    let resp = get(&table, "/v1/assets/index.html");
    assert_eq!(resp.header("content-type"), Some("text/html"));

    let resp = get(&table, "/v1/assets/missing.js");
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.body.is_empty());

    let resp = get(&table, "/v1/assets/../Cargo.toml");
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_percent_encoded_paths_are_decoded() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("my file.css"), "p {}").unwrap();

    let mut engine = Engine::new();
    engine
        .get("/hello/:name", |c| {
            let name = c.param("name").unwrap_or_default().to_string();
            c.string(StatusCode::OK, name);
        })
        .unwrap();
    engine.static_files("/assets", dir.path()).unwrap();
    let table = engine.seal();

    assert_eq!(get(&table, "/hello/j%C3%B6rg").text(), "jörg");
    assert_eq!(get(&table, "/hello/a%2Fb").text(), "a%2Fb");

    let resp = get(&table, "/assets/my%20file.css");
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.text(), "p {}");

    let resp = get(&table, "/assets/%2E%2E/Cargo.toml");
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_html_templates() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("arr.tmpl"),
        "<ul>{% for s in students %}<li>{{ s.name }}</li>{% endfor %}</ul>",
    )
    .unwrap();

    let mut engine = Engine::new();
    engine
        .load_html_glob(&format!("{}/*.tmpl", dir.path().display()))
        .unwrap();
    engine
        .get("/students", |c| {
            let data = serde_json::json!({
                "students": [{ "name": "Geektutu" }, { "name": "Jack" }]
            });
            c.html_template(StatusCode::OK, "arr.tmpl", &data);
        })
        .unwrap();
    engine
        .get("/broken", |c| {
            c.html_template(StatusCode::OK, "nope.tmpl", &serde_json::json!({}));
        })
        .unwrap();
    let table = engine.seal();

    let resp = get(&table, "/students");
    assert_eq!(resp.header("content-type"), Some("text/html"));
    assert_eq!(resp.text(), "<ul><li>Geektutu</li><li>Jack</li></ul>");

    let resp = get(&table, "/broken");
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_load_html_glob_without_matches_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::new();
    assert!(engine
        .load_html_glob(&format!("{}/*.tmpl", dir.path().display()))
        .is_err());
}

#[test]
fn test_table_is_shareable_across_threads() {
    let mut engine = Engine::new();
    engine
        .get("/echo/:word", |c| {
            let word = c.param("word").unwrap_or_default().to_string();
            c.string(StatusCode::OK, word);
        })
        .unwrap();
    let table = Arc::new(engine.seal());

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let table = Arc::clone(&table);
            std::thread::spawn(move || {
                for j in 0..50 {
                    let word = format!("w{i}-{j}");
                    let resp = table.handle(HttpRequest::new(Method::GET, &format!("/echo/{word}")));
                    assert_eq!(resp.text(), word);
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
}
