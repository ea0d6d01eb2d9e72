//! End-to-end scenarios against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port in a background
//! thread with a dedicated tokio runtime, then drives the blocking executor
//! and fan-out harness over real HTTP.

use std::sync::Arc;
use std::time::{Duration, Instant};

use harness_core::{
    fan_out, FanOut, HarnessConfig, HarnessError, HeaderSet, RequestDescriptor, RequestExecutor,
    RequestOptions, SecretKey,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/api/")
}

fn executor_for(config: HarnessConfig) -> RequestExecutor {
    RequestExecutor::new(Arc::new(config)).unwrap()
}

fn executor() -> RequestExecutor {
    executor_for(
        HarnessConfig::new(&start_server())
            .with_api_key(mock_server::API_KEY)
            .with_secret_key(SecretKey::new(b"0123456789abcdef".to_vec()).unwrap()),
    )
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn user_reads(ids: &[u32]) -> Vec<RequestDescriptor> {
    ids.iter().map(|id| RequestDescriptor::get(&format!("users/{id}"))).collect()
}

#[test]
fn create_user_scenarios() {
    let executor = executor();
    let payloads = [
        json!({"name": "Alice", "job": "Engineer"}),
        json!({"name": "Bob"}),
        json!({"job": "Manager"}),
        json!({"name": "Eve", "job": "QA", "extra": "invalid"}),
    ];

    for payload in payloads {
        let data = object(payload);
        let response = executor
            .request("POST", "users", Some(data.clone()), RequestOptions::default())
            .unwrap();
        assert!([201, 400, 422].contains(&response.status()));

        if response.status() == 201 {
            assert!(response.json_field("id").is_some());
            for value in data.values() {
                assert!(response.text().contains(value.as_str().unwrap()));
            }
        }
    }
}

#[test]
fn get_user_scenarios() {
    let executor = executor();

    let found = executor.execute(&RequestDescriptor::get("users/2")).unwrap();
    assert_eq!(found.status(), 200);
    assert!(found.json_field("data").is_some());

    let missing = executor.execute(&RequestDescriptor::get("users/999")).unwrap();
    assert_eq!(missing.status(), 404);
}

#[test]
fn update_user_scenarios() {
    let executor = executor();
    let update = object(json!({"name": "Updated Name", "job": "Updated Job"}));

    let response = executor
        .execute(&RequestDescriptor::put("users/2", update.clone()))
        .unwrap();
    assert_eq!(response.status(), 200);
    for key in update.keys() {
        assert!(response.json_field(key).is_some(), "missing {key}");
    }

    let ghost = executor
        .execute(&RequestDescriptor::put("users/9999", object(json!({"name": "Ghost"}))))
        .unwrap();
    assert!([404, 400, 422].contains(&ghost.status()));
}

#[test]
fn delete_user_twice() {
    let executor = executor();

    let first = executor.execute(&RequestDescriptor::delete("users/2")).unwrap();
    let second = executor.execute(&RequestDescriptor::delete("users/2")).unwrap();

    assert_eq!(first.status(), 204);
    assert!(first.json().is_none());
    assert!([204, 404].contains(&second.status()));
}

#[test]
fn response_time_under_500ms() {
    let executor = executor();

    let started = Instant::now();
    let response = executor.execute(&RequestDescriptor::get("users/2")).unwrap();

    assert_eq!(response.status(), 200);
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(response.elapsed() <= started.elapsed());
}

#[test]
fn concurrent_reads() {
    let executor = executor();

    let results = fan_out(&executor, &user_reads(&[1, 2, 3, 4, 5]));

    assert_eq!(results.len(), 5);
    assert!(results.is_complete());
    assert!(results.all_status(200));
}

#[test]
fn fan_out_waits_for_slowest_request() {
    let executor = executor();
    let mut descriptors = user_reads(&[1, 2, 3, 4]);
    descriptors.push(RequestDescriptor::get("users/5?delay_ms=300"));

    let started = Instant::now();
    let results = fan_out(&executor, &descriptors);

    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(results.len(), 5);
    assert!(results.all_status(200));
}

#[test]
fn fan_out_isolates_a_timed_out_worker() {
    let executor = executor_for(
        HarnessConfig::new(&start_server())
            .with_api_key(mock_server::API_KEY)
            .with_timeout(Duration::from_millis(500)),
    );
    let mut descriptors = user_reads(&[1, 2, 4, 5]);
    descriptors.push(RequestDescriptor::get("users/3?delay_ms=3000"));

    let results = FanOut::new(&executor).run(&descriptors);

    assert_eq!(results.len(), 4);
    assert!(results.all_status(200));
    assert_eq!(results.failures().len(), 1);
    assert_eq!(results.failures()[0].path, "users/3?delay_ms=3000");
    assert!(results.failures()[0].error.is_transport());
}

#[test]
fn encrypted_body_round_trips_through_server() {
    let executor = executor();
    let data = object(json!({"name": "Alice", "job": "Engineer"}));

    let response = executor
        .request(
            "POST",
            "users",
            Some(data.clone()),
            RequestOptions {
                encrypt: true,
                ..RequestOptions::default()
            },
        )
        .unwrap();

    assert_eq!(response.status(), 201);
    assert!(response.json_field("name").is_none());
    let payload = response.json_field("payload").unwrap().as_str().unwrap();
    assert_eq!(executor.codec().unwrap().decode(payload), data);
}

#[test]
fn call_headers_reach_the_server() {
    let executor = executor();
    let headers: HeaderSet = [("x-request-id", "abc-123")].into_iter().collect();

    let response = executor
        .request("GET", "headers", None, RequestOptions { headers, encrypt: false })
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.json_field("x-request-id"), Some(&json!("abc-123")));
    assert_eq!(response.json_field("x-api-key"), Some(&json!(mock_server::API_KEY)));
    assert_eq!(response.json_field("content-type"), Some(&json!("application/json")));
}

#[test]
fn overriding_api_key_is_honoured() {
    let executor = executor();
    let descriptor = RequestDescriptor::get("users/2").with_header("X-Api-Key", "wrong");

    let response = executor.execute(&descriptor).unwrap();

    assert_eq!(response.status(), 401);
}

#[test]
fn patch_is_rejected_before_dispatch() {
    let executor = executor();

    let err = executor
        .request("PATCH", "users/2", None, RequestOptions::default())
        .unwrap_err();

    assert!(matches!(err, HarnessError::UnsupportedMethod(_)));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let executor = executor_for(HarnessConfig::new(&format!("http://127.0.0.1:{port}/api/")));

    let err = executor.execute(&RequestDescriptor::get("users/2")).unwrap_err();

    assert!(err.is_transport());
}
