//! End-to-end tests of the pipeline, dispatcher, and control API.

use bytes::Bytes;
use faultline_config::{Config, EndpointConfig, TargetConfig};
use faultline_core::{Body, VERSION_HEADER};
use faultline_runtime::{RequestHandler, Server};
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn base_config() -> Config {
    let mut config = Config::default();
    config.server.listen = "127.0.0.1:0".parse().unwrap();
    // Keep latency assertions tight: no base jitter in tests.
    config.faults.base_jitter = Duration::ZERO;
    config.endpoints.push(EndpointConfig {
        method: "GET".to_string(),
        route: "/a".to_string(),
        response_status: Some(200),
        response_body: Some("A".to_string()),
        targets: None,
    });
    config.endpoints.push(EndpointConfig {
        method: "POST".to_string(),
        route: "/a".to_string(),
        response_status: Some(201),
        response_body: Some("OK".to_string()),
        targets: None,
    });
    config
}

fn handler(config: Config) -> RequestHandler {
    Server::builder()
        .config(config)
        .build()
        .expect("server builds")
        .request_handler()
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn static_endpoint_returns_configured_response() {
    let handler = handler(base_config());

    let resp = handler
        .handle_request(request(Method::GET, "/api/a"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(VERSION_HEADER));
    assert_eq!(body_string(resp).await, "A");

    let resp = handler
        .handle_request(request(Method::POST, "/api/a"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn unknown_endpoint_is_404() {
    let handler = handler(base_config());

    let resp = handler
        .handle_request(request(Method::GET, "/api/missing"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Same route, unregistered method.
    let resp = handler
        .handle_request(request(Method::DELETE, "/api/a"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Outside the API prefix.
    let resp = handler
        .handle_request(request(Method::GET, "/elsewhere"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_lists_all_endpoints() {
    let handler = handler(base_config());

    let resp = handler
        .handle_request(request(Method::GET, "/"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let catalog: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    let entries = catalog.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["method"], "GET");
    assert_eq!(entries[0]["route"], "/a");
    assert_eq!(entries[0]["response_status"], 200);
}

#[tokio::test]
async fn delay_spec_round_trip_changes_observed_latency() {
    let handler = handler(base_config());

    // Unset: 404 on read, fast responses.
    let resp = handler
        .handle_request(request(
            Method::GET,
            "/delay/endpoint?method=GET&route=/a",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Install a certain 100ms delay.
    let resp = handler
        .handle_request(request(
            Method::PUT,
            "/delay/endpoint?method=GET&route=/a&duration=100&probability=1.0",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = handler
        .handle_request(request(
            Method::GET,
            "/delay/endpoint?method=GET&route=/a",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "100ms (probability: 1.0)\n");

    let start = Instant::now();
    let resp = handler
        .handle_request(request(Method::GET, "/api/a"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(start.elapsed() >= Duration::from_millis(100));

    // Delete restores never-configured behavior.
    let resp = handler
        .handle_request(request(
            Method::DELETE,
            "/delay/endpoint?method=GET&route=/a",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let start = Instant::now();
    handler
        .handle_request(request(Method::GET, "/api/a"))
        .await
        .unwrap();
    assert!(start.elapsed() < Duration::from_millis(100));

    let resp = handler
        .handle_request(request(
            Method::DELETE,
            "/delay/endpoint?method=GET&route=/a",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delay_base_round_trip() {
    let handler = handler(base_config());

    let resp = handler
        .handle_request(request(Method::GET, "/delay/base"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "0s\n");

    let resp = handler
        .handle_request(request(Method::PUT, "/delay/base?duration=3"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = handler
        .handle_request(request(Method::GET, "/delay/base"))
        .await
        .unwrap();
    assert_eq!(body_string(resp).await, "3ms\n");
}

#[tokio::test]
async fn delay_put_validation_errors() {
    let handler = handler(base_config());

    let resp = handler
        .handle_request(request(
            Method::PUT,
            "/delay/endpoint?method=GET&route=/a",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = handler
        .handle_request(request(
            Method::PUT,
            "/delay/endpoint?method=GET&route=/a&duration=soon",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = handler
        .handle_request(request(
            Method::PUT,
            "/delay/endpoint?method=GET&route=/a&duration=100&probability=1.5",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn error_spec_injects_and_restores() {
    let handler = handler(base_config());

    let resp = handler
        .handle_request(request(
            Method::PUT,
            "/error?method=GET&route=/a&status_code=503&message=backend%20down&probability=1.0",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = handler
        .handle_request(request(Method::GET, "/error?method=GET&route=/a"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_string(resp).await,
        "503 \"backend down\" (probability: 1.0)\n"
    );

    // The injected error short-circuits the endpoint.
    let resp = handler
        .handle_request(request(Method::GET, "/api/a"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_string(resp).await, "backend down");

    // Other endpoints are unaffected.
    let resp = handler
        .handle_request(request(Method::POST, "/api/a"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Delete restores normal responses.
    let resp = handler
        .handle_request(request(Method::DELETE, "/error?method=GET&route=/a"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = handler
        .handle_request(request(Method::GET, "/api/a"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "A");
}

#[tokio::test]
async fn error_put_validation_errors() {
    let handler = handler(base_config());

    let resp = handler
        .handle_request(request(Method::PUT, "/error?route=/a"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = handler
        .handle_request(request(
            Method::PUT,
            "/error?method=GET&route=/a&status_code=99",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = handler
        .handle_request(request(
            Method::PUT,
            "/error?method=GET&route=/a&probability=2",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn metrics_record_served_requests_but_not_ignored_paths() {
    let handler = handler(base_config());

    handler
        .handle_request(request(Method::GET, "/api/a"))
        .await
        .unwrap();
    handler
        .handle_request(request(Method::GET, "/api/a"))
        .await
        .unwrap();

    // Scrapes of /metrics itself are exempt from recording.
    let resp = handler
        .handle_request(request(Method::GET, "/metrics"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let first = body_string(resp).await;
    assert!(first.contains(
        "faultline_http_request_latency_seconds_count{method=\"GET\",path=\"/api/a\",status=\"200\"} 2"
    ));
    assert!(!first.contains("path=\"/metrics\""));

    let resp = handler
        .handle_request(request(Method::GET, "/metrics"))
        .await
        .unwrap();
    let second = body_string(resp).await;
    assert!(second.contains("faultline_http_requests_total 2"));
}

#[tokio::test]
async fn injected_error_is_recorded_as_served_request() {
    let handler = handler(base_config());

    handler
        .handle_request(request(
            Method::PUT,
            "/error?method=GET&route=/a&status_code=500&probability=1.0",
        ))
        .await
        .unwrap();
    handler
        .handle_request(request(Method::GET, "/api/a"))
        .await
        .unwrap();

    let resp = handler
        .handle_request(request(Method::GET, "/metrics"))
        .await
        .unwrap();
    let metrics = body_string(resp).await;

    // Measurement wraps mutation: the injected status shows up in the
    // metrics labels.
    assert!(metrics.contains(
        "faultline_http_request_latency_seconds_count{method=\"GET\",path=\"/api/a\",status=\"500\"} 1"
    ));
}

#[tokio::test]
async fn chain_endpoint_aggregates_in_declaration_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok-a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("A"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok-c"))
        .respond_with(ResponseTemplate::new(200).set_body_string("C"))
        .mount(&server)
        .await;

    let mut config = base_config();
    config.endpoints.push(EndpointConfig {
        method: "GET".to_string(),
        route: "/chain".to_string(),
        response_status: None,
        response_body: None,
        targets: Some(vec![
            TargetConfig {
                method: "GET".to_string(),
                url: format!("{}/ok-a", server.uri()),
            },
            TargetConfig {
                method: "GET".to_string(),
                // Nothing listens on port 1: transport failure.
                url: "http://127.0.0.1:1/down".to_string(),
            },
            TargetConfig {
                method: "GET".to_string(),
                url: format!("{}/ok-c", server.uri()),
            },
        ]),
    });

    let handler = handler(config);

    let resp = handler
        .handle_request(request(Method::GET, "/api/chain"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let lines: Vec<String> = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "HTTP 200 OK: A");
    assert!(lines[1].starts_with("error: "));
    assert_eq!(lines[2], "HTTP 200 OK: C");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_control_mutations_are_safe() {
    let handler = handler(base_config());
    let mut tasks = Vec::new();

    for i in 0..16u32 {
        let handler = handler.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..50 {
                match i % 4 {
                    0 => {
                        let resp = handler
                            .handle_request(request(
                                Method::PUT,
                                "/delay/endpoint?method=GET&route=/a&duration=1&probability=0.0",
                            ))
                            .await
                            .unwrap();
                        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
                    }
                    1 => {
                        let resp = handler
                            .handle_request(request(
                                Method::GET,
                                "/delay/endpoint?method=GET&route=/a",
                            ))
                            .await
                            .unwrap();
                        // Either a concurrent writer's spec or nothing.
                        assert!(
                            resp.status() == StatusCode::OK
                                || resp.status() == StatusCode::NOT_FOUND
                        );
                    }
                    2 => {
                        let resp = handler
                            .handle_request(request(
                                Method::DELETE,
                                "/delay/endpoint?method=GET&route=/a",
                            ))
                            .await
                            .unwrap();
                        assert!(
                            resp.status() == StatusCode::NO_CONTENT
                                || resp.status() == StatusCode::NOT_FOUND
                        );
                    }
                    _ => {
                        let resp = handler
                            .handle_request(request(Method::GET, "/api/a"))
                            .await
                            .unwrap();
                        assert_eq!(resp.status(), StatusCode::OK);
                    }
                }
            }
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }
}
