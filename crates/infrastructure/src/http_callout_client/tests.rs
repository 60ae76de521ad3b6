use std::time::Duration;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{CalloutClient, CalloutConfig, CalloutError, CalloutRequest};

fn client_for(server: &MockServer) -> CalloutClient {
    let Ok(config) = CalloutConfig::new(&server.uri()) else {
        panic!("mock server uri should parse");
    };
    CalloutClient::new(reqwest::Client::new(), config)
}

#[tokio::test]
async fn aborts_with_network_error_after_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .send(CalloutRequest::get("/slow").timeout(Duration::from_millis(50)))
        .await;

    assert!(matches!(result, Err(CalloutError::Network { .. })));
}

#[tokio::test]
async fn error_message_is_taken_from_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/things"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid request"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .send(CalloutRequest::post("/things").json(json!({"name": "x"})))
        .await;

    match result {
        Err(CalloutError::Api {
            status,
            code,
            message,
            ..
        }) => {
            assert_eq!(status, 400);
            assert_eq!(code, "Bad Request");
            assert_eq!(message, "Invalid request");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn array_error_bodies_use_first_element() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!([
            {"message": "Session expired or invalid", "errorCode": "INVALID_SESSION_ID"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.send(CalloutRequest::get("/query")).await;

    let Err(error) = result else {
        panic!("expected api error");
    };
    assert_eq!(error.status(), Some(401));
    assert_eq!(error.code(), Some("INVALID_SESSION_ID"));
    assert_eq!(
        error.to_string(),
        "remote API returned 401 INVALID_SESSION_ID: Session expired or invalid"
    );
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.send(CalloutRequest::get("/")).await;

    match result {
        Err(CalloutError::Api { code, message, payload, .. }) => {
            assert_eq!(code, "Bad Gateway");
            assert_eq!(message, "upstream exploded");
            assert!(payload.is_none());
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_field_wins_over_error_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "authentication failure"
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).send(CalloutRequest::post("/token")).await;

    match result {
        Err(CalloutError::Api { message, .. }) => assert_eq!(message, "invalid_grant"),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn json_error_without_message_is_stringified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"field": "date"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.send(CalloutRequest::get("/")).await;

    match result {
        Err(CalloutError::Api { message, .. }) => assert_eq!(message, r#"{"field":"date"}"#),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_body_returns_response_without_payload() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.send(CalloutRequest::delete("/records/1")).await;

    let Ok(response) = result else {
        panic!("expected success");
    };
    assert_eq!(response.status(), 204);
    assert!(response.payload().is_none());
}

#[tokio::test]
async fn caller_cancellation_aborts_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let result = client
        .send(CalloutRequest::get("/").cancellation(token))
        .await;

    match result {
        Err(CalloutError::Network { code, .. }) => assert_eq!(code.as_deref(), Some("ABORTED")),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn basic_credentials_and_form_body_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("grant_type=client_credentials&scope=api+refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let Ok(config) = CalloutConfig::new(&server.uri()) else {
        panic!("mock server uri should parse");
    };
    let client = CalloutClient::new(
        reqwest::Client::new(),
        config.with_basic_auth("user", "pass"),
    );

    let result: Result<Value, CalloutError> = client
        .send_json(
            CalloutRequest::post("/token")
                .form([("grant_type", "client_credentials"), ("scope", "api refresh")]),
        )
        .await;

    assert_eq!(result.ok(), Some(json!({"ok": true})));
}

#[test]
fn query_parameters_expand_arrays_and_stringify_objects() {
    let Ok(config) = CalloutConfig::new("https://flex.example.com/api/") else {
        panic!("static url should parse");
    };
    let client = CalloutClient::new(reqwest::Client::new(), config);

    let request = CalloutRequest::get("absences")
        .param("ids", json!([1, 2]))
        .param("filter", json!({"status": 2}))
        .param("name", "anna")
        .param("skipped", Value::Null);
    let Ok(url) = client.url_for(&request) else {
        panic!("url should build");
    };

    assert_eq!(url.path(), "/api/absences");
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("ids[]".to_owned(), "1".to_owned()),
            ("ids[]".to_owned(), "2".to_owned()),
            ("filter".to_owned(), r#"{"status":2}"#.to_owned()),
            ("name".to_owned(), "anna".to_owned()),
        ]
    );
}

#[test]
fn absolute_paths_bypass_base_url() {
    let Ok(config) = CalloutConfig::new("https://login.example.com") else {
        panic!("static url should parse");
    };
    let client = CalloutClient::new(reqwest::Client::new(), config);

    let url = client.url_for(&CalloutRequest::get("https://eu1.example.com/services/data"));
    assert_eq!(
        url.map(|url| url.to_string()).ok().as_deref(),
        Some("https://eu1.example.com/services/data")
    );
}

#[test]
fn callout_errors_map_to_app_errors() {
    let api = opsdash_core::AppError::from(CalloutError::Api {
        status: 400,
        code: "Bad Request".to_owned(),
        message: "Invalid request".to_owned(),
        payload: None,
    });
    assert!(matches!(api, opsdash_core::AppError::Upstream(message) if message.contains("Invalid request")));

    let network = opsdash_core::AppError::from(CalloutError::Network {
        message: "timed out".to_owned(),
        status: None,
        code: Some("ABORTED".to_owned()),
    });
    assert!(matches!(network, opsdash_core::AppError::Network(_)));
}
