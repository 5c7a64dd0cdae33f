//! Lifecycle operations over the reqwest transport against a mock API.

use std::time::Duration;

use assert_json_diff::assert_json_eq;
use serde_json::{Value, json};
use spacectl_core::{
    ClientConfig, DesiredConfig, Entries, ErrorCategory, HttpTransport, ObservedState,
    SpaceController, SpaceError,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "hf_test_token";

fn controller(server: &MockServer) -> SpaceController<HttpTransport> {
    let config = ClientConfig::new()
        .with_base_url(format!("{}/api", server.uri()))
        .with_token(TOKEN)
        .with_request_timeout(Duration::from_secs(5));
    SpaceController::new(HttpTransport::new(config).expect("transport"))
}

fn desired() -> DesiredConfig {
    DesiredConfig {
        name: "demo".to_string(),
        private: false,
        sdk: "gradio".to_string(),
        template: None,
        hardware: "cpu-basic".to_string(),
        storage: "small".to_string(),
        sleep_time: 3600,
        secrets: None,
        variables: None,
    }
}

fn observed() -> ObservedState {
    ObservedState {
        id: "acme/demo".to_string(),
        name: "demo".to_string(),
        private: false,
        sdk: Some("gradio".to_string()),
        hardware: Some("cpu-basic".to_string()),
        storage: Some("small".to_string()),
        sleep_time: Some(3600),
        ..ObservedState::default()
    }
}

fn entries(pairs: &[(&str, &str)]) -> Entries {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Received requests as `"METHOD /path"` plus their JSON bodies.
async fn received(server: &MockServer) -> Vec<(String, Value)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|r| {
            let body = serde_json::from_slice(&r.body).unwrap_or(Value::Null);
            (format!("{} {}", r.method, r.url.path()), body)
        })
        .collect()
}

#[tokio::test]
async fn test_create_sends_structured_body_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/repos/create"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(body_json(json!({
            "type": "space",
            "name": "demo",
            "private": false,
            "sdk": "gradio",
            "hardware": "cpu-basic",
            "storage": "small",
            "sleepTime": 3600
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "acme/demo",
            "url": "https://huggingface.co/spaces/acme/demo"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = controller(&server).create(&desired()).await.unwrap();

    assert_eq!(state.id, "acme/demo");
    assert_eq!(state.name, "demo");
    assert_eq!(state.hardware.as_deref(), Some("cpu-basic"));
    assert_eq!(state.storage.as_deref(), Some("small"));
    assert_eq!(state.sleep_time, Some(3600));
}

#[tokio::test]
async fn test_update_renames_before_hardware_and_uses_new_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/repos/move"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/spaces/acme/demo-v2/hardware"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stage": "BUILDING",
            "hardware": {"current": null, "requested": "t4-small"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let desired = DesiredConfig {
        name: "demo-v2".to_string(),
        hardware: "t4-small".to_string(),
        ..desired()
    };
    let state = controller(&server).update(&desired, &observed()).await.unwrap();

    let requests = received(&server).await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].0, "POST /api/repos/move");
    assert_json_eq!(
        requests[0].1,
        json!({"fromRepo": "acme/demo", "toRepo": "acme/demo-v2", "type": "space"})
    );
    assert_eq!(requests[1].0, "POST /api/spaces/acme/demo-v2/hardware");
    assert_json_eq!(requests[1].1, json!({"flavor": "t4-small"}));
    assert_eq!(state.id, "acme/demo-v2");
}

#[tokio::test]
async fn test_update_replaces_secrets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/spaces/acme/demo/secrets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "a": {"updatedAt": "2024-01-01T00:00:00Z"},
            "b": {"updatedAt": "2024-01-01T00:00:00Z"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/spaces/acme/demo/secrets"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/spaces/acme/demo/secrets"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let observed = ObservedState {
        secrets: Some(entries(&[("a", "1"), ("b", "2")])),
        ..observed()
    };
    let desired = DesiredConfig {
        secrets: Some(entries(&[("b", "2"), ("c", "3")])),
        ..desired()
    };
    let state = controller(&server).update(&desired, &observed).await.unwrap();

    let bodies: Vec<Value> = received(&server).await.into_iter().map(|(_, b)| b).collect();
    assert_eq!(
        bodies,
        vec![
            Value::Null,
            json!({"key": "a"}),
            json!({"key": "b"}),
            json!({"key": "b", "value": "2"}),
            json!({"key": "c", "value": "3"}),
        ]
    );
    assert_eq!(state.secrets, desired.secrets);
}

#[tokio::test]
async fn test_update_failure_reports_status_body_and_partial_state() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/spaces/acme/demo/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"private": true})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/spaces/acme/demo/storage"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid storage tier"))
        .mount(&server)
        .await;

    let desired = DesiredConfig {
        private: true,
        storage: "enormous".to_string(),
        sleep_time: 60,
        ..desired()
    };
    let err = controller(&server)
        .update(&desired, &observed())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Unable to update space storage: HTTP 400, response body: Invalid storage tier"
    );
    assert!(err.state.private);
    assert_eq!(err.state.storage.as_deref(), Some("small"));
    assert_eq!(err.state.sleep_time, Some(3600));
    assert_eq!(received(&server).await.len(), 2);
}

#[tokio::test]
async fn test_read_refreshes_observed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/spaces/acme/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "acme/demo",
            "author": "acme",
            "lastModified": "2024-05-01T10:00:00.000Z",
            "private": false,
            "likes": 4,
            "tags": ["gradio", "region:us"],
            "sdk": "gradio",
            "runtime": {
                "stage": "SLEEPING",
                "hardware": {"current": null, "requested": "cpu-basic"},
                "storage": null,
                "gcTimeout": 172800
            }
        })))
        .mount(&server)
        .await;

    let state = controller(&server).read("acme/demo").await.unwrap();

    assert_eq!(state.name, "demo");
    assert_eq!(state.hardware.as_deref(), Some("cpu-basic"));
    assert_eq!(state.storage, None);
    assert_eq!(state.sleep_time, Some(172800));
    assert_eq!(state.last_modified.as_deref(), Some("2024-05-01T10:00:00.000Z"));
    assert_eq!(state.tags.len(), 2);
}

#[tokio::test]
async fn test_delete_then_read_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/repos/delete"))
        .and(body_json(json!({"type": "space", "name": "demo"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/spaces/acme/demo"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Repository not found"})),
        )
        .mount(&server)
        .await;

    let controller = controller(&server);
    controller.delete(&observed()).await.unwrap();
    let err = controller.read("acme/demo").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.category(), ErrorCategory::Api);
}

#[tokio::test]
async fn test_slow_response_surfaces_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/spaces/acme/demo"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let config = ClientConfig::new()
        .with_base_url(format!("{}/api", server.uri()))
        .with_request_timeout(Duration::from_millis(100));
    let controller = SpaceController::new(HttpTransport::new(config).unwrap());

    let err = controller.read("acme/demo").await.unwrap_err();

    match err {
        SpaceError::Transport { cause, .. } => assert!(cause.is_timeout()),
        other => panic!("expected transport error, got {other:?}"),
    }
}
