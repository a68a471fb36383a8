use cloudmcp_linode::{
    DatabaseEngine, LinodeClient, LinodeError, RequestObserver, RequestSpan,
};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingObserver {
    calls: Arc<Mutex<Vec<(String, String, String)>>>,
}

struct RecordingSpan {
    method: String,
    endpoint: String,
    calls: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl RequestObserver for RecordingObserver {
    fn begin(&self, method: &str, endpoint: &str) -> Box<dyn RequestSpan> {
        Box::new(RecordingSpan {
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            calls: self.calls.clone(),
        })
    }
}

impl RequestSpan for RecordingSpan {
    fn finish(self: Box<Self>, status: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((self.method, self.endpoint, status.to_string()));
    }
}

fn client_for(server: &MockServer) -> LinodeClient {
    LinodeClient::builder("test-token")
        .base_url(server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_get_instance_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/linode/instances/123456"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 123456,
            "label": "web-1",
            "status": "running",
            "region": "us-east",
            "type": "g6-standard-2",
            "ipv4": ["192.0.2.10"],
            "specs": {"disk": 81920, "memory": 4096, "vcpus": 2, "transfer": 4000}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let instance = client_for(&server).get_instance(123456).await.unwrap();

    assert_eq!(instance.id, 123456);
    assert_eq!(instance.label, "web-1");
    assert_eq!(instance.specs.unwrap().vcpus, 2);
}

#[tokio::test]
async fn test_list_follows_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/volumes"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": 1, "label": "a"}, {"id": 2, "label": "b"}],
            "page": 1,
            "pages": 2,
            "results": 3
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v4/volumes"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": 3, "label": "c"}],
            "page": 2,
            "pages": 2,
            "results": 3
        })))
        .mount(&server)
        .await;

    let volumes = client_for(&server).list_volumes().await.unwrap();
    let ids: Vec<i64> = volumes.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_api_error_is_mapped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/linode/instances/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "errors": [{"reason": "Not found"}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_instance(9).await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        LinodeError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_body_on_action() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4/linode/instances/7/reboot"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).reboot_instance(7).await.unwrap();
}

#[tokio::test]
async fn test_observer_sees_template_and_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/databases/postgresql/instances/42/credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "username": "linroot",
            "password": "s3cret"
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v4/volumes/5"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "errors": [{"reason": "Unauthorized"}]
        })))
        .mount(&server)
        .await;

    let observer = RecordingObserver::default();
    let calls = observer.calls.clone();
    let client = LinodeClient::builder("test-token")
        .base_url(server.uri())
        .observer(Arc::new(observer))
        .build()
        .unwrap();

    let credentials = client
        .get_database_credentials(DatabaseEngine::PostgreSql, 42)
        .await
        .unwrap();
    assert_eq!(credentials.username, "linroot");
    assert!(client.delete_volume(5).await.is_err());

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            (
                "GET".to_string(),
                "/v4/databases/postgresql/instances/{id}/credentials".to_string(),
                "200".to_string()
            ),
            (
                "DELETE".to_string(),
                "/v4/volumes/{id}".to_string(),
                "403".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_transport_failure_reports_error_status() {
    let observer = RecordingObserver::default();
    let calls = observer.calls.clone();
    // Nothing listens on port 9 of the loopback interface.
    let client = LinodeClient::builder("test-token")
        .base_url("http://127.0.0.1:9")
        .observer(Arc::new(observer))
        .build()
        .unwrap();

    let err = client.get_profile().await.unwrap_err();

    assert!(matches!(err, LinodeError::Http(_)));
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "/v4/profile");
    assert_eq!(calls[0].2, "error");
}

#[tokio::test]
async fn test_image_id_cannot_leave_images_tree() {
    let server = MockServer::start().await;
    let observer = RecordingObserver::default();
    let calls = observer.calls.clone();
    let client = LinodeClient::builder("test-token")
        .base_url(server.uri())
        .observer(Arc::new(observer))
        .build()
        .unwrap();

    let err = client
        .delete_image("../linode/instances/123")
        .await
        .unwrap_err();
    assert!(matches!(err, LinodeError::InvalidIdentifier { .. }));

    let err = client.get_ip("192.0.2.10?x=1").await.unwrap_err();
    assert!(matches!(err, LinodeError::InvalidIdentifier { .. }));

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty(), "unexpected requests: {received:?}");
    assert!(calls.lock().unwrap().is_empty());
}
