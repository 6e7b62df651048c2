// Job API client against a stub upstream: request shape and response parsing

use bytes::Bytes;
use clearmark::config::ApiConfig;
use clearmark::error::{PollError, SubmissionError};
use clearmark::job_client::{EzRemoveClient, JobApi, JobId, StatusCode};
use clearmark::staging::{StagedFile, StagingStore, TempDirStore};
use clearmark::upload::UploadedImage;

use super::test_harness::{closed_port_url, StubResponse, StubServer};

const CREATE_PATH: &str = "/api/ez-remove/watermark-remove/create-job";
const GET_PATH: &str = "/api/ez-remove/watermark-remove/get-job";

fn client_for(base_url: String) -> EzRemoveClient {
    let config = ApiConfig {
        base_url,
        ..ApiConfig::default()
    };
    EzRemoveClient::new(&config).unwrap()
}

async fn staged_png(store: &TempDirStore) -> StagedFile {
    let image = UploadedImage {
        bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\nstub image bytes"),
        file_name: Some("holiday.png".to_string()),
        content_type: Some("image/png".to_string()),
    };
    store.stage(&image).await.unwrap()
}

#[tokio::test]
async fn test_submit_sends_multipart_image_file_with_identity_headers() {
    let stub = StubServer::start(|_| {
        StubResponse::json(serde_json::json!({"code": 100000, "result": {"job_id": "job-abc"}}))
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let store = TempDirStore::new(Some(dir.path().to_path_buf()));
    let staged = staged_png(&store).await;

    let job_id = client_for(stub.base_url()).submit(&staged).await.unwrap();

    assert_eq!(job_id, JobId::from("job-abc"));
    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, CREATE_PATH);
    assert_eq!(req.header("user-agent"), Some("Mozilla/5.0"));
    assert_eq!(req.header("origin"), Some("https://ezremove.ai"));

    let serial = req.header("product-serial").unwrap();
    let millis = serial.strip_prefix("sr-").unwrap();
    assert!(!millis.is_empty());
    assert!(millis.chars().all(|c| c.is_ascii_digit()));

    assert!(req
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data"));
    let body = req.body_text();
    assert!(body.contains("name=\"image_file\""));
    assert!(body.contains(&format!("filename=\"{}\"", staged.file_name)));
    assert!(staged.file_name.starts_with("clearmark-upload-"));
    assert!(staged.file_name.ends_with(".png"));
    assert!(body.contains("stub image bytes"));
}

#[tokio::test]
async fn test_submit_accepts_numeric_job_id() {
    let stub = StubServer::start(|_| {
        StubResponse::json(serde_json::json!({"result": {"job_id": 98765}}))
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let store = TempDirStore::new(Some(dir.path().to_path_buf()));
    let staged = staged_png(&store).await;

    let job_id = client_for(stub.base_url()).submit(&staged).await.unwrap();

    assert_eq!(job_id.as_str(), "98765");
}

#[tokio::test]
async fn test_submit_without_job_id_is_missing_job_id() {
    let stub = StubServer::start(|_| {
        StubResponse::json(serde_json::json!({"code": 400001, "message": "quota exceeded"}))
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let store = TempDirStore::new(Some(dir.path().to_path_buf()));
    let staged = staged_png(&store).await;

    let err = client_for(stub.base_url()).submit(&staged).await.unwrap_err();

    assert!(matches!(err, SubmissionError::MissingJobId));
}

#[tokio::test]
async fn test_submit_html_error_page_is_parse_error() {
    let stub = StubServer::start(|_| StubResponse::raw(502, "<html>Bad Gateway</html>")).await;
    let dir = tempfile::tempdir().unwrap();
    let store = TempDirStore::new(Some(dir.path().to_path_buf()));
    let staged = staged_png(&store).await;

    let err = client_for(stub.base_url()).submit(&staged).await.unwrap_err();

    assert!(matches!(err, SubmissionError::Parse(_)));
}

#[tokio::test]
async fn test_submit_unreachable_api_is_transport_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = TempDirStore::new(Some(dir.path().to_path_buf()));
    let staged = staged_png(&store).await;

    let err = client_for(closed_port_url(""))
        .submit(&staged)
        .await
        .unwrap_err();

    assert!(matches!(err, SubmissionError::Transport(_)));
}

#[tokio::test]
async fn test_submit_missing_staged_file_is_read_error() {
    let stub = StubServer::start(|_| StubResponse::raw(200, "{}")).await;
    let staged = StagedFile {
        path: std::env::temp_dir().join("clearmark-does-not-exist.png"),
        file_name: "gone.png".to_string(),
        content_type: None,
        size: 0,
    };

    let err = client_for(stub.base_url()).submit(&staged).await.unwrap_err();

    assert!(matches!(err, SubmissionError::StagedRead(_)));
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_poll_requests_job_path_and_parses_outputs() {
    let stub = StubServer::start(|_| {
        StubResponse::json(serde_json::json!({
            "code": 100000,
            "result": {"output": ["https://cdn.example/a.png", "https://cdn.example/b.png"]}
        }))
    })
    .await;

    let status = client_for(stub.base_url())
        .poll(&JobId::from("job-77"))
        .await
        .unwrap();

    assert_eq!(status.code, StatusCode::Succeeded);
    assert_eq!(status.first_output(), Some("https://cdn.example/a.png"));

    let requests = stub.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, format!("{}/job-77", GET_PATH));
    assert_eq!(requests[0].header("origin"), Some("https://ezremove.ai"));
    assert!(requests[0]
        .header("product-serial")
        .unwrap()
        .starts_with("sr-"));
}

#[tokio::test]
async fn test_poll_in_progress_and_unknown_codes() {
    let stub = StubServer::start(|req| {
        if req.path.ends_with("/running") {
            StubResponse::json(serde_json::json!({"code": 300001, "result": null}))
        } else {
            StubResponse::json(serde_json::json!({"code": 500002}))
        }
    })
    .await;
    let client = client_for(format!("{}/", stub.base_url()));

    let running = client.poll(&JobId::from("running")).await.unwrap();
    let broken = client.poll(&JobId::from("broken")).await.unwrap();

    assert_eq!(running.code, StatusCode::InProgress);
    assert_eq!(broken.code, StatusCode::Unknown(500002));
    assert!(broken.first_output().is_none());
}

#[tokio::test]
async fn test_poll_non_json_is_parse_error() {
    let stub = StubServer::start(|_| StubResponse::raw(500, "internal error")).await;

    let err = client_for(stub.base_url())
        .poll(&JobId::from("job-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::Parse(_)));
}
