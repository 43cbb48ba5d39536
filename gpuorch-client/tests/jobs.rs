mod common;

use std::sync::{Arc, Mutex};

use axum::extract::{Path, RawQuery};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use gpuorch_client::{ClientError, JobStatus};
use gpuorch_core::domain::artifact::ArtifactKind;
use gpuorch_core::dto::job::ListJobsQuery;
use gpuorch_core::spec::{JobSpec, JobType, SubmitJob};
use serde_json::{Value, json};

fn sample_submission() -> SubmitJob {
    SubmitJob::new("job1", "pytorch_ddp", "s3://b/t.py", "s3://d/im", 8, 100.0)
}

/// Router that records the query string of every list request
fn list_router(seen: Arc<Mutex<Vec<Option<String>>>>, body: Value) -> Router {
    Router::new().route(
        "/v1/jobs",
        get(move |RawQuery(query): RawQuery| {
            let seen = seen.clone();
            let body = body.clone();
            async move {
                seen.lock().unwrap().push(query);
                Json(body)
            }
        }),
    )
}

#[tokio::test]
async fn test_submit_returns_created_job() {
    let received = Arc::new(Mutex::new(None::<Value>));
    let sink = received.clone();
    let router = Router::new().route(
        "/v1/jobs",
        post(move |Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() = Some(body);
                (
                    StatusCode::CREATED,
                    Json(json!({"id": "j-1", "status": "submitted"})),
                )
            }
        }),
    );
    let client = common::serve(router).await;

    let job = client.submit_job(&sample_submission()).await.unwrap();
    assert_eq!(job.id, "j-1");
    assert_eq!(job.status, JobStatus::Submitted);

    let body = received.lock().unwrap().take().unwrap();
    assert_eq!(body["name"], "job1");

    let spec: serde_yaml::Value =
        serde_yaml::from_str(body["spec_yaml"].as_str().unwrap()).unwrap();
    let job = &spec["job"];
    assert_eq!(job["framework"].as_str(), Some("pytorch_ddp"));
    assert_eq!(job["entrypoint"].as_str(), Some("s3://b/t.py"));
    assert_eq!(job["data"]["dataset"].as_str(), Some("s3://d/im"));
    assert_eq!(job["resources"]["gpus"].as_u64(), Some(8));
    assert_eq!(job["constraints"]["budget"].as_f64(), Some(100.0));
    assert_eq!(job["constraints"]["allow_spot"].as_bool(), Some(true));
    assert_eq!(job["execution"]["mode"].as_str(), Some("single_cluster"));
}

#[tokio::test]
async fn test_submit_rejects_non_created_status() {
    let router = Router::new().route(
        "/v1/jobs",
        post(|| async { (StatusCode::OK, Json(json!({"id": "j-1", "status": "submitted"}))) }),
    );
    let client = common::serve(router).await;

    let err = client.submit_job(&sample_submission()).await.unwrap_err();
    assert!(matches!(err, ClientError::Submission { status: 200, .. }));
}

#[tokio::test]
async fn test_submit_carries_error_body() {
    let router = Router::new().route(
        "/v1/jobs",
        post(|| async { (StatusCode::BAD_REQUEST, "Invalid job spec: bad budget") }),
    );
    let client = common::serve(router).await;

    match client.submit_job(&sample_submission()).await {
        Err(ClientError::Submission { status, body }) => {
            assert_eq!(status, 400);
            assert_eq!(body, "Invalid job spec: bad budget");
        }
        other => panic!("expected submission error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_invalid_input_sends_nothing() {
    let hits = Arc::new(Mutex::new(0u32));
    let counter = hits.clone();
    let router = Router::new().route(
        "/v1/jobs",
        post(move || {
            let counter = counter.clone();
            async move {
                *counter.lock().unwrap() += 1;
                StatusCode::CREATED
            }
        }),
    );
    let client = common::serve(router).await;

    let err = client
        .submit_job(&SubmitJob::new("job1", "pytorch_ddp", "s3://b/t.py", "s3://d/im", 0, 100.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidRequest(_)));
    assert_eq!(*hits.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_submit_spec_with_custom_job_type() {
    let received = Arc::new(Mutex::new(None::<Value>));
    let sink = received.clone();
    let router = Router::new().route(
        "/v1/jobs",
        post(move |Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() = Some(body);
                (StatusCode::CREATED, Json(json!({"id": "hpo-7", "status": "pending"})))
            }
        }),
    );
    let client = common::serve(router).await;

    let spec = JobSpec::training("pytorch_ddp", "s3://b/sweep.py", "s3://d/cifar")
        .job_type(JobType::Hpo)
        .gpus(2)
        .budget(25.0);
    let job = client.submit_spec("sweep", &spec).await.unwrap();
    assert_eq!(job.id, "hpo-7");

    let body = received.lock().unwrap().take().unwrap();
    let parsed: JobSpec = serde_yaml::from_str(body["spec_yaml"].as_str().unwrap()).unwrap();
    assert_eq!(parsed, spec);
}

#[tokio::test]
async fn test_get_job_returns_snapshot() {
    let router = Router::new().route(
        "/v1/jobs/{id}",
        get(|Path(id): Path<String>| async move { Json(json!({"id": id, "status": "running"})) }),
    );
    let client = common::serve(router).await;

    let job = client.get_job("j-1").await.unwrap();
    assert_eq!(job.id, "j-1");
    assert_eq!(job.status, JobStatus::Running);
    assert!(!job.is_terminal());
}

#[tokio::test]
async fn test_get_missing_job_is_fetch_error() {
    let router = Router::new().route(
        "/v1/jobs/{id}",
        get(|| async { (StatusCode::NOT_FOUND, "Job not found") }),
    );
    let client = common::serve(router).await;

    let err = client.get_job("missing").await.unwrap_err();
    assert!(err.is_not_found());
    match err {
        ClientError::Fetch { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Job not found");
        }
        other => panic!("expected fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_job_with_malformed_body_is_parse_error() {
    let router = Router::new().route("/v1/jobs/{id}", get(|| async { "not json" }));
    let client = common::serve(router).await;

    let err = client.get_job("j-1").await.unwrap_err();
    assert!(matches!(err, ClientError::ParseError(_)));
}

#[tokio::test]
async fn test_transport_failure_is_request_failed() {
    // Bind then drop a listener so the port is known to be closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = gpuorch_client::OrchestratorClient::new(format!("http://{}", addr));
    let err = client.get_job("j-1").await.unwrap_err();
    assert!(matches!(err, ClientError::RequestFailed(_)));
}

#[tokio::test]
async fn test_list_without_filter_sends_no_query() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let body = json!([{"id": "j-1", "status": "running"}, {"id": "j-2", "status": "completed"}]);
    let client = common::serve(list_router(seen.clone(), body)).await;

    let jobs = client.list_jobs(None).await.unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[1].status, JobStatus::Completed);
    assert_eq!(*seen.lock().unwrap(), vec![None]);
}

#[tokio::test]
async fn test_list_with_filter_sends_status() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let body = json!({"items": [{"id": "j-1", "status": "running"}], "next_cursor": ""});
    let client = common::serve(list_router(seen.clone(), body)).await;

    let jobs = client.list_jobs(Some(JobStatus::Running)).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(*seen.lock().unwrap(), vec![Some("status=running".to_string())]);
}

#[tokio::test]
async fn test_list_page_sends_only_set_parameters() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let body = json!({"items": [{"id": "j-3", "status": "failed"}], "next_cursor": "c-2"});
    let client = common::serve(list_router(seen.clone(), body)).await;

    let page = client
        .list_jobs_page(&ListJobsQuery {
            status: None,
            limit: Some(10),
            cursor: Some("c-1".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(page.items[0].id, "j-3");
    assert_eq!(page.next(), Some("c-2"));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some("limit=10&cursor=c-1".to_string())]
    );
}

#[tokio::test]
async fn test_list_failure_is_list_error() {
    let router = Router::new().route(
        "/v1/jobs",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list jobs: db down") }),
    );
    let client = common::serve(router).await;

    let err = client.list_jobs(None).await.unwrap_err();
    assert!(err.is_server_error());
    assert!(matches!(err, ClientError::List { status: 500, .. }));
}

#[tokio::test]
async fn test_cancel_job() {
    let router = Router::new().route(
        "/v1/jobs/{id}/cancel",
        post(|Path(id): Path<String>| async move { Json(json!({"id": id, "status": "cancelled"})) }),
    );
    let client = common::serve(router).await;

    let job = client.cancel_job("j-1").await.unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_missing_job_is_cancel_error() {
    let router = Router::new().route(
        "/v1/jobs/{id}/cancel",
        post(|| async { (StatusCode::NOT_FOUND, "Job not found") }),
    );
    let client = common::serve(router).await;

    let err = client.cancel_job("missing").await.unwrap_err();
    assert!(matches!(err, ClientError::Cancel { status: 404, .. }));
}

#[tokio::test]
async fn test_job_events() {
    let router = Router::new().route(
        "/v1/jobs/{id}/events",
        get(|| async {
            Json(json!({"items": [
                {"at": "2024-05-01T10:00:00Z", "to_status": "pending", "reason": "submitted"},
                {"at": "2024-05-01T10:02:00Z", "from_status": "pending", "to_status": "scheduled", "reason": "placed"}
            ]}))
        }),
    );
    let client = common::serve(router).await;

    let events = client.job_events("j-1").await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].from_status, Some(JobStatus::Pending));
    assert_eq!(events[1].to_status, JobStatus::Scheduled);
}

#[tokio::test]
async fn test_job_artifacts_filter() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let router = Router::new().route(
        "/v1/jobs/{id}/artifacts",
        get(move |RawQuery(query): RawQuery| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(query);
                Json(json!({"items": [
                    {"type": "checkpoint", "uri": "s3://ckpt/e1", "created_at": "2024-05-01T11:00:00Z"}
                ]}))
            }
        }),
    );
    let client = common::serve(router).await;

    let artifacts = client
        .job_artifacts("j-1", Some(ArtifactKind::Checkpoint))
        .await
        .unwrap();
    assert_eq!(artifacts[0].kind, ArtifactKind::Checkpoint);

    client.job_artifacts("j-1", None).await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some("type=checkpoint".to_string()), None]
    );
}

#[tokio::test]
async fn test_job_ids_reach_the_server_verbatim() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let router = Router::new().route(
        "/v1/jobs/{id}",
        get(move |Path(id): Path<String>, RawQuery(query): RawQuery| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push((id.clone(), query));
                Json(json!({"id": id, "status": "running"}))
            }
        }),
    );
    let client = common::serve(router).await;

    for id in ["run?status=x", "a/b", "c#d"] {
        let job = client.get_job(id).await.unwrap();
        assert_eq!(job.id, id);
    }

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("run?status=x".to_string(), None),
            ("a/b".to_string(), None),
            ("c#d".to_string(), None),
        ]
    );
}

#[tokio::test]
async fn test_cancel_escapes_job_id() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let router = Router::new().route(
        "/v1/jobs/{id}/cancel",
        post(move |Path(id): Path<String>| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(id.clone());
                Json(json!({"id": id, "status": "cancelled"}))
            }
        }),
    );
    let client = common::serve(router).await;

    client.cancel_job("batch/7").await.unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["batch/7".to_string()]);
}

#[tokio::test]
async fn test_truncated_error_body_is_request_failed() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Promises a 100-byte body, sends 7 bytes and hangs up.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\npartial",
            )
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let client = gpuorch_client::OrchestratorClient::new(format!("http://{}", addr));
    let err = client.get_job("j-1").await.unwrap_err();
    assert!(matches!(err, ClientError::RequestFailed(_)));
}
