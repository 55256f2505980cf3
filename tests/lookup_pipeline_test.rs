mod common;

use common::{today, CallLog, FakeDatabase, RecordingPublisher};
use customer_etl::core::Payload;
use customer_etl::domain::model::CustomerId;
use customer_etl::{EtlEngine, EtlError, FailureKind, HttpPublisher, LocalFileSource, PipelineOutcome};
use httpmock::prelude::*;
use tempfile::TempDir;

fn write_input(dir: &TempDir, name: &str, content: &str) -> LocalFileSource {
    std::fs::write(dir.path().join(name), content).unwrap();
    LocalFileSource::resolve(dir.path(), name)
}

#[tokio::test]
async fn test_lookup_end_to_end_posts_matching_customers() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_input(&temp_dir, "ids.json", r#"{"CustomerID": {"0": 5, "1": 7, "2": 99}}"#);

    // Setup mock HTTP server
    let server = MockServer::start();
    let date = today().format("%Y-%m-%d").to_string();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/customers")
            .json_body(serde_json::json!([
                {"id": 5, "name": "Alice", "date": date},
                {"id": 7, "name": "Bob", "date": date}
            ]));
        then.status(201);
    });

    let db = FakeDatabase::with_customers(&[(7, "Bob"), (5, "Alice"), (8, "Carol")]);
    let engine = EtlEngine::new(db.clone(), HttpPublisher::new(server.url("/customers")));

    let outcome = engine.run_lookup(&source).await;

    api_mock.assert();
    match outcome {
        PipelineOutcome::Done {
            records,
            destination,
        } => {
            assert_eq!(records, 2);
            assert_eq!(destination, server.url("/customers"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(db.log.calls(), vec!["connect", "execute", "close"]);
}

#[tokio::test]
async fn test_server_error_fails_publish_after_connection_closed() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_input(&temp_dir, "ids.json", r#"{"CustomerID": {"0": 5}}"#);

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/customers");
        then.status(500).body("internal error");
    });

    let db = FakeDatabase::with_customers(&[(5, "Alice")]);
    let engine = EtlEngine::new(db.clone(), HttpPublisher::new(server.url("/customers")));

    let outcome = engine.run_lookup(&source).await;

    api_mock.assert();
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Publish));
    match outcome {
        PipelineOutcome::Failed {
            error: EtlError::PublishError { status, body, .. },
            ..
        } => {
            assert_eq!(status, Some(500));
            assert_eq!(body, "internal error");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(db.log.count("close"), 1);
}

#[tokio::test]
async fn test_connection_is_released_before_publishing() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_input(&temp_dir, "ids.json", r#"{"CustomerID": {"0": 5, "1": 7}}"#);

    let log = CallLog::default();
    let db = FakeDatabase {
        log: log.clone(),
        ..FakeDatabase::with_customers(&[(5, "Alice"), (7, "Bob")])
    };
    let publisher = RecordingPublisher::sharing(&log);
    let engine = EtlEngine::new(db, publisher.clone());

    let outcome = engine.run_lookup(&source).await;

    assert!(outcome.is_done());
    assert_eq!(log.calls(), vec!["connect", "execute", "close", "publish"]);

    let payloads = publisher.payloads.lock().unwrap();
    match &payloads[0] {
        Payload::Customers(records) => {
            let ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
            assert_eq!(ids, vec![CustomerId::Int(5), CustomerId::Int(7)]);
            assert!(records.iter().all(|r| r.as_of_date == today()));
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_input_fails_extract_without_publishing() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_input(&temp_dir, "ids.json", r#"{"Customers": [1, 2]}"#);

    let log = CallLog::default();
    let db = FakeDatabase {
        log: log.clone(),
        ..FakeDatabase::default()
    };
    let engine = EtlEngine::new(db, RecordingPublisher::sharing(&log));

    let outcome = engine.run_lookup(&source).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Extract));
    assert!(matches!(
        outcome,
        PipelineOutcome::Failed {
            error: EtlError::MalformedInputError { .. },
            ..
        }
    ));
    assert_eq!(log.calls(), vec!["connect", "close"]);
}

#[tokio::test]
async fn test_missing_input_file_fails_extract() {
    let temp_dir = TempDir::new().unwrap();
    let source = LocalFileSource::resolve(temp_dir.path(), "absent.json");

    let db = FakeDatabase::default();
    let engine = EtlEngine::new(db.clone(), RecordingPublisher::default());

    let outcome = engine.run_lookup(&source).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Extract));
    assert_eq!(db.log.count("close"), 1);
}

#[tokio::test]
async fn test_refused_connection_fails_without_close() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_input(&temp_dir, "ids.json", r#"{"CustomerID": {"0": 5}}"#);

    let log = CallLog::default();
    let db = FakeDatabase {
        refuse_connections: true,
        log: log.clone(),
        ..FakeDatabase::default()
    };
    let engine = EtlEngine::new(db, RecordingPublisher::sharing(&log));

    let outcome = engine.run_lookup(&source).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::DbConnect));
    assert_eq!(log.calls(), vec!["connect"]);
}

#[tokio::test]
async fn test_query_failure_closes_connection_once() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_input(&temp_dir, "ids.json", r#"{"CustomerID": {"0": 5}}"#);

    let log = CallLog::default();
    let db = FakeDatabase {
        fail_queries: true,
        log: log.clone(),
        ..FakeDatabase::default()
    };
    let engine = EtlEngine::new(db, RecordingPublisher::sharing(&log));

    let outcome = engine.run_lookup(&source).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Query));
    assert_eq!(log.calls(), vec!["connect", "execute", "close"]);
}

#[tokio::test]
async fn test_empty_mapping_fails_query_step() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_input(&temp_dir, "ids.json", r#"{"CustomerID": {}}"#);

    let log = CallLog::default();
    let db = FakeDatabase {
        log: log.clone(),
        ..FakeDatabase::default()
    };
    let engine = EtlEngine::new(db, RecordingPublisher::sharing(&log));

    let outcome = engine.run_lookup(&source).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Query));
    assert!(matches!(
        outcome,
        PipelineOutcome::Failed {
            error: EtlError::InvalidArgumentError { .. },
            ..
        }
    ));
    assert_eq!(log.count("publish"), 0);
    assert_eq!(log.count("close"), 1);
}
