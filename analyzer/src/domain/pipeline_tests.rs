//! Tests for the pipeline session

use super::*;
use serde_json::json;

use crate::core::config::AnalyticsBackend;
use crate::data::DataError;
use crate::data::types::InferredType;

fn memory_session() -> Session {
    session_with(AnalysisOptions::default())
}

fn session_with(options: AnalysisOptions) -> Session {
    let engine = AnalyticsService::init(AnalyticsBackend::Memory).unwrap();
    Session::new(engine, options)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// === Happy path ===

#[test]
fn test_two_records_one_group() {
    let session = memory_session();
    let input = json!([
        {"request": "/a", "status": 200, "request_time": 0.1},
        {"request": "/a", "status": 404, "request_time": 0.2}
    ]);
    let report = session.load(&input.to_string()).unwrap();

    assert_eq!(session.state(), PipelineState::Ready);
    assert_eq!(report.group_count, 1);

    let perf = &report.performance[0];
    assert_eq!(perf.request, "/a");
    assert_eq!(perf.total_requests, 2);
    assert!(approx(perf.avg_time, 0.15));
    assert_eq!(perf.min_time, 0.1);
    assert_eq!(perf.max_time, 0.2);

    let chart = &report.status_chart[0];
    assert_eq!(chart.success, 1);
    assert_eq!(chart.client_error, 1);
    assert_eq!(chart.total, 2);

    assert_eq!(report.status_codes.len(), 2);
    assert_eq!(report.status_codes[0].status, 200);
    assert_eq!(report.status_codes[1].status, 404);
}

#[test]
fn test_normalized_templates_group_together() {
    let session = memory_session();
    let input = json!([
        {"request": "/api/user/1/profile?token=abcd", "status": 200, "request_time": 0.1},
        {"request": "/api/user/2/profile?token=efgh", "status": 200, "request_time": 0.3},
        {"request": "/items/550e8400-e29b-41d4-a716-446655440000/edit", "status": 302, "request_time": 0.2}
    ]);
    let report = session.load(&input.to_string()).unwrap();

    let templates: Vec<&str> = report
        .performance
        .iter()
        .map(|r| r.request.as_str())
        .collect();
    assert_eq!(
        templates,
        vec!["/api/user/:id/profile?token=:param", "/items/:uuid/edit"]
    );
    assert_eq!(
        report.performance[0].original_patterns,
        vec![
            "/api/user/1/profile?token=abcd",
            "/api/user/2/profile?token=efgh"
        ]
    );
}

#[test]
fn test_performance_truncated_to_hundred() {
    let session = memory_session();
    let records: Vec<_> = (0..150)
        .map(|i| {
            let request_time = i as f64 / 10.0;
            json!({"request": format!("/route{:03}", i), "status": 200, "request_time": request_time})
        })
        .collect();
    let report = session.load(&json!(records).to_string()).unwrap();

    assert_eq!(report.group_count, 150);
    assert_eq!(report.performance.len(), 100);
    assert_eq!(report.status_chart.len(), 10);
    assert_eq!(report.performance[0].request, "/route149");
    for pair in report.performance.windows(2) {
        assert!(pair[0].total_time >= pair[1].total_time);
    }
}

#[test]
fn test_counts_conserved_across_outputs() {
    let session = memory_session();
    let records: Vec<_> = (0..40)
        .map(|i| {
            let status = [200, 201, 301, 404, 500][i % 5];
            let request_time = 0.01 * (i as f64 + 1.0);
            json!({
                "request": format!("/orders/{}?page={}", i % 6, i),
                "status": status,
                "request_time": request_time
            })
        })
        .collect();
    let report = session.load(&json!(records).to_string()).unwrap();

    let by_status: u64 = report.status_codes.iter().map(|r| r.count).sum();
    let by_group: u64 = report.performance.iter().map(|r| r.total_requests).sum();
    assert_eq!(by_status, 40);
    assert_eq!(by_group, 40);
    assert_eq!(report.total_records, 40);
    for row in &report.status_chart {
        assert_eq!(
            row.total,
            row.success + row.redirect + row.client_error + row.server_error
        );
    }
}

#[test]
fn test_schema_in_report() {
    let session = memory_session();
    let input = json!([
        {"request": "/a", "status": 200, "request_time": 0.1, "ip": "10.0.0.1"},
        {"request": "/b", "status": 500, "request_time": 1, "ip": null, "bytes": 512}
    ]);
    let report = session.load(&input.to_string()).unwrap();

    let names: Vec<&str> = report.schema.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["request", "status", "request_time", "ip", "bytes"]
    );
    assert_eq!(report.schema[2].inferred_type, InferredType::Double);
    assert!(report.schema[3].nullable);
    assert!(report.schema[4].nullable);
    assert_eq!(report.schema[4].inferred_type, InferredType::BigInt);
}

#[test]
fn test_empty_array_is_ready_with_no_rows() {
    let session = memory_session();
    let report = session.load("[]").unwrap();
    assert_eq!(session.state(), PipelineState::Ready);
    assert_eq!(report.group_count, 0);
    assert!(report.performance.is_empty());
    assert!(report.status_chart.is_empty());
    assert!(report.schema.is_empty());
}

#[test]
fn test_load_demo() {
    let session = memory_session();
    let report = session.load_demo().unwrap();
    assert!(report.total_records > 0);
    assert!(report.group_count > 0);
    assert!(report.status_chart.len() <= 10);
    assert!(report.schema.iter().any(|f| f.name == "request"));
}

// === Replacement and reset ===

#[test]
fn test_second_load_replaces_results() {
    let session = memory_session();
    session
        .load(r#"[{"request": "/old", "status": 200, "request_time": 0.1}]"#)
        .unwrap();
    let report = session
        .load(r#"[{"request": "/new", "status": 500, "request_time": 0.2}]"#)
        .unwrap();

    assert_eq!(report.group_count, 1);
    assert_eq!(report.performance[0].request, "/new");
    assert_eq!(session.report().unwrap().performance[0].request, "/new");
}

#[test]
fn test_reset_clears_results() {
    let session = memory_session();
    session
        .load(r#"[{"request": "/a", "status": 200, "request_time": 0.1}]"#)
        .unwrap();
    session.reset().unwrap();

    assert_eq!(session.state(), PipelineState::Idle);
    assert!(session.report().is_none());
    assert!(matches!(
        session.engine().summarize(),
        Err(DataError::NotLoaded { .. })
    ));
}

// === Failures ===

#[test]
fn test_input_format_error_clears_prior_results() {
    let session = memory_session();
    session
        .load(r#"[{"request": "/a", "status": 200, "request_time": 0.1}]"#)
        .unwrap();

    let err = session.load("42").unwrap_err();
    assert!(matches!(err, PipelineError::InputFormat(_)));
    assert_eq!(session.state(), PipelineState::Error);
    assert!(session.report().is_none());
    assert!(matches!(
        session.engine().summarize(),
        Err(DataError::NotLoaded { .. })
    ));
}

#[test]
fn test_field_missing_fails_run() {
    let session = memory_session();
    let err = session
        .load(r#"[{"request": "/a", "status": 200, "request_time": 0.1}, {"request": "/b", "status": 200}]"#)
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::FieldMissing {
            index: 1,
            field: "request_time",
            ..
        }
    ));
    assert_eq!(session.state(), PipelineState::Error);
    assert!(session.report().is_none());
}

#[test]
fn test_field_missing_skip_policy() {
    let session = session_with(AnalysisOptions {
        on_invalid_record: InvalidRecordPolicy::Skip,
        ..AnalysisOptions::default()
    });
    let report = session
        .load(r#"[{"request": "/a", "status": 200, "request_time": 0.1}, {"request": "/b", "status": "ok", "request_time": 0.1}]"#)
        .unwrap();
    assert_eq!(report.total_records, 1);
    assert_eq!(report.skipped_records, 1);
    assert_eq!(report.group_count, 1);
}

#[test]
fn test_engine_unavailable_leaves_state_untouched() {
    let session = memory_session();
    session
        .load(r#"[{"request": "/a", "status": 200, "request_time": 0.1}]"#)
        .unwrap();
    session.close().unwrap();

    let err = session
        .load(r#"[{"request": "/b", "status": 200, "request_time": 0.1}]"#)
        .unwrap_err();
    assert!(matches!(err, PipelineError::EngineUnavailable(_)));
    assert_eq!(session.state(), PipelineState::Ready);
    assert_eq!(session.report().unwrap().performance[0].request, "/a");
}

#[test]
fn test_recovers_after_error() {
    let session = memory_session();
    assert!(session.load("not json").is_err());
    assert_eq!(session.state(), PipelineState::Error);

    session
        .load(r#"[{"request": "/a", "status": 200, "request_time": 0.1}]"#)
        .unwrap();
    assert_eq!(session.state(), PipelineState::Ready);
}

#[test]
fn test_concurrent_load_rejected() {
    let session = memory_session();
    session.running.store(true, Ordering::Release);

    let err = session.load("[]").unwrap_err();
    assert!(matches!(err, PipelineError::RunInProgress));
    assert_eq!(session.state(), PipelineState::Idle);

    session.running.store(false, Ordering::Release);
    assert!(session.load("[]").is_ok());
}

#[test]
fn test_run_guard_released_after_failure() {
    let session = memory_session();
    assert!(session.load("{").is_err());
    assert!(!session.running.load(Ordering::Acquire));
}

#[test]
fn test_session_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
}

#[test]
fn test_state_names() {
    assert_eq!(PipelineState::Computing.to_string(), "computing");
    assert_eq!(
        serde_json::to_value(PipelineState::Ready).unwrap(),
        json!("ready")
    );
}
