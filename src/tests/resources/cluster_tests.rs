use crate::{ControlPlaneStep, ProviderError, SchedulerError, tests::create_test_scheduler};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::json;
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{any, method, path},
};

const CLUSTER_PATH: &str =
    "/v1/projects/test-project/locations/us-central1-a/clusters/my-private-cluster-1";

fn maintenance_payload(start_time: &str, duration_hours: i64) -> serde_json::Value {
    json!({
        "project_id": "test-project",
        "location": "us-central1-a",
        "cluster_id": "my-private-cluster-1",
        "frequency": "WEEKLY",
        "byday": ["MO", "TH"],
        "start_time": start_time,
        "duration_hours": duration_hours
    })
}

fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn timestamp(body: &serde_json::Value, field: &str) -> Option<DateTime<Utc>> {
    let raw = body["maintenancePolicy"]["window"]["recurringWindow"]["window"][field].as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

async fn mount_cluster(mock_server: &MockServer, resource_version: &str) {
    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "my-private-cluster-1",
            "status": "RUNNING",
            "maintenancePolicy": {
                "window": {"dailyMaintenanceWindow": {"startTime": "03:00"}},
                "resourceVersion": resource_version
            }
        })))
        .expect(1)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_schedule_maintenance_window() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    mount_cluster(&mock_server, "e3b0c442").await;

    let expected_start = Utc.with_ymd_and_hms(2024, 6, 10, 3, 0, 0).unwrap();
    let expected_end = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
    Mock::given(method("POST"))
        .and(path(format!("{}:setMaintenancePolicy", CLUSTER_PATH)))
        .and(move |request: &Request| {
            let Ok(body) = serde_json::from_slice::<serde_json::Value>(&request.body) else {
                return false;
            };
            let policy = &body["maintenancePolicy"];
            policy["resourceVersion"] == "e3b0c442"
                && policy["window"]["recurringWindow"]["recurrence"] == "FREQ=WEEKLY;BYDAY=MO,TH"
                && timestamp(&body, "startTime") == Some(expected_start)
                && timestamp(&body, "endTime") == Some(expected_end)
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operation-maint-1",
            "operationType": "SET_MAINTENANCE_POLICY",
            "status": "RUNNING"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = scheduler
        .schedule_maintenance_at(&maintenance_payload("03:00", 6), anchor())
        .await
        .unwrap();

    assert_eq!(
        response.cluster,
        "projects/test-project/locations/us-central1-a/clusters/my-private-cluster-1"
    );
    assert_eq!(response.recurrence, "FREQ=WEEKLY;BYDAY=MO,TH");
    assert_eq!(response.resource_version, "e3b0c442");
    assert_eq!(response.operation, "operation-maint-1");
    assert_eq!(response.end_time, expected_end);
}

#[tokio::test]
async fn test_overnight_window_ends_next_day() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    mount_cluster(&mock_server, "v1").await;
    Mock::given(method("POST"))
        .and(path(format!("{}:setMaintenancePolicy", CLUSTER_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "op-2"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = scheduler
        .schedule_maintenance_at(&maintenance_payload("22:00", 6), anchor())
        .await
        .unwrap();

    assert_eq!(response.start_time, Utc.with_ymd_and_hms(2024, 6, 10, 22, 0, 0).unwrap());
    assert_eq!(response.end_time, Utc.with_ymd_and_hms(2024, 6, 11, 4, 0, 0).unwrap());
}

#[tokio::test]
async fn test_missing_policy_sends_empty_version() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path(CLUSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "my-private-cluster-1"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}:setMaintenancePolicy", CLUSTER_PATH)))
        .and(|request: &Request| {
            serde_json::from_slice::<serde_json::Value>(&request.body)
                .map(|body| body["maintenancePolicy"]["resourceVersion"] == "")
                .unwrap_or(false)
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "op-3"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = scheduler
        .schedule_maintenance_at(&maintenance_payload("03:00", 4), anchor())
        .await
        .unwrap();
    assert_eq!(response.resource_version, "");
}

#[tokio::test]
async fn test_stale_version_conflict_not_retried() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    mount_cluster(&mock_server, "stale").await;
    Mock::given(method("POST"))
        .and(path(format!("{}:setMaintenancePolicy", CLUSTER_PATH)))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {"code": 409, "message": "Cluster resource version does not match"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = scheduler
        .schedule_maintenance_at(&maintenance_payload("03:00", 6), anchor())
        .await
        .unwrap_err();

    match err {
        SchedulerError::ControlPlane {
            step,
            source: ProviderError::Conflict(message),
        } => {
            assert_eq!(step, ControlPlaneStep::SetMaintenancePolicy);
            assert!(message.contains("does not match"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_requests_make_no_call() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut monthly = maintenance_payload("03:00", 6);
    monthly["frequency"] = json!("MONTHLY");
    let mut bad_days = maintenance_payload("03:00", 6);
    bad_days["byday"] = json!(["MO", "XX", "MON"]);

    for payload in [
        monthly,
        bad_days,
        maintenance_payload("3:00", 6),
        maintenance_payload("03:00", 3),
        maintenance_payload("03:00", 25),
    ] {
        let err = scheduler
            .schedule_maintenance_at(&payload, anchor())
            .await
            .unwrap_err();
        assert!(
            matches!(err, SchedulerError::Validation { .. }),
            "{} should be rejected, got {:?}",
            payload,
            err
        );
    }
}
