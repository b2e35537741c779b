use crate::{
    ControlPlaneStep, NodePoolScheduleTag, ProviderError, ResizeState, SchedulePhase,
    SchedulerError, StoreFailure,
    core::infrastructure::store::MockScheduleStore,
    tests::{create_test_scheduler, create_test_scheduler_with_store},
};
use serde_json::json;
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{any, body_json, method, path},
};

const NODE_POOL_PATH: &str =
    "/v1/projects/test-project/locations/us-central1-a/clusters/cluster-1/nodePools/np-1";

fn capacity_payload(fields: serde_json::Value) -> serde_json::Value {
    let mut payload = json!({
        "project_id": "test-project",
        "zone": "us-central1-a",
        "cluster_id": "cluster-1",
        "nodepool_id": "np-1"
    });
    if let (Some(target), Some(extra)) = (payload.as_object_mut(), fields.as_object()) {
        target.extend(extra.clone());
    }
    payload
}

fn container_operation(name: &str, operation_type: &str) -> serde_json::Value {
    json!({
        "name": name,
        "zone": "us-central1-a",
        "operationType": operation_type,
        "status": "RUNNING",
        "selfLink": format!(
            "https://container.googleapis.com/v1/projects/123/zones/us-central1-a/operations/{}",
            name
        )
    })
}

async fn mount_autoscaling(mock_server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(format!("{}:setAutoscaling", NODE_POOL_PATH)))
        .and(body_json(body))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(container_operation("op-autoscaling", "SET_NODE_POOL_MANAGEMENT")),
        )
        .expect(1)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_autoscaling_with_desired_count() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    mount_autoscaling(
        &mock_server,
        json!({"autoscaling": {"enabled": true, "minNodeCount": 1, "maxNodeCount": 5}}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(format!("{}:setSize", NODE_POOL_PATH)))
        .and(body_json(json!({"nodeCount": 3})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(container_operation("op-size", "SET_NODE_POOL_SIZE")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = scheduler
        .apply_capacity(&capacity_payload(json!({
            "enable_autoscaling": true,
            "min_nodes": 1,
            "max_nodes": 5,
            "desired_node_count": 3
        })))
        .await
        .unwrap();

    assert_eq!(response.state, ResizeState::Resized);
    assert_eq!(response.resize_attempts, 1);
    assert_eq!(response.min_nodes, Some(1));
    assert_eq!(response.max_nodes, Some(5));
    assert_eq!(
        response.node_pool,
        "projects/test-project/locations/us-central1-a/clusters/cluster-1/nodePools/np-1"
    );
}

#[tokio::test]
async fn test_fixed_size_disables_autoscaler() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    mount_autoscaling(&mock_server, json!({"autoscaling": {"enabled": false}})).await;
    Mock::given(method("POST"))
        .and(path(format!("{}:setSize", NODE_POOL_PATH)))
        .and(body_json(json!({"nodeCount": 2})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(container_operation("op-size", "SET_NODE_POOL_SIZE")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = scheduler
        .apply_capacity(&capacity_payload(json!({
            "enable_autoscaling": false,
            "desired_node_count": 2
        })))
        .await
        .unwrap();

    assert!(!response.autoscaling_enabled);
    assert_eq!(response.node_count, Some(2));
}

#[tokio::test]
async fn test_resize_retried_until_success() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    mount_autoscaling(&mock_server, json!({"autoscaling": {"enabled": false}})).await;
    Mock::given(method("POST"))
        .and(path(format!("{}:setSize", NODE_POOL_PATH)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "Cluster is running incompatible operation operation-1718-abc.",
                "status": "FAILED_PRECONDITION"
            }
        })))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}:setSize", NODE_POOL_PATH)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(container_operation("op-size", "SET_NODE_POOL_SIZE")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = scheduler
        .apply_capacity(&capacity_payload(json!({
            "enable_autoscaling": false,
            "desired_node_count": 0
        })))
        .await
        .unwrap();

    assert_eq!(response.resize_attempts, 3);
    assert_eq!(response.state, ResizeState::Resized);
}

#[tokio::test]
async fn test_resize_exhausted_reports_state() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    mount_autoscaling(
        &mock_server,
        json!({"autoscaling": {"enabled": true, "minNodeCount": 1, "maxNodeCount": 3}}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(format!("{}:setSize", NODE_POOL_PATH)))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let err = scheduler
        .apply_capacity(&capacity_payload(json!({
            "enable_autoscaling": true,
            "min_nodes": 1,
            "max_nodes": 3,
            "desired_node_count": 2
        })))
        .await
        .unwrap_err();

    match err {
        SchedulerError::ResizeExhausted {
            attempts,
            state,
            last_error,
            ..
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(state, ResizeState::AutoscalingSet);
            assert_eq!(
                last_error,
                ProviderError::Api {
                    status: 503,
                    message: "backend unavailable".to_string()
                }
            );
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_precondition_failures_make_no_call() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    for fields in [
        json!({"enable_autoscaling": true, "max_nodes": 3}),
        json!({"enable_autoscaling": true, "min_nodes": 1}),
        json!({"enable_autoscaling": false}),
    ] {
        let err = scheduler
            .apply_capacity(&capacity_payload(fields))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulerError::Precondition(_)));
    }
}

#[tokio::test]
async fn test_autoscaler_failure_stops_protocol() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path(format!("{}:setAutoscaling", NODE_POOL_PATH)))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "Required 'container.clusters.update' permission"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}:setSize", NODE_POOL_PATH)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = scheduler
        .apply_capacity(&capacity_payload(json!({
            "enable_autoscaling": false,
            "desired_node_count": 1
        })))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SchedulerError::ControlPlane {
            step: ControlPlaneStep::SetAutoscaling,
            ..
        }
    ));
}

#[tokio::test]
async fn test_label_node_pool() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    Mock::given(method("PUT"))
        .and(path(NODE_POOL_PATH))
        .and(body_json(json!({
            "resourceLabels": {"labels": {"power-schedule": "business-hours", "team": "data"}},
            "etag": "a1b2c3"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(container_operation("op-labels", "UPDATE_NODE_POOL")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = scheduler
        .label_node_pool(&capacity_payload(json!({
            "labels": {"power-schedule": "business-hours", "team": "data"},
            "fingerprint": "a1b2c3"
        })))
        .await
        .unwrap();

    assert_eq!(response.label_count, 2);
    assert_eq!(response.operation, "op-labels");
}

#[tokio::test]
async fn test_label_fingerprint_conflict() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    Mock::given(method("PUT"))
        .and(path(NODE_POOL_PATH))
        .respond_with(ResponseTemplate::new(412).set_body_json(json!({
            "error": {"code": 412, "message": "Labels fingerprint mismatch"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = scheduler
        .label_node_pool(&capacity_payload(json!({
            "labels": {"team": "data"},
            "fingerprint": "stale"
        })))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SchedulerError::ControlPlane {
            step: ControlPlaneStep::SetLabels,
            source: ProviderError::Conflict(_),
        }
    ));
}

#[tokio::test]
async fn test_off_hours_phase_scales_to_zero() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    mount_autoscaling(&mock_server, json!({"autoscaling": {"enabled": false}})).await;
    Mock::given(method("POST"))
        .and(path(format!("{}:setSize", NODE_POOL_PATH)))
        .and(body_json(json!({"nodeCount": 0})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(container_operation("op-size", "SET_NODE_POOL_SIZE")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let tag = NodePoolScheduleTag::from_json(&capacity_payload(json!({
        "enable_autoscaling": true,
        "business_hours_config": "3,6,4",
        "off_hours_config": "0,0,0",
        "business_hours": {
            "days": [1, 2, 3, 4, 5],
            "starttime": "08:00:00",
            "endtime": "18:00:00",
            "timezone": "UTC"
        }
    })))
    .unwrap();

    let response = scheduler
        .apply_node_pool_phase(&tag, SchedulePhase::OffHours)
        .await
        .unwrap();

    assert_eq!(response.node_count, Some(0));
    assert!(!response.autoscaling_enabled);
}

#[tokio::test]
async fn test_business_hours_phase_enables_autoscaler() {
    let mock_server = MockServer::start().await;
    let (scheduler, _) = create_test_scheduler(&mock_server.uri());

    mount_autoscaling(
        &mock_server,
        json!({"autoscaling": {"enabled": true, "minNodeCount": 3, "maxNodeCount": 6}}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(format!("{}:setSize", NODE_POOL_PATH)))
        .and(body_json(json!({"nodeCount": 4})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(container_operation("op-size", "SET_NODE_POOL_SIZE")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let tag = NodePoolScheduleTag::from_json(&capacity_payload(json!({
        "enable_autoscaling": true,
        "business_hours_config": "3,6,4",
        "off_hours_config": "0,0,0",
        "business_hours": {
            "days": [1, 2, 3, 4, 5],
            "starttime": "08:00:00",
            "endtime": "18:00:00",
            "timezone": "UTC"
        }
    })))
    .unwrap();

    let response = scheduler
        .apply_node_pool_phase(&tag, SchedulePhase::BusinessHours)
        .await
        .unwrap();

    assert_eq!(response.state, ResizeState::Resized);
    assert_eq!(response.min_nodes, Some(3));
}

fn node_pool_tag_payload() -> serde_json::Value {
    capacity_payload(json!({
        "enable_autoscaling": true,
        "business_hours_config": "3,6,4",
        "off_hours_config": "0,0,0",
        "business_hours": {
            "days": [1, 2, 3, 4, 5],
            "starttime": "08:00:00",
            "endtime": "18:00:00",
            "timezone": "UTC"
        },
        "updated_on": "2025-06-02T09:45:00+02:00",
        "updated_by": "ops@example.com"
    }))
}

async fn mount_scale_to_zero(mock_server: &MockServer) {
    mount_autoscaling(mock_server, json!({"autoscaling": {"enabled": false}})).await;
    Mock::given(method("POST"))
        .and(path(format!("{}:setSize", NODE_POOL_PATH)))
        .and(body_json(json!({"nodeCount": 0})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(container_operation("op-size", "SET_NODE_POOL_SIZE")),
        )
        .expect(1)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_apply_tag_stores_after_resize() {
    let mock_server = MockServer::start().await;
    let (scheduler, store) = create_test_scheduler(&mock_server.uri());

    mount_scale_to_zero(&mock_server).await;

    let response = scheduler
        .apply_node_pool_tag(&node_pool_tag_payload(), SchedulePhase::OffHours)
        .await
        .unwrap();
    assert_eq!(response.state, ResizeState::Resized);

    let stored = store
        .get("gke-nodepool-scheduler", "test-project__cluster-1__np-1")
        .await
        .unwrap();
    assert_eq!(stored, node_pool_tag_payload());
}

#[tokio::test]
async fn test_apply_tag_not_stored_when_protocol_fails() {
    let mock_server = MockServer::start().await;
    let (scheduler, store) = create_test_scheduler(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path(format!("{}:setAutoscaling", NODE_POOL_PATH)))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "Internal error"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = scheduler
        .apply_node_pool_tag(&node_pool_tag_payload(), SchedulePhase::OffHours)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SchedulerError::ControlPlane {
            step: ControlPlaneStep::SetAutoscaling,
            ..
        }
    ));
    assert_eq!(store.len("gke-nodepool-scheduler").await, 0);
}

#[tokio::test]
async fn test_store_failure_after_resize_is_reported() {
    let mock_server = MockServer::start().await;
    mount_scale_to_zero(&mock_server).await;

    let mut store = MockScheduleStore::new();
    store
        .expect_put()
        .withf(|collection, id, _| {
            collection == "gke-nodepool-scheduler" && id == "test-project__cluster-1__np-1"
        })
        .times(1)
        .returning(|_, _, _| Err(StoreFailure::Backend("unavailable".to_string())));
    store.expect_delete().never();

    let scheduler = create_test_scheduler_with_store(&mock_server.uri(), Arc::new(store));
    let err = scheduler
        .apply_node_pool_tag(&node_pool_tag_payload(), SchedulePhase::OffHours)
        .await
        .unwrap_err();

    match err {
        SchedulerError::Store {
            collection,
            doc_id,
            source: StoreFailure::Backend(message),
        } => {
            assert_eq!(collection, "gke-nodepool-scheduler");
            assert_eq!(doc_id, "test-project__cluster-1__np-1");
            assert_eq!(message, "unavailable");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // Both control-plane calls were made and nothing reverted them.
    mock_server.verify().await;
}
