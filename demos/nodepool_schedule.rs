use power_scheduler::{
    NodePoolScheduleTag, PowerScheduler, SchedulePhase, SchedulerConfig, SchedulerError,
    SchedulerResult, telemetry,
};
use serde_json::json;

#[tokio::main]
async fn main() -> SchedulerResult<()> {
    telemetry::init_tracing()?;

    let config = SchedulerConfig::from_env()?;
    let tag_payload = json!({
        "project_id": config.project_id,
        "zone": "us-central1-a",
        "cluster_id": "cluster-1",
        "nodepool_id": "np-1",
        "enable_autoscaling": true,
        "business_hours_config": "3,6,4",
        "off_hours_config": "0,0,0",
        "business_hours": {
            "days": [1, 2, 3, 4, 5],
            "starttime": "08:00:00",
            "endtime": "18:00:00",
            "timezone": "America/New_York"
        }
    });
    let scheduler = PowerScheduler::from_config(config)?;

    let stored = scheduler.tag_node_pool(&tag_payload).await?;
    println!("Stored {}/{}", stored.collection, stored.doc_id);

    let tag = NodePoolScheduleTag::from_json(&tag_payload)?;
    match scheduler
        .apply_node_pool_phase(&tag, SchedulePhase::OffHours)
        .await
    {
        Ok(response) => println!(
            "{} is now {} with {:?} nodes",
            response.node_pool, response.state, response.node_count
        ),
        Err(SchedulerError::ResizeExhausted {
            node_pool,
            attempts,
            state,
            ..
        }) => println!(
            "{} stopped at {} after {} resize attempts; re-run to converge",
            node_pool, state, attempts
        ),
        Err(e) => return Err(e),
    }

    Ok(())
}
