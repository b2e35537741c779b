use power_scheduler::{PowerScheduler, SchedulerConfig, SchedulerResult, telemetry};
use serde_json::json;

#[tokio::main]
async fn main() -> SchedulerResult<()> {
    telemetry::init_tracing()?;

    let config = SchedulerConfig::from_env()?;
    let payload = json!({
        "project_id": config.project_id,
        "location": "us-central1-a",
        "cluster_id": "my-private-cluster-1",
        "frequency": "WEEKLY",
        "byday": ["MO", "TH"],
        "start_time": "22:00",
        "duration_hours": 6
    });
    let scheduler = PowerScheduler::from_config(config)?;

    let response = scheduler.schedule_maintenance(&payload).await?;
    println!(
        "{}: {} from {} to {} (version {})",
        response.cluster,
        response.recurrence,
        response.start_time,
        response.end_time,
        response.resource_version
    );

    Ok(())
}
