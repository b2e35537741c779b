use power_scheduler::{PowerScheduler, SchedulerConfig, SchedulerResult, telemetry};
use serde_json::json;

#[tokio::main]
async fn main() -> SchedulerResult<()> {
    telemetry::init_tracing()?;

    let config = SchedulerConfig::from_env()?;
    let project_id = config.project_id.clone();
    let scheduler = PowerScheduler::from_config(config)?;

    for action in ["stop", "start"] {
        let response = scheduler
            .vm_operation(&json!({
                "vm_name": "test-vm",
                "action": action,
                "zone": "us-central1-a",
                "project_id": project_id
            }))
            .await?;
        println!("{} {}: {}", response.action, response.vm_name, response.operation);
    }

    Ok(())
}
