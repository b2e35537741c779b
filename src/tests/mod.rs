mod resources;

use crate::{MemoryStore, PowerScheduler, RetryConfig, ScheduleStore, SchedulerConfig};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Configuration pointing both control-plane APIs at a mock server.
pub(crate) fn test_config(server_url: &str) -> SchedulerConfig {
    SchedulerConfig {
        project_id: "test-project".to_string(),
        compute_api_url: Url::parse(&format!("{}/compute/v1/", server_url)).unwrap(),
        container_api_url: Url::parse(&format!("{}/v1/", server_url)).unwrap(),
        access_token: Some("ya29.test-token".to_string()),
        resize_retry: RetryConfig::fixed(3, Duration::ZERO),
        ..Default::default()
    }
}

/// A scheduler talking to `server_url` through the REST client, with an
/// in-memory store the test can inspect.
pub(crate) fn create_test_scheduler(server_url: &str) -> (PowerScheduler, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let scheduler = PowerScheduler::builder()
        .config(test_config(server_url))
        .store(store.clone())
        .build()
        .unwrap();
    (scheduler, store)
}

/// A scheduler talking to `server_url` with a caller-supplied store.
pub(crate) fn create_test_scheduler_with_store(
    server_url: &str,
    store: Arc<dyn ScheduleStore>,
) -> PowerScheduler {
    PowerScheduler::builder()
        .config(test_config(server_url))
        .store(store)
        .build()
        .unwrap()
}
