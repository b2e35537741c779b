//! REST client for the compute and container control-plane APIs.

use crate::{
    config::SchedulerConfig,
    core::{
        domain::{
            error::{ProviderError, SchedulerError, SchedulerResult},
            model::{maintenance_window::MaintenancePolicy, operation::Operation},
        },
        infrastructure::control_plane::ControlPlane,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// HTTP client that issues control-plane calls against the Compute Engine
/// and GKE REST APIs.
///
/// A bearer token is attached to each request when configured. Obtaining
/// and refreshing that token is the caller's concern. An optional rate
/// limiter is shared by every request issued through the client.
#[derive(Debug)]
pub struct GcpApiClient {
    http_client: Client,
    compute_base: Url,
    container_base: Url,
    access_token: Option<String>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl GcpApiClient {
    /// Creates a new `GcpApiClient` from the scheduler configuration.
    ///
    /// # Errors
    /// Returns `SchedulerError::Config` if the HTTP client cannot be built or
    /// the rate limit is zero.
    pub fn new(config: &SchedulerConfig) -> SchedulerResult<Self> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| SchedulerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let per_second = NonZeroU32::new(rl.requests_per_second).ok_or_else(|| {
                    SchedulerError::Config("requests_per_second must be non-zero".to_string())
                })?;
                let burst = NonZeroU32::new(rl.burst_size).ok_or_else(|| {
                    SchedulerError::Config("burst_size must be non-zero".to_string())
                })?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            compute_base: config.compute_api_url.clone(),
            container_base: config.container_api_url.clone(),
            access_token: config.access_token.clone(),
            rate_limiter,
        })
    }

    fn compute_url(&self, path: &str) -> String {
        join(&self.compute_base, path)
    }

    fn container_url(&self, path: &str) -> String {
        join(&self.container_base, path)
    }

    /// Core request execution: rate limiting, auth header, status mapping
    /// and response parsing.
    async fn execute_request<B, T>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        debug!(method = %method, url = %url, "Sending control plane request");
        let mut req_builder = self.http_client.request(method, url);

        if let Some(token) = &self.access_token {
            req_builder = req_builder.bearer_auth(token);
        }

        if let Some(body) = body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            let message = provider_message(&error_text);
            warn!(status = status.as_u16(), url = %url, error = %message, "Control plane rejected request");

            return Err(match status {
                StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                    ProviderError::Conflict(message)
                }
                _ => ProviderError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Decode(format!("Failed to parse response: {}", e)))
    }

    async fn instance_action(
        &self,
        project: &str,
        zone: &str,
        instance: &str,
        verb: &str,
    ) -> Result<Operation, ProviderError> {
        let url = self.compute_url(&format!(
            "projects/{}/zones/{}/instances/{}/{}",
            project, zone, instance, verb
        ));
        self.execute_request(Method::POST, &url, None::<&()>).await
    }
}

fn join(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Pulls `error.message` out of a provider error body, falling back to the raw text.
fn provider_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetAutoscalingBody {
    autoscaling: AutoscalingBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AutoscalingBody {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_node_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_node_count: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetSizeBody {
    node_count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateLabelsBody<'a> {
    resource_labels: ResourceLabelsBody<'a>,
    etag: &'a str,
}

#[derive(Debug, Serialize)]
struct ResourceLabelsBody<'a> {
    labels: &'a BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterResponse {
    #[serde(default)]
    maintenance_policy: Option<MaintenancePolicyResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaintenancePolicyResponse {
    #[serde(default)]
    resource_version: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetMaintenancePolicyBody<'a> {
    maintenance_policy: MaintenancePolicyBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MaintenancePolicyBody<'a> {
    window: MaintenanceWindowBody<'a>,
    resource_version: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MaintenanceWindowBody<'a> {
    recurring_window: RecurringWindowBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecurringWindowBody<'a> {
    window: TimeWindowBody,
    recurrence: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TimeWindowBody {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

#[async_trait]
impl ControlPlane for GcpApiClient {
    async fn start_instance(
        &self,
        project: &str,
        zone: &str,
        instance: &str,
    ) -> Result<Operation, ProviderError> {
        self.instance_action(project, zone, instance, "start").await
    }

    async fn stop_instance(
        &self,
        project: &str,
        zone: &str,
        instance: &str,
    ) -> Result<Operation, ProviderError> {
        self.instance_action(project, zone, instance, "stop").await
    }

    async fn restart_instance(
        &self,
        project: &str,
        zone: &str,
        instance: &str,
    ) -> Result<Operation, ProviderError> {
        // Compute Engine exposes restart as a hard reset.
        self.instance_action(project, zone, instance, "reset").await
    }

    async fn set_node_pool_autoscaling(
        &self,
        node_pool: &str,
        enabled: bool,
        min_nodes: Option<u32>,
        max_nodes: Option<u32>,
    ) -> Result<Operation, ProviderError> {
        let body = SetAutoscalingBody {
            autoscaling: AutoscalingBody {
                enabled,
                min_node_count: min_nodes.filter(|_| enabled),
                max_node_count: max_nodes.filter(|_| enabled),
            },
        };
        let url = self.container_url(&format!("{}:setAutoscaling", node_pool));
        self.execute_request(Method::POST, &url, Some(&body)).await
    }

    async fn set_node_pool_size(
        &self,
        node_pool: &str,
        node_count: u32,
    ) -> Result<Operation, ProviderError> {
        let body = SetSizeBody { node_count };
        let url = self.container_url(&format!("{}:setSize", node_pool));
        self.execute_request(Method::POST, &url, Some(&body)).await
    }

    async fn set_node_pool_labels(
        &self,
        node_pool: &str,
        labels: &BTreeMap<String, String>,
        fingerprint: &str,
    ) -> Result<Operation, ProviderError> {
        let body = UpdateLabelsBody {
            resource_labels: ResourceLabelsBody { labels },
            etag: fingerprint,
        };
        let url = self.container_url(node_pool);
        self.execute_request(Method::PUT, &url, Some(&body)).await
    }

    async fn get_cluster_maintenance_policy_version(
        &self,
        cluster: &str,
    ) -> Result<String, ProviderError> {
        let url = self.container_url(cluster);
        let cluster: ClusterResponse = self.execute_request(Method::GET, &url, None::<&()>).await?;
        Ok(cluster
            .maintenance_policy
            .and_then(|policy| policy.resource_version)
            .unwrap_or_default())
    }

    async fn set_cluster_maintenance_policy(
        &self,
        cluster: &str,
        policy: &MaintenancePolicy,
    ) -> Result<Operation, ProviderError> {
        let body = SetMaintenancePolicyBody {
            maintenance_policy: MaintenancePolicyBody {
                window: MaintenanceWindowBody {
                    recurring_window: RecurringWindowBody {
                        window: TimeWindowBody {
                            start_time: policy.window.start_time,
                            end_time: policy.window.end_time,
                        },
                        recurrence: &policy.window.recurrence,
                    },
                },
                resource_version: &policy.resource_version,
            },
        };
        let url = self.container_url(&format!("{}:setMaintenancePolicy", cluster));
        self.execute_request(Method::POST, &url, Some(&body)).await
    }
}
