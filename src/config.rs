//! Runtime configuration for the scheduler.
//!
//! Values come from the process environment, optionally seeded from a
//! dotenv file. Every setting except `PROJECT_ID` has a default.

use crate::core::domain::error::{SchedulerError, SchedulerResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Retry policy for transient control-plane failures.
///
/// The delay is applied before every attempt, including the first, so the
/// cluster has a chance to settle after the previous protocol step.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts (must be at least 1)
    pub max_attempts: u32,
    /// Delay before the first attempt
    pub delay: Duration,
    /// Upper bound for the delay once backoff is applied
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt (1.0 = fixed)
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 1.0,
        }
    }
}

impl RetryConfig {
    /// A fixed-delay policy.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            max_delay: delay,
            backoff_multiplier: 1.0,
        }
    }
}

/// Client-side rate limit applied to control-plane requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Configuration for the scheduler and its default adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Default project the service runs for
    pub project_id: String,
    /// Deployment environment name (dev, staging, prod)
    pub environment: String,
    /// Base URL of the compute API, e.g. `https://compute.googleapis.com/compute/v1/`
    pub compute_api_url: Url,
    /// Base URL of the container API, e.g. `https://container.googleapis.com/v1/`
    pub container_api_url: Url,
    /// Pre-obtained bearer token attached to control-plane requests
    pub access_token: Option<String>,
    pub resize_retry: RetryConfig,
    pub rate_limit: Option<RateLimitConfig>,
    /// Store collection for node pool schedule tags
    pub nodepool_collection: String,
    /// Store collection for VM schedule tags
    pub vm_collection: String,
    /// Directory for the file-backed store; in-memory when absent
    pub store_dir: Option<PathBuf>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            environment: "dev".to_string(),
            compute_api_url: Url::parse(Self::DEFAULT_COMPUTE_API_URL)
                .expect("default compute URL is valid"),
            container_api_url: Url::parse(Self::DEFAULT_CONTAINER_API_URL)
                .expect("default container URL is valid"),
            access_token: None,
            resize_retry: RetryConfig::default(),
            rate_limit: None,
            nodepool_collection: "gke-nodepool-scheduler".to_string(),
            vm_collection: "gce-vm-scheduler".to_string(),
            store_dir: None,
        }
    }
}

impl SchedulerConfig {
    const DEFAULT_COMPUTE_API_URL: &'static str = "https://compute.googleapis.com/compute/v1/";
    const DEFAULT_CONTAINER_API_URL: &'static str = "https://container.googleapis.com/v1/";

    /// Loads configuration from the process environment, reading a `.env`
    /// file in the working directory first if one exists.
    pub fn from_env() -> SchedulerResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from a dotenv file. Variables already set in the
    /// process environment take precedence over the file.
    pub fn from_env_file(path: impl AsRef<Path>) -> SchedulerResult<Self> {
        let path = path.as_ref();
        let mut file_vars = HashMap::new();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            SchedulerError::Config(format!("Missing config file {}: {}", path.display(), e))
        })?;
        for item in iter {
            let (key, value) = item.map_err(|e| {
                SchedulerError::Config(format!("Invalid entry in {}: {}", path.display(), e))
            })?;
            file_vars.insert(key, value);
        }

        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        })
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> SchedulerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let project_id = get("PROJECT_ID")
            .ok_or_else(|| SchedulerError::Config("Missing required config: PROJECT_ID".into()))?;

        let mut resize_retry = defaults.resize_retry.clone();
        if let Some(attempts) = get("RESIZE_MAX_ATTEMPTS") {
            resize_retry.max_attempts = parse_number("RESIZE_MAX_ATTEMPTS", &attempts)?;
        }
        if let Some(secs) = get("RESIZE_RETRY_DELAY_SECS") {
            resize_retry.delay = Duration::from_secs(parse_number("RESIZE_RETRY_DELAY_SECS", &secs)?);
            resize_retry.max_delay = resize_retry.max_delay.max(resize_retry.delay);
        }
        if let Some(secs) = get("RESIZE_RETRY_MAX_DELAY_SECS") {
            resize_retry.max_delay =
                Duration::from_secs(parse_number("RESIZE_RETRY_MAX_DELAY_SECS", &secs)?);
        }
        if let Some(multiplier) = get("RESIZE_BACKOFF_MULTIPLIER") {
            resize_retry.backoff_multiplier =
                parse_number("RESIZE_BACKOFF_MULTIPLIER", &multiplier)?;
        }

        let rate_limit = match get("RATE_LIMIT_PER_SECOND") {
            Some(rps) => {
                let requests_per_second = parse_number("RATE_LIMIT_PER_SECOND", &rps)?;
                let burst_size = match get("RATE_LIMIT_BURST") {
                    Some(burst) => parse_number("RATE_LIMIT_BURST", &burst)?,
                    None => requests_per_second,
                };
                Some(RateLimitConfig {
                    requests_per_second,
                    burst_size,
                })
            }
            None => None,
        };

        let config = Self {
            project_id,
            environment: get("ENV").unwrap_or(defaults.environment),
            compute_api_url: match get("COMPUTE_API_URL") {
                Some(raw) => parse_url("COMPUTE_API_URL", &raw)?,
                None => defaults.compute_api_url,
            },
            container_api_url: match get("CONTAINER_API_URL") {
                Some(raw) => parse_url("CONTAINER_API_URL", &raw)?,
                None => defaults.container_api_url,
            },
            access_token: get("ACCESS_TOKEN"),
            resize_retry,
            rate_limit,
            nodepool_collection: get("NODEPOOL_COLLECTION").unwrap_or(defaults.nodepool_collection),
            vm_collection: get("VM_COLLECTION").unwrap_or(defaults.vm_collection),
            store_dir: get("STORE_DIR").map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.resize_retry.max_attempts == 0 {
            return Err(SchedulerError::Config(
                "Resize retry needs at least one attempt".to_string(),
            ));
        }
        let multiplier = self.resize_retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(SchedulerError::Config(
                "Backoff multiplier must be a finite number of at least 1.0".to_string(),
            ));
        }
        if self.resize_retry.max_delay < self.resize_retry.delay {
            return Err(SchedulerError::Config(
                "Maximum retry delay cannot be shorter than the initial delay".to_string(),
            ));
        }
        if let Some(rl) = self.rate_limit {
            if rl.requests_per_second == 0 || rl.burst_size == 0 {
                return Err(SchedulerError::Config(
                    "Rate limit values must be greater than zero".to_string(),
                ));
            }
        }
        if self.nodepool_collection.is_empty() || self.vm_collection.is_empty() {
            return Err(SchedulerError::Config(
                "Store collection names cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> SchedulerResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| SchedulerError::Config(format!("{} must be a number, got '{}'", key, raw)))
}

fn parse_url(key: &str, raw: &str) -> SchedulerResult<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| SchedulerError::Config(format!("{} is not a valid URL: {}", key, e)))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
