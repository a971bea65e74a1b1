//! Health checks
//!
//! `/health/live` answers as long as the process runs. `/health/ready` and
//! `/health` report the database and the upload directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cw_db::Database;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }

    fn worst(self, other: Self) -> Self {
        match (self, other) {
            (Self::Unhealthy, _) | (_, Self::Unhealthy) => Self::Unhealthy,
            (Self::Degraded, _) | (_, Self::Degraded) => Self::Degraded,
            _ => Self::Healthy,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        if self.status.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Timeout for one component check
    pub check_timeout: Duration,
    /// How long a report is reused
    pub cache_duration: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(3),
            cache_duration: Duration::from_secs(5),
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
    database: Option<Database>,
    upload_dir: Option<PathBuf>,
}

impl HealthChecker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            cache: RwLock::new(None),
            database: None,
            upload_dir: None,
        }
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_upload_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.upload_dir = Some(path.into());
        self
    }

    /// Cached report, or a fresh one when the cache is stale
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.cached_at.elapsed() < self.config.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks().await;
        *self.cache.write().await = Some(CachedHealth {
            report: report.clone(),
            cached_at: Instant::now(),
        });
        report
    }

    async fn perform_checks(&self) -> HealthReport {
        let mut components = Vec::new();
        if let Some(database) = &self.database {
            components.push(self.check_database(database).await);
        }
        if let Some(dir) = &self.upload_dir {
            components.push(check_upload_dir(dir).await);
        }

        let status = components
            .iter()
            .fold(HealthStatus::Healthy, |acc, c| acc.worst(c.status));
        if !status.is_healthy() {
            warn!(?status, "Health check failed");
        }

        HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components,
            timestamp: chrono::Utc::now(),
        }
    }

    async fn check_database(&self, database: &Database) -> ComponentHealth {
        let start = Instant::now();
        let (status, message) = match tokio::time::timeout(self.config.check_timeout, database.ping()).await {
            Ok(Ok(())) => (HealthStatus::Healthy, "Connected".to_string()),
            Ok(Err(err)) => (HealthStatus::Unhealthy, err.to_string()),
            Err(_) => (HealthStatus::Unhealthy, "Timed out".to_string()),
        };
        let stats = database.stats();

        ComponentHealth {
            name: "database".to_string(),
            status,
            message: Some(message),
            response_time_ms: start.elapsed().as_millis() as u64,
            details: Some(serde_json::json!({
                "type": "postgresql",
                "pool_size": stats.size,
                "idle_connections": stats.idle,
            })),
        }
    }
}

async fn check_upload_dir(dir: &PathBuf) -> ComponentHealth {
    let start = Instant::now();
    let (status, message) = match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => (HealthStatus::Healthy, "Writable directory present"),
        Ok(_) => (HealthStatus::Unhealthy, "Not a directory"),
        Err(_) => (HealthStatus::Degraded, "Directory missing"),
    };

    ComponentHealth {
        name: "uploads".to_string(),
        status,
        message: Some(message.to_string()),
        response_time_ms: start.elapsed().as_millis() as u64,
        details: Some(serde_json::json!({ "path": dir.display().to_string() })),
    }
}

/// Liveness probe
pub async fn liveness() -> &'static str {
    "OK"
}

/// Readiness probe and full report
pub async fn readiness(State(health): State<Arc<HealthChecker>>) -> (StatusCode, Json<HealthReport>) {
    let report = health.check().await;
    (report.http_status(), Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_components_is_healthy() {
        let checker = HealthChecker::new(HealthConfig::default());
        let report = checker.check().await;

        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.components.is_empty());
    }

    #[tokio::test]
    async fn test_missing_upload_dir_degrades() {
        let checker = HealthChecker::new(HealthConfig::default())
            .with_upload_dir("/nonexistent/civicworks/uploads");
        let report = checker.check().await;

        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.http_status(), StatusCode::OK);
        assert_eq!(report.components[0].name, "uploads");
    }

    #[tokio::test]
    async fn test_report_is_cached() {
        let checker = HealthChecker::new(HealthConfig {
            cache_duration: Duration::from_secs(60),
            ..Default::default()
        });

        let first = checker.check().await;
        let second = checker.check().await;
        assert_eq!(first.timestamp, second.timestamp);
    }

    #[test]
    fn test_worst_status_wins() {
        assert_eq!(HealthStatus::Healthy.worst(HealthStatus::Degraded), HealthStatus::Degraded);
        assert_eq!(HealthStatus::Degraded.worst(HealthStatus::Unhealthy), HealthStatus::Unhealthy);
        assert_eq!(HealthStatus::Healthy.worst(HealthStatus::Healthy), HealthStatus::Healthy);
    }
}
