use std::time::SystemTime;
use serde::{Serialize, Deserialize};
use crate::cache::manager::CacheStats;

/// Engine-level statistics for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub uptime_secs: u64,
    pub start_time: SystemTime,

    pub total_documents: usize,
    pub trie_node_count: usize,

    pub cache_stats: CacheStats,
    pub queries_per_second: f64,
    pub avg_query_latency_ms: f64,

    pub writes_total: u64,
    pub last_save_time: Option<SystemTime>,
}

/// Health check status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: SystemTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub latency_ms: u64,
}

impl HealthCheckResult {
    pub fn from_checks(checks: Vec<HealthCheck>) -> Self {
        let status = if checks.iter().any(|c| matches!(c.status, HealthStatus::Unhealthy(_))) {
            HealthStatus::Unhealthy("one or more checks failed".to_string())
        } else if checks.iter().any(|c| matches!(c.status, HealthStatus::Degraded(_))) {
            HealthStatus::Degraded("one or more checks degraded".to_string())
        } else {
            HealthStatus::Healthy
        };

        HealthCheckResult {
            status,
            checks,
            timestamp: SystemTime::now(),
        }
    }
}
