use serde::{Deserialize, Serialize};

/// Health states reported by the server
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Response for the health endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub model_present: bool,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Response for the model status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatusResponse {
    pub present: bool,
    pub path: String,
    pub input_size: [usize; 3],
}
