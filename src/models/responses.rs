use serde::{Deserialize, Serialize};
use crate::models::domain::{AssignmentResult, WeightConfig};

/// Response for the run and preview endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAssignmentResponse {
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(flatten)]
    pub result: AssignmentResult,
    pub persisted: bool,
    #[serde(rename = "linksWritten")]
    pub links_written: usize,
    #[serde(rename = "skippedProfessors")]
    pub skipped_professors: Vec<String>,
    #[serde(rename = "skippedTas")]
    pub skipped_tas: Vec<String>,
}

/// Current weight coefficients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsResponse {
    #[serde(flatten)]
    pub weights: WeightConfig,
    /// False when no row is stored and configured defaults are returned
    pub stored: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

/// Update weights response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWeightsResponse {
    pub success: bool,
}
