// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{TeachingAssistant, Professor, WeightConfig, AssignmentResult, RunSnapshot};
pub use requests::UpdateWeightsRequest;
pub use responses::{RunAssignmentResponse, WeightsResponse, HealthResponse, ErrorResponse, UpdateWeightsResponse};
