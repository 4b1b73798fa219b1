use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{Matcher, MatchError};
use crate::models::{
    ErrorResponse, HealthResponse, RunAssignmentResponse, UpdateWeightsRequest,
    UpdateWeightsResponse, WeightConfig, WeightsResponse,
};
use crate::services::{MaterializationPlan, PostgresClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub professor_capacity: u32,
    pub default_weights: WeightConfig,
    /// Serializes persisting runs within this process
    pub run_lock: Arc<tokio::sync::Mutex<()>>,
}

/// Configure all assignment-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/assignments/run", web::post().to(run_assignment))
        .route("/assignments/preview", web::get().to(preview_assignment))
        .route("/weights", web::get().to(get_weights))
        .route("/weights", web::post().to(update_weights));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Run the assignment and persist it
///
/// POST /api/v1/assignments/run
///
/// Replaces every stored TA-course link. Response body:
/// ```json
/// {
///   "runId": "string",
///   "assignments": { "Prof": ["TA"] },
///   "workloads": { "TA": 1 },
///   "persisted": true,
///   "linksWritten": 3,
///   "skippedProfessors": [],
///   "skippedTas": []
/// }
/// ```
async fn run_assignment(state: web::Data<AppState>) -> impl Responder {
    execute_run(&state, true).await
}

/// Run the assignment without persisting it
///
/// GET /api/v1/assignments/preview
async fn preview_assignment(state: web::Data<AppState>) -> impl Responder {
    execute_run(&state, false).await
}

async fn execute_run(state: &AppState, persist: bool) -> HttpResponse {
    let run_id = uuid::Uuid::new_v4().to_string();
    let _guard = if persist {
        Some(state.run_lock.lock().await)
    } else {
        None
    };

    tracing::info!("Starting assignment run {} (persist: {})", run_id, persist);

    let snapshot = match state
        .postgres
        .load_snapshot(state.professor_capacity, state.default_weights)
        .await
    {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Run {}: failed to load snapshot: {}", run_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load assignment data",
                e.to_string(),
            );
        }
    };

    let matcher = Matcher::new(snapshot.weights);
    let result = match matcher.assign(&snapshot.tas, &snapshot.professors) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Run {}: aborted: {}", run_id, e);
            return match_error_response(&e);
        }
    };

    let plan = if persist {
        match state.postgres.replace_assignments(&result, &snapshot).await {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!("Run {}: failed to persist assignments: {}", run_id, e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to persist assignments",
                    e.to_string(),
                );
            }
        }
    } else {
        MaterializationPlan::default()
    };

    tracing::info!(
        "Run {}: assigned {} TA slots across {} professors ({} TAs, {} links written)",
        run_id,
        result.total_assigned(),
        result.assignments.len(),
        result.workloads.len(),
        plan.links.len()
    );

    HttpResponse::Ok().json(RunAssignmentResponse {
        run_id,
        result,
        persisted: persist,
        links_written: plan.links.len(),
        skipped_professors: plan.skipped_professors,
        skipped_tas: plan.skipped_tas,
    })
}

/// Get the current weights
///
/// GET /api/v1/weights
async fn get_weights(state: web::Data<AppState>) -> impl Responder {
    match state.postgres.get_weights().await {
        Ok(Some(weights)) => HttpResponse::Ok().json(WeightsResponse {
            weights,
            stored: true,
        }),
        Ok(None) => HttpResponse::Ok().json(WeightsResponse {
            weights: state.default_weights,
            stored: false,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch weights: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch weights",
                e.to_string(),
            )
        }
    }
}

/// Store new weights
///
/// POST /api/v1/weights
///
/// Request body:
/// ```json
/// {
///   "ta_pref": 0.4,
///   "prof_pref": 0.4,
///   "course_pref": 0.0,
///   "workload_balance": 0.2
/// }
/// ```
async fn update_weights(
    state: web::Data<AppState>,
    req: web::Json<UpdateWeightsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for update_weights request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let weights = WeightConfig::from(req.into_inner());

    match state.postgres.update_weights(&weights).await {
        Ok(()) => HttpResponse::Ok().json(UpdateWeightsResponse { success: true }),
        Err(e) => {
            tracing::error!("Failed to update weights: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update weights",
                e.to_string(),
            )
        }
    }
}

fn match_error_response(err: &MatchError) -> HttpResponse {
    match err {
        MatchError::NoTeachingAssistants { .. } => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Assignment precondition failed",
            err.to_string(),
        ),
    }
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_failure_maps_to_422() {
        let response = match_error_response(&MatchError::NoTeachingAssistants { professors: 3 });

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_error_response_status() {
        let response = error_response(StatusCode::BAD_REQUEST, "Validation failed", "bad".into());

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
