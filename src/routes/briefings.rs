use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::VALUE_CHAINS;
use crate::models::{AttendeeProfile, BriefingsRequest, BriefingsResponse, ErrorResponse, HealthResponse, ValueChainView};
use crate::pipeline::MatchPipeline;
use crate::progress::Stage;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<MatchPipeline>,
    pub max_profiles: usize,
}

/// Configure all briefing-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/briefings", web::post().to(create_briefings))
        .route("/value-chains", web::get().to(list_value_chains));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

/// Rank every attendee against every other
///
/// POST /api/v1/briefings
///
/// Request body:
/// ```json
/// {
///   "profiles": [{"name": "string", "title": "string", "company": "string"}],
///   "topK": 4
/// }
/// ```
async fn create_briefings(state: web::Data<AppState>, req: web::Json<BriefingsRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for briefings request: field_errors={:?}", errors);
        return bad_request("Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    if req.profiles.len() > state.max_profiles {
        tracing::info!("Rejected briefings request with {} profiles", req.profiles.len());
        return bad_request(
            "Too many profiles",
            format!("At most {} profiles per run, got {}", state.max_profiles, req.profiles.len()),
        );
    }

    let profiles: Vec<AttendeeProfile> = req.profiles.into_iter().map(AttendeeProfile::normalize).collect();
    let run_id = uuid::Uuid::new_v4().to_string();
    tracing::info!("Starting run {} for {} profiles", run_id, profiles.len());

    let run_label = run_id.clone();
    let progress = move |stage: Stage, overall: f64| {
        tracing::debug!("Run {} progress: {} {:.0}%", run_label, stage, overall * 100.0);
    };
    let prepared = state.pipeline.prepare(&profiles, &progress).await;

    // pairwise scoring is CPU-bound, so it runs on the blocking pool
    let pipeline = state.pipeline.clone();
    let top_k = req.top_k.map(usize::from);
    let outcome = match web::block(move || pipeline.score(&prepared, top_k, &progress)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Scoring failed for run {}: {}", run_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Scoring failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    HttpResponse::Ok().json(BriefingsResponse {
        run_id,
        briefings: outcome.briefings,
        total_profiles: profiles.len(),
        pairs_scored: outcome.pairs_scored,
        generated_at: chrono::Utc::now(),
    })
}

/// Value-chain catalogue in its fixed order
///
/// GET /api/v1/value-chains
async fn list_value_chains() -> impl Responder {
    let chains: Vec<ValueChainView> = VALUE_CHAINS
        .iter()
        .map(|(name, positions)| ValueChainView {
            name: name.to_string(),
            positions: positions.iter().map(|p| p.to_string()).collect(),
        })
        .collect();

    HttpResponse::Ok().json(chains)
}
