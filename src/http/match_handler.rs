use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api_error::ApiError;
use crate::models::{ReportResultDTO, ScheduleMatchDTO};
use crate::service::MatchLifecycleService;

// =============================================================================
// SCHEDULE MATCH
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ScheduleMatchRequest {
    pub league_id: Uuid,
    pub challenger_external_id: String,
    pub opponent_external_id: String,
    pub scheduled_date: Option<DateTime<Utc>>,
}

/// POST /api/matches
/// Schedule a match between two league members
pub async fn schedule_match(
    service: web::Data<MatchLifecycleService>,
    req: web::Json<ScheduleMatchRequest>,
) -> Result<impl Responder, ApiError> {
    info!(
        league_id = %req.league_id,
        challenger = %req.challenger_external_id,
        opponent = %req.opponent_external_id,
        "Received schedule match request"
    );

    let dto = ScheduleMatchDTO {
        league_id: req.league_id,
        challenger_external_id: req.challenger_external_id.clone(),
        opponent_external_id: req.opponent_external_id.clone(),
        scheduled_date: req.scheduled_date,
    };

    let result = service.schedule(dto).await?;

    Ok(HttpResponse::Created().json(result))
}

// =============================================================================
// CONFIRM MATCH
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ConfirmMatchRequest {
    pub external_id: String,
}

/// POST /api/matches/:id/confirm
/// Record a participant's confirmation
pub async fn confirm_match(
    service: web::Data<MatchLifecycleService>,
    path: web::Path<Uuid>,
    req: web::Json<ConfirmMatchRequest>,
) -> Result<impl Responder, ApiError> {
    let match_id = path.into_inner();

    info!(match_id = %match_id, external_id = %req.external_id, "Received confirm request");

    let result = service.confirm(match_id, &req.external_id).await?;

    Ok(HttpResponse::Ok().json(result))
}

// =============================================================================
// REPORT RESULT
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ReportResultRequest {
    pub reporter_external_id: String,
    pub player1_score: i32,
    pub player2_score: i32,
}

/// POST /api/matches/:id/report
/// Report the result of a confirmed match
pub async fn report_result(
    service: web::Data<MatchLifecycleService>,
    path: web::Path<Uuid>,
    req: web::Json<ReportResultRequest>,
) -> Result<impl Responder, ApiError> {
    let match_id = path.into_inner();

    info!(
        match_id = %match_id,
        reporter = %req.reporter_external_id,
        score1 = req.player1_score,
        score2 = req.player2_score,
        "Received report result request"
    );

    let dto = ReportResultDTO {
        reporter_external_id: req.reporter_external_id.clone(),
        player1_score: req.player1_score,
        player2_score: req.player2_score,
    };

    let result = service.report_result(match_id, dto).await?;

    Ok(HttpResponse::Ok().json(result))
}

// =============================================================================
// CANCEL MATCH
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CancelMatchRequest {
    pub external_id: String,
}

/// POST /api/matches/:id/cancel
/// Cancel a scheduled match
pub async fn cancel_match(
    service: web::Data<MatchLifecycleService>,
    path: web::Path<Uuid>,
    req: web::Json<CancelMatchRequest>,
) -> Result<impl Responder, ApiError> {
    let match_id = path.into_inner();

    info!(match_id = %match_id, external_id = %req.external_id, "Received cancel request");

    let result = service.cancel(match_id, &req.external_id).await?;

    Ok(HttpResponse::Ok().json(result))
}

// =============================================================================
// GET MATCH
// =============================================================================

/// GET /api/matches/:id
/// Get match details with resolved player and league display data
pub async fn get_match(
    service: web::Data<MatchLifecycleService>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let match_id = path.into_inner();

    let result = service.get_match(match_id).await?;

    Ok(HttpResponse::Ok().json(result))
}

// =============================================================================
// ROUTE CONFIGURATION
// =============================================================================

/// Configure match lifecycle routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/matches")
            .route("", web::post().to(schedule_match))
            .route("/{id}", web::get().to(get_match))
            .route("/{id}/confirm", web::post().to(confirm_match))
            .route("/{id}/report", web::post().to(report_result))
            .route("/{id}/cancel", web::post().to(cancel_match)),
    );
}
