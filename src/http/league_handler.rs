use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api_error::ApiError;
use crate::models::JoinLeagueDTO;
use crate::service::MatchLifecycleService;

// =============================================================================
// JOIN LEAGUE
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct JoinLeagueRequest {
    pub external_id: String,
    pub display_name: String,
}

/// POST /api/leagues/:league_id/players
/// Register an account as a member of a league
pub async fn join_league(
    service: web::Data<MatchLifecycleService>,
    path: web::Path<Uuid>,
    req: web::Json<JoinLeagueRequest>,
) -> Result<impl Responder, ApiError> {
    let league_id = path.into_inner();

    info!(league_id = %league_id, external_id = %req.external_id, "Received join league request");

    let dto = JoinLeagueDTO {
        external_id: req.external_id.clone(),
        display_name: req.display_name.clone(),
    };

    let result = service.join_league(league_id, dto).await?;

    Ok(HttpResponse::Created().json(result))
}

// =============================================================================
// STANDINGS
// =============================================================================

/// GET /api/leagues/:league_id/standings
/// League members ordered by rating, with win rates and tiers
pub async fn get_standings(
    service: web::Data<MatchLifecycleService>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let league_id = path.into_inner();

    let result = service.get_standings(league_id).await?;

    Ok(HttpResponse::Ok().json(result))
}

// =============================================================================
// SCHEDULED MATCHES
// =============================================================================

/// GET /api/leagues/:league_id/matches
/// Scheduled matches for a league with display data resolved
pub async fn get_scheduled_matches(
    service: web::Data<MatchLifecycleService>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let league_id = path.into_inner();

    let result = service.get_scheduled_matches(league_id).await?;

    Ok(HttpResponse::Ok().json(result))
}

// =============================================================================
// ROUTE CONFIGURATION
// =============================================================================

/// Configure league routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/leagues")
            .route("/{league_id}/players", web::post().to(join_league))
            .route("/{league_id}/standings", web::get().to(get_standings))
            .route("/{league_id}/matches", web::get().to(get_scheduled_matches)),
    );
}
