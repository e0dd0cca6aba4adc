use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use uuid::Uuid;

use crate::api_error::ApiError;
use crate::models::MatchStatus;
use crate::service::MatchLifecycleService;

// =============================================================================
// PLAYER MATCHES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct PlayerMatchesQuery {
    pub league_id: Option<Uuid>,
    pub status: Option<MatchStatus>,
}

/// GET /api/players/:external_id/matches?league_id=&status=
/// Matches for an account, optionally narrowed by league and status
pub async fn get_player_matches(
    service: web::Data<MatchLifecycleService>,
    path: web::Path<String>,
    query: web::Query<PlayerMatchesQuery>,
) -> Result<impl Responder, ApiError> {
    let external_id = path.into_inner();

    let result = service
        .get_player_matches(&external_id, query.league_id, query.status)
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

// =============================================================================
// ACTIVE MATCHES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ActiveMatchesQuery {
    pub league_id: Uuid,
}

/// GET /api/players/:external_id/active?league_id=
/// A player's pending matches in one league; used to block leaving a
/// league while matches are outstanding
pub async fn get_player_active_matches(
    service: web::Data<MatchLifecycleService>,
    path: web::Path<String>,
    query: web::Query<ActiveMatchesQuery>,
) -> Result<impl Responder, ApiError> {
    let external_id = path.into_inner();

    let result = service
        .get_player_active_matches(&external_id, query.league_id)
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

// =============================================================================
// ROUTE CONFIGURATION
// =============================================================================

/// Configure player routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/players")
            .route("/{external_id}/matches", web::get().to(get_player_matches))
            .route("/{external_id}/active", web::get().to(get_player_active_matches)),
    );
}
