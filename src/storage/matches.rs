use sqlx::PgConnection;
use uuid::Uuid;

use crate::api_error::ApiError;
use crate::models::{Match, MatchStatus, MatchView};

const MATCH_COLUMNS: &str = "id, league_id, player1_id, player2_id, status, scheduled_date, \
     is_instant, player1_confirmed, player2_confirmed, player1_score, player2_score, \
     winner_id, loser_id, elo_delta, completed_date, created_at";

const VIEW_SELECT: &str = "SELECT m.id, m.league_id, l.name AS league_name, \
     m.player1_id, p1.display_name AS player1_name, \
     m.player2_id, p2.display_name AS player2_name, \
     m.status, m.scheduled_date, m.is_instant, \
     m.player1_confirmed, m.player2_confirmed, \
     m.player1_score, m.player2_score, m.winner_id, m.elo_delta, m.completed_date \
     FROM matches m \
     JOIN leagues l ON l.id = m.league_id \
     JOIN players p1 ON p1.id = m.player1_id \
     JOIN players p2 ON p2.id = m.player2_id";

pub async fn insert(conn: &mut PgConnection, entity: &Match) -> Result<Match, ApiError> {
    let inserted = sqlx::query_as::<_, Match>(&format!(
        "INSERT INTO matches (id, league_id, player1_id, player2_id, status, scheduled_date, \
         is_instant, player1_confirmed, player2_confirmed, player1_score, player2_score, \
         winner_id, loser_id, elo_delta, completed_date, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         RETURNING {MATCH_COLUMNS}"
    ))
    .bind(entity.id)
    .bind(entity.league_id)
    .bind(entity.player1_id)
    .bind(entity.player2_id)
    .bind(entity.status)
    .bind(entity.scheduled_date)
    .bind(entity.is_instant)
    .bind(entity.player1_confirmed)
    .bind(entity.player2_confirmed)
    .bind(entity.player1_score)
    .bind(entity.player2_score)
    .bind(entity.winner_id)
    .bind(entity.loser_id)
    .bind(entity.elo_delta)
    .bind(entity.completed_date)
    .bind(entity.created_at)
    .fetch_one(conn)
    .await?;

    Ok(inserted)
}

/// Load and lock the match row. Every state transition goes through this,
/// so the status re-check inside the transaction sees committed truth.
pub async fn find_by_id_for_update(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Match>, ApiError> {
    let entity = sqlx::query_as::<_, Match>(&format!(
        "SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(entity)
}

/// Persist the mutable part of a match row after a transition.
pub async fn update(conn: &mut PgConnection, entity: &Match) -> Result<Match, ApiError> {
    let updated = sqlx::query_as::<_, Match>(&format!(
        "UPDATE matches SET status = $2, scheduled_date = $3, \
         player1_confirmed = $4, player2_confirmed = $5, \
         player1_score = $6, player2_score = $7, \
         winner_id = $8, loser_id = $9, elo_delta = $10, completed_date = $11 \
         WHERE id = $1 \
         RETURNING {MATCH_COLUMNS}"
    ))
    .bind(entity.id)
    .bind(entity.status)
    .bind(entity.scheduled_date)
    .bind(entity.player1_confirmed)
    .bind(entity.player2_confirmed)
    .bind(entity.player1_score)
    .bind(entity.player2_score)
    .bind(entity.winner_id)
    .bind(entity.loser_id)
    .bind(entity.elo_delta)
    .bind(entity.completed_date)
    .fetch_one(conn)
    .await?;

    Ok(updated)
}

/// Scheduled match for an unordered pair of players in a league, if one
/// exists. Used as the duplicate-challenge guard.
pub async fn find_active_between(
    conn: &mut PgConnection,
    league_id: Uuid,
    player_a: Uuid,
    player_b: Uuid,
) -> Result<Option<Match>, ApiError> {
    let entity = sqlx::query_as::<_, Match>(&format!(
        "SELECT {MATCH_COLUMNS} FROM matches \
         WHERE league_id = $1 AND status = 'SCHEDULED' \
         AND ((player1_id = $2 AND player2_id = $3) OR (player1_id = $3 AND player2_id = $2)) \
         LIMIT 1"
    ))
    .bind(league_id)
    .bind(player_a)
    .bind(player_b)
    .fetch_optional(conn)
    .await?;

    Ok(entity)
}

/// Matches for an external account identity, newest first, optionally
/// narrowed to one league and/or one status.
pub async fn list_for_external(
    conn: &mut PgConnection,
    external_id: &str,
    league_id: Option<Uuid>,
    status: Option<MatchStatus>,
) -> Result<Vec<Match>, ApiError> {
    // An account holds one membership per league and a match pairs two
    // distinct players, so the join can match at most one seat per row.
    let matches = sqlx::query_as::<_, Match>(&format!(
        "SELECT {prefixed} FROM matches m \
         JOIN players p ON p.id = m.player1_id OR p.id = m.player2_id \
         WHERE p.external_id = $1 \
         AND ($2::uuid IS NULL OR m.league_id = $2) \
         AND ($3::match_status IS NULL OR m.status = $3) \
         ORDER BY m.created_at DESC",
        prefixed = prefixed_match_columns()
    ))
    .bind(external_id)
    .bind(league_id)
    .bind(status)
    .fetch_all(conn)
    .await?;

    Ok(matches)
}

/// A player's pending matches in one league; non-empty blocks leaving it.
pub async fn list_active_for_player(
    conn: &mut PgConnection,
    player_id: Uuid,
    league_id: Uuid,
) -> Result<Vec<Match>, ApiError> {
    let matches = sqlx::query_as::<_, Match>(&format!(
        "SELECT {MATCH_COLUMNS} FROM matches \
         WHERE league_id = $2 AND status = 'SCHEDULED' \
         AND (player1_id = $1 OR player2_id = $1) \
         ORDER BY created_at ASC"
    ))
    .bind(player_id)
    .bind(league_id)
    .fetch_all(conn)
    .await?;

    Ok(matches)
}

/// Scheduled matches for a league with display data resolved, soonest
/// first; instant matches still waiting on confirmation sort last.
pub async fn list_scheduled_views(
    conn: &mut PgConnection,
    league_id: Uuid,
) -> Result<Vec<MatchView>, ApiError> {
    let views = sqlx::query_as::<_, MatchView>(&format!(
        "{VIEW_SELECT} WHERE m.league_id = $1 AND m.status = 'SCHEDULED' \
         ORDER BY m.scheduled_date ASC NULLS LAST, m.created_at ASC"
    ))
    .bind(league_id)
    .fetch_all(conn)
    .await?;

    Ok(views)
}

/// One match with player and league display data resolved.
pub async fn find_view(conn: &mut PgConnection, id: Uuid) -> Result<Option<MatchView>, ApiError> {
    let view = sqlx::query_as::<_, MatchView>(&format!("{VIEW_SELECT} WHERE m.id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(view)
}

fn prefixed_match_columns() -> String {
    MATCH_COLUMNS
        .split(',')
        .map(|col| format!("m.{}", col.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
