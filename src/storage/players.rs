use sqlx::PgConnection;
use uuid::Uuid;

use crate::api_error::ApiError;
use crate::models::Player;
use crate::rank::Tier;

const PLAYER_COLUMNS: &str =
    "id, external_id, league_id, display_name, elo, rank, wins, losses, joined_at";

pub async fn insert(conn: &mut PgConnection, player: &Player) -> Result<Player, ApiError> {
    let inserted = sqlx::query_as::<_, Player>(&format!(
        "INSERT INTO players (id, external_id, league_id, display_name, elo, rank, wins, losses, joined_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {PLAYER_COLUMNS}"
    ))
    .bind(player.id)
    .bind(&player.external_id)
    .bind(player.league_id)
    .bind(&player.display_name)
    .bind(player.elo)
    .bind(player.rank)
    .bind(player.wins)
    .bind(player.losses)
    .bind(player.joined_at)
    .fetch_one(conn)
    .await?;

    Ok(inserted)
}

/// Resolve an external account identity to its membership row in a league.
pub async fn find_membership(
    conn: &mut PgConnection,
    external_id: &str,
    league_id: Uuid,
) -> Result<Option<Player>, ApiError> {
    let player = sqlx::query_as::<_, Player>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE external_id = $1 AND league_id = $2"
    ))
    .bind(external_id)
    .bind(league_id)
    .fetch_optional(conn)
    .await?;

    Ok(player)
}

/// Lock a set of player rows for the rest of the transaction. Rows come
/// back ordered by id, which is also the lock acquisition order, so two
/// concurrent reports over the same pair cannot deadlock.
pub async fn lock_for_update(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<Vec<Player>, ApiError> {
    let players = sqlx::query_as::<_, Player>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE id = ANY($1) ORDER BY id FOR UPDATE"
    ))
    .bind(ids)
    .fetch_all(conn)
    .await?;

    Ok(players)
}

/// Grandmaster candidates for a league, locked and ordered by the
/// arbitration tie-break: rating, then join date, then id.
pub async fn list_eligible_for_update(
    conn: &mut PgConnection,
    league_id: Uuid,
    min_elo: i32,
) -> Result<Vec<Player>, ApiError> {
    let players = sqlx::query_as::<_, Player>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players \
         WHERE league_id = $1 AND elo >= $2 \
         ORDER BY elo DESC, joined_at ASC, id ASC \
         FOR UPDATE"
    ))
    .bind(league_id)
    .bind(min_elo)
    .fetch_all(conn)
    .await?;

    Ok(players)
}

/// Persist a rating change: new elo, tier and win/loss counters.
pub async fn update_stats(
    conn: &mut PgConnection,
    id: Uuid,
    elo: i32,
    rank: Tier,
    wins: i32,
    losses: i32,
) -> Result<(), ApiError> {
    sqlx::query("UPDATE players SET elo = $2, rank = $3, wins = $4, losses = $5 WHERE id = $1")
        .bind(id)
        .bind(elo)
        .bind(rank)
        .bind(wins)
        .bind(losses)
        .execute(conn)
        .await?;

    Ok(())
}

/// Rewrite only the tier, used when arbitration promotes or demotes a
/// player whose rating did not change.
pub async fn update_rank(conn: &mut PgConnection, id: Uuid, rank: Tier) -> Result<(), ApiError> {
    sqlx::query("UPDATE players SET rank = $2 WHERE id = $1")
        .bind(id)
        .bind(rank)
        .execute(conn)
        .await?;

    Ok(())
}

/// All members of a league ordered for the standings table.
pub async fn list_by_league(
    conn: &mut PgConnection,
    league_id: Uuid,
) -> Result<Vec<Player>, ApiError> {
    let players = sqlx::query_as::<_, Player>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players \
         WHERE league_id = $1 \
         ORDER BY elo DESC, joined_at ASC, id ASC"
    ))
    .bind(league_id)
    .fetch_all(conn)
    .await?;

    Ok(players)
}
