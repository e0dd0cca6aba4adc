use chrono::Utc;
use sqlx::PgConnection;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::api_error::ApiError;
use crate::db::DbPool;
use crate::models::{
    JoinLeagueDTO, Match, MatchStatus, MatchView, Player, ReportResultDTO, ScheduleMatchDTO,
    StandingsEntry,
};
use crate::rank::{arbitrate_grandmaster, Candidate, Tier, GRANDMASTER_FLOOR};
use crate::rating;
use crate::storage::{leagues, matches, players};

/// Match Lifecycle Service - drives the match state machine and its rating
/// side effects.
///
/// Every state transition runs in one transaction: the match row is locked
/// and its status re-checked inside the transaction, the two player rows
/// are locked before rating writes, and Grandmaster arbitration serializes
/// per league behind an advisory lock. No partial state survives a failure.
#[derive(Clone)]
pub struct MatchLifecycleService {
    pool: DbPool,
}

impl MatchLifecycleService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // =============================================================================
    // JOIN LEAGUE
    // =============================================================================

    /// Register an account in a league at the starting rating.
    pub async fn join_league(
        &self,
        league_id: Uuid,
        dto: JoinLeagueDTO,
    ) -> Result<Player, ApiError> {
        dto.validate()?;

        let mut tx = self.pool.begin().await?;

        leagues::find_by_id(&mut tx, league_id)
            .await?
            .ok_or(ApiError::NotFound("league"))?;

        if players::find_membership(&mut tx, &dto.external_id, league_id)
            .await?
            .is_some()
        {
            return Err(ApiError::DuplicateMember);
        }

        let player = Player::new(dto.external_id, league_id, dto.display_name, Utc::now());
        let created = players::insert(&mut tx, &player).await?;

        tx.commit().await?;

        info!(
            player_id = %created.id,
            league_id = %league_id,
            external_id = %created.external_id,
            "Player joined league"
        );

        Ok(created)
    }

    // =============================================================================
    // SCHEDULE
    // =============================================================================

    /// Create a match between two league members.
    pub async fn schedule(&self, dto: ScheduleMatchDTO) -> Result<Match, ApiError> {
        dto.validate()?;

        if dto.challenger_external_id == dto.opponent_external_id {
            return Err(ApiError::SelfChallenge);
        }
        if let Some(date) = dto.scheduled_date {
            if date <= Utc::now() {
                return Err(ApiError::InvalidSchedule);
            }
        }

        let mut tx = self.pool.begin().await?;

        let challenger =
            players::find_membership(&mut tx, &dto.challenger_external_id, dto.league_id)
                .await?
                .ok_or(ApiError::NotFound("league member"))?;
        let opponent = players::find_membership(&mut tx, &dto.opponent_external_id, dto.league_id)
            .await?
            .ok_or(ApiError::NotFound("league member"))?;

        if matches::find_active_between(&mut tx, dto.league_id, challenger.id, opponent.id)
            .await?
            .is_some()
        {
            return Err(ApiError::DuplicateMatch);
        }

        let entity = Match::create(
            dto.league_id,
            challenger.id,
            opponent.id,
            dto.scheduled_date,
            Utc::now(),
        );
        let created = matches::insert(&mut tx, &entity).await?;

        tx.commit().await?;

        info!(
            match_id = %created.id,
            league_id = %created.league_id,
            player1 = %created.player1_id,
            player2 = %created.player2_id,
            is_instant = created.is_instant,
            "Match scheduled"
        );

        Ok(created)
    }

    // =============================================================================
    // CONFIRM
    // =============================================================================

    /// Record a participant's confirmation. Idempotent per side; once both
    /// sides of an instant match confirm it becomes playable immediately.
    pub async fn confirm(&self, match_id: Uuid, external_id: &str) -> Result<Match, ApiError> {
        let mut tx = self.pool.begin().await?;

        let mut entity = matches::find_by_id_for_update(&mut tx, match_id)
            .await?
            .ok_or(ApiError::NotFound("match"))?;

        let player = players::find_membership(&mut tx, external_id, entity.league_id)
            .await?
            .ok_or(ApiError::NotFound("league member"))?;

        entity.confirm(player.id, Utc::now())?;
        let updated = matches::update(&mut tx, &entity).await?;

        tx.commit().await?;

        info!(
            match_id = %updated.id,
            player_id = %player.id,
            fully_confirmed = updated.is_fully_confirmed(),
            "Match confirmed"
        );

        Ok(updated)
    }

    // =============================================================================
    // REPORT RESULT
    // =============================================================================

    /// Complete a match: persist the scores, move ratings, bump win/loss
    /// counters, reclassify both tiers and re-run Grandmaster arbitration
    /// for the league - all as one atomic unit.
    pub async fn report_result(
        &self,
        match_id: Uuid,
        dto: ReportResultDTO,
    ) -> Result<MatchView, ApiError> {
        dto.validate()?;

        let mut tx = self.pool.begin().await?;

        let mut entity = matches::find_by_id_for_update(&mut tx, match_id)
            .await?
            .ok_or(ApiError::NotFound("match"))?;

        let reporter =
            players::find_membership(&mut tx, &dto.reporter_external_id, entity.league_id)
                .await?
                .ok_or(ApiError::NotFound("league member"))?;

        let outcome = entity.record_result(
            reporter.id,
            dto.player1_score,
            dto.player2_score,
            Utc::now(),
        )?;

        // The league lock is taken before any player-row lock so that two
        // completions in the same league serialize here instead of meeting
        // each other halfway through the arbitration set.
        Self::lock_league(&mut tx, entity.league_id).await?;

        let locked = players::lock_for_update(&mut tx, &[outcome.winner_id, outcome.loser_id])
            .await?;
        let winner = locked
            .iter()
            .find(|p| p.id == outcome.winner_id)
            .cloned()
            .ok_or(ApiError::NotFound("player"))?;
        let loser = locked
            .iter()
            .find(|p| p.id == outcome.loser_id)
            .cloned()
            .ok_or(ApiError::NotFound("player"))?;

        let update = rating::apply(winner.elo, loser.elo);
        entity.elo_delta = Some(update.delta);
        matches::update(&mut tx, &entity).await?;

        players::update_stats(
            &mut tx,
            winner.id,
            update.winner_elo,
            Tier::classify(update.winner_elo),
            winner.wins + 1,
            winner.losses,
        )
        .await?;
        players::update_stats(
            &mut tx,
            loser.id,
            update.loser_elo,
            Tier::classify(update.loser_elo),
            loser.wins,
            loser.losses + 1,
        )
        .await?;

        Self::rearbitrate_grandmaster(&mut tx, entity.league_id).await?;

        let view = matches::find_view(&mut tx, entity.id)
            .await?
            .ok_or(ApiError::NotFound("match"))?;

        tx.commit().await?;

        info!(
            match_id = %entity.id,
            winner_id = %outcome.winner_id,
            loser_id = %outcome.loser_id,
            delta = update.delta,
            "Match completed"
        );

        Ok(view)
    }

    // =============================================================================
    // CANCEL
    // =============================================================================

    /// Cancel a scheduled match. No rating effects.
    pub async fn cancel(&self, match_id: Uuid, external_id: &str) -> Result<Match, ApiError> {
        let mut tx = self.pool.begin().await?;

        let mut entity = matches::find_by_id_for_update(&mut tx, match_id)
            .await?
            .ok_or(ApiError::NotFound("match"))?;

        let player = players::find_membership(&mut tx, external_id, entity.league_id)
            .await?
            .ok_or(ApiError::NotFound("league member"))?;

        entity.cancel(player.id)?;
        let updated = matches::update(&mut tx, &entity).await?;

        tx.commit().await?;

        info!(match_id = %updated.id, cancelled_by = %player.id, "Match cancelled");

        Ok(updated)
    }

    // =============================================================================
    // QUERIES
    // =============================================================================

    /// Get one match with player and league display data resolved.
    pub async fn get_match(&self, match_id: Uuid) -> Result<MatchView, ApiError> {
        let mut conn = self.pool.acquire().await?;

        matches::find_view(&mut conn, match_id)
            .await?
            .ok_or(ApiError::NotFound("match"))
    }

    /// Matches for an account, optionally narrowed by league and status.
    pub async fn get_player_matches(
        &self,
        external_id: &str,
        league_id: Option<Uuid>,
        status: Option<MatchStatus>,
    ) -> Result<Vec<Match>, ApiError> {
        let mut conn = self.pool.acquire().await?;

        matches::list_for_external(&mut conn, external_id, league_id, status).await
    }

    /// Scheduled matches for a league, with display data resolved.
    pub async fn get_scheduled_matches(&self, league_id: Uuid) -> Result<Vec<MatchView>, ApiError> {
        let mut conn = self.pool.acquire().await?;

        leagues::find_by_id(&mut conn, league_id)
            .await?
            .ok_or(ApiError::NotFound("league"))?;

        matches::list_scheduled_views(&mut conn, league_id).await
    }

    /// A player's pending matches in one league. The front-end blocks
    /// leaving a league while this is non-empty.
    pub async fn get_player_active_matches(
        &self,
        external_id: &str,
        league_id: Uuid,
    ) -> Result<Vec<Match>, ApiError> {
        let mut conn = self.pool.acquire().await?;

        let player = players::find_membership(&mut conn, external_id, league_id)
            .await?
            .ok_or(ApiError::NotFound("league member"))?;

        matches::list_active_for_player(&mut conn, player.id, league_id).await
    }

    /// League standings ordered by rating.
    pub async fn get_standings(&self, league_id: Uuid) -> Result<Vec<StandingsEntry>, ApiError> {
        let mut conn = self.pool.acquire().await?;

        leagues::find_by_id(&mut conn, league_id)
            .await?
            .ok_or(ApiError::NotFound("league"))?;

        let members = players::list_by_league(&mut conn, league_id).await?;
        Ok(members
            .iter()
            .enumerate()
            .map(|(i, p)| StandingsEntry::from_player(i + 1, p))
            .collect())
    }

    // =============================================================================
    // HELPER METHODS
    // =============================================================================

    /// Serialize rating side effects per league. The Grandmaster slot is a
    /// single-writer resource across all of a league's players.
    async fn lock_league(conn: &mut PgConnection, league_id: Uuid) -> Result<(), ApiError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text)::bigint)")
            .bind(league_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Re-run Grandmaster arbitration for a league and persist every tier
    /// that changed. This may rewrite players uninvolved in the match that
    /// triggered it: a former champion overtaken on rating is demoted here
    /// even though their own row was not part of the completion.
    ///
    /// Caller must hold the league advisory lock.
    async fn rearbitrate_grandmaster(
        conn: &mut PgConnection,
        league_id: Uuid,
    ) -> Result<(), ApiError> {
        let eligible =
            players::list_eligible_for_update(conn, league_id, GRANDMASTER_FLOOR).await?;

        let candidates: Vec<Candidate> = eligible
            .iter()
            .map(|p| Candidate {
                id: p.id,
                elo: p.elo,
                joined_at: p.joined_at,
            })
            .collect();

        for assignment in arbitrate_grandmaster(&candidates) {
            let current = eligible
                .iter()
                .find(|p| p.id == assignment.id)
                .ok_or(ApiError::NotFound("player"))?;

            if current.rank != assignment.tier {
                players::update_rank(conn, assignment.id, assignment.tier).await?;
                info!(
                    player_id = %assignment.id,
                    league_id = %league_id,
                    from = %current.rank,
                    to = %assignment.tier,
                    "Grandmaster arbitration reassigned tier"
                );
            } else {
                debug!(
                    player_id = %assignment.id,
                    tier = %assignment.tier,
                    "Grandmaster arbitration kept tier"
                );
            }
        }

        Ok(())
    }
}
