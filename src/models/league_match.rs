use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::api_error::ApiError;

/// Match lifecycle states. `Completed` and `Cancelled` are terminal; no
/// operation may leave them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl MatchStatus {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, to: &MatchStatus) -> bool {
        matches!(
            (self, to),
            (MatchStatus::Scheduled, MatchStatus::Completed)
                | (MatchStatus::Scheduled, MatchStatus::Cancelled)
        )
    }

    /// Check if state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }
}

/// Which seat of the match a player occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSide {
    Player1,
    Player2,
}

/// Winner and loser decided by a reported result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultOutcome {
    pub winner_id: Uuid,
    pub loser_id: Uuid,
}

/// One scheduled or completed contest between two league-scoped players.
/// Rows are retained as history and never physically deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Match {
    pub id: Uuid,
    pub league_id: Uuid,
    pub player1_id: Uuid,
    pub player2_id: Uuid,
    pub status: MatchStatus,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub is_instant: bool,
    pub player1_confirmed: bool,
    pub player2_confirmed: bool,
    pub player1_score: Option<i32>,
    pub player2_score: Option<i32>,
    pub winner_id: Option<Uuid>,
    pub loser_id: Option<Uuid>,
    pub elo_delta: Option<i32>,
    pub completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Build a new `Scheduled` match. The scheduling player (player1) is
    /// auto-confirmed. A date-bound match needs no accept step, so both
    /// sides start confirmed; an instant match waits for the opponent.
    pub fn create(
        league_id: Uuid,
        player1_id: Uuid,
        player2_id: Uuid,
        scheduled_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let is_instant = scheduled_date.is_none();
        Self {
            id: Uuid::new_v4(),
            league_id,
            player1_id,
            player2_id,
            status: MatchStatus::Scheduled,
            scheduled_date,
            is_instant,
            player1_confirmed: true,
            player2_confirmed: !is_instant,
            player1_score: None,
            player2_score: None,
            winner_id: None,
            loser_id: None,
            elo_delta: None,
            completed_date: None,
            created_at: now,
        }
    }

    pub fn side_of(&self, player_id: Uuid) -> Option<MatchSide> {
        if player_id == self.player1_id {
            Some(MatchSide::Player1)
        } else if player_id == self.player2_id {
            Some(MatchSide::Player2)
        } else {
            None
        }
    }

    pub fn is_fully_confirmed(&self) -> bool {
        self.player1_confirmed && self.player2_confirmed
    }

    fn require_scheduled(&self) -> Result<(), ApiError> {
        if self.status != MatchStatus::Scheduled {
            return Err(ApiError::InvalidState);
        }
        Ok(())
    }

    fn require_transition(&self, to: MatchStatus) -> Result<(), ApiError> {
        if !self.status.can_transition_to(&to) {
            return Err(ApiError::InvalidState);
        }
        Ok(())
    }

    fn require_participant(&self, player_id: Uuid) -> Result<MatchSide, ApiError> {
        self.side_of(player_id).ok_or(ApiError::NotParticipant)
    }

    /// Record the caller's confirmation. Confirming twice from the same
    /// side is a no-op success. Once both sides have confirmed an instant
    /// match it becomes playable immediately, so `scheduled_date` is
    /// stamped with the current time.
    pub fn confirm(&mut self, player_id: Uuid, now: DateTime<Utc>) -> Result<(), ApiError> {
        self.require_scheduled()?;
        let side = self.require_participant(player_id)?;

        match side {
            MatchSide::Player1 => self.player1_confirmed = true,
            MatchSide::Player2 => self.player2_confirmed = true,
        }

        if self.is_fully_confirmed() && self.is_instant && self.scheduled_date.is_none() {
            self.scheduled_date = Some(now);
        }

        Ok(())
    }

    /// Apply a reported result. The winner is decided strictly from the
    /// scores: `score1 > score2` means player1 won, anything else player2.
    /// Ties and negative scores are rejected before any field changes.
    pub fn record_result(
        &mut self,
        reporter_id: Uuid,
        player1_score: i32,
        player2_score: i32,
        now: DateTime<Utc>,
    ) -> Result<ResultOutcome, ApiError> {
        self.require_transition(MatchStatus::Completed)?;
        self.require_participant(reporter_id)?;

        if !self.is_fully_confirmed() {
            return Err(ApiError::NotConfirmed);
        }
        if player1_score < 0 || player2_score < 0 {
            return Err(ApiError::InvalidScore("scores must be non-negative".to_string()));
        }
        if player1_score == player2_score {
            return Err(ApiError::InvalidScore("ties are not allowed".to_string()));
        }

        let outcome = if player1_score > player2_score {
            ResultOutcome {
                winner_id: self.player1_id,
                loser_id: self.player2_id,
            }
        } else {
            ResultOutcome {
                winner_id: self.player2_id,
                loser_id: self.player1_id,
            }
        };

        self.status = MatchStatus::Completed;
        self.player1_score = Some(player1_score);
        self.player2_score = Some(player2_score);
        self.winner_id = Some(outcome.winner_id);
        self.loser_id = Some(outcome.loser_id);
        self.completed_date = Some(now);

        Ok(outcome)
    }

    /// Cancel a scheduled match. No rating effects.
    pub fn cancel(&mut self, player_id: Uuid) -> Result<(), ApiError> {
        self.require_transition(MatchStatus::Cancelled)?;
        self.require_participant(player_id)?;
        self.status = MatchStatus::Cancelled;
        Ok(())
    }
}

// ===== API DTOs =====

/// Schedule Match Request DTO
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ScheduleMatchDTO {
    pub league_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub challenger_external_id: String,
    #[validate(length(min = 1, max = 64))]
    pub opponent_external_id: String,
    pub scheduled_date: Option<DateTime<Utc>>,
}

/// Report Result Request DTO
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ReportResultDTO {
    #[validate(length(min = 1, max = 64))]
    pub reporter_external_id: String,
    pub player1_score: i32,
    pub player2_score: i32,
}

/// Match view with player and league display data resolved, returned by the
/// read queries. The persisted entity stays free of denormalized fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchView {
    pub id: Uuid,
    pub league_id: Uuid,
    pub league_name: String,
    pub player1_id: Uuid,
    pub player1_name: String,
    pub player2_id: Uuid,
    pub player2_name: String,
    pub status: MatchStatus,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub is_instant: bool,
    pub player1_confirmed: bool,
    pub player2_confirmed: bool,
    pub player1_score: Option<i32>,
    pub player2_score: Option<i32>,
    pub winner_id: Option<Uuid>,
    pub elo_delta: Option<i32>,
    pub completed_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_match() -> Match {
        Match::create(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), None, Utc::now())
    }

    fn dated_match() -> Match {
        let date = Utc::now() + chrono::Duration::days(1);
        Match::create(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Some(date), Utc::now())
    }

    fn confirmed_instant_match() -> Match {
        let mut m = instant_match();
        m.confirm(m.player2_id, Utc::now()).unwrap();
        m
    }

    #[test]
    fn valid_state_transitions() {
        assert!(MatchStatus::Scheduled.can_transition_to(&MatchStatus::Completed));
        assert!(MatchStatus::Scheduled.can_transition_to(&MatchStatus::Cancelled));

        assert!(!MatchStatus::Completed.can_transition_to(&MatchStatus::Scheduled));
        assert!(!MatchStatus::Completed.can_transition_to(&MatchStatus::Cancelled));
        assert!(!MatchStatus::Cancelled.can_transition_to(&MatchStatus::Scheduled));
        assert!(!MatchStatus::Cancelled.can_transition_to(&MatchStatus::Completed));
    }

    #[test]
    fn terminal_states() {
        assert!(!MatchStatus::Scheduled.is_terminal());
        assert!(MatchStatus::Completed.is_terminal());
        assert!(MatchStatus::Cancelled.is_terminal());
    }

    #[test]
    fn instant_match_waits_for_opponent() {
        let m = instant_match();
        assert!(m.is_instant);
        assert!(m.player1_confirmed);
        assert!(!m.player2_confirmed);
        assert!(m.scheduled_date.is_none());
        assert_eq!(m.status, MatchStatus::Scheduled);
    }

    #[test]
    fn dated_match_starts_fully_confirmed() {
        let m = dated_match();
        assert!(!m.is_instant);
        assert!(m.player1_confirmed);
        assert!(m.player2_confirmed);
        assert!(m.scheduled_date.is_some());
    }

    #[test]
    fn confirming_instant_match_stamps_playable_date() {
        let mut m = instant_match();
        let now = Utc::now();
        m.confirm(m.player2_id, now).unwrap();

        assert!(m.is_fully_confirmed());
        assert_eq!(m.scheduled_date, Some(now));
    }

    #[test]
    fn confirm_is_idempotent() {
        let mut m = instant_match();
        let first = Utc::now();
        m.confirm(m.player2_id, first).unwrap();

        let later = first + chrono::Duration::minutes(5);
        m.confirm(m.player2_id, later).unwrap();
        m.confirm(m.player1_id, later).unwrap();

        // The playable date is not re-stamped by redundant confirms.
        assert_eq!(m.scheduled_date, Some(first));
        assert!(m.player1_confirmed && m.player2_confirmed);
    }

    #[test]
    fn confirm_rejects_non_participant() {
        let mut m = instant_match();
        let err = m.confirm(Uuid::new_v4(), Utc::now()).unwrap_err();
        assert!(matches!(err, ApiError::NotParticipant));
    }

    #[test]
    fn confirm_rejects_terminal_match() {
        let mut m = confirmed_instant_match();
        m.record_result(m.player1_id, 1, 0, Utc::now()).unwrap();

        let err = m.confirm(m.player2_id, Utc::now()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidState));
    }

    #[test]
    fn result_requires_both_confirmations() {
        let mut m = instant_match();
        let err = m.record_result(m.player1_id, 1, 0, Utc::now()).unwrap_err();
        assert!(matches!(err, ApiError::NotConfirmed));

        // Nothing was mutated by the rejected report.
        assert_eq!(m.status, MatchStatus::Scheduled);
        assert!(m.player1_score.is_none());
        assert!(m.winner_id.is_none());
    }

    #[test]
    fn result_rejects_ties() {
        let mut m = confirmed_instant_match();
        let err = m.record_result(m.player1_id, 2, 2, Utc::now()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidScore(_)));
        assert_eq!(m.status, MatchStatus::Scheduled);
    }

    #[test]
    fn result_rejects_negative_scores() {
        let mut m = confirmed_instant_match();
        let err = m.record_result(m.player1_id, -1, 0, Utc::now()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidScore(_)));
    }

    #[test]
    fn result_rejects_non_participant_reporter() {
        let mut m = confirmed_instant_match();
        let err = m.record_result(Uuid::new_v4(), 1, 0, Utc::now()).unwrap_err();
        assert!(matches!(err, ApiError::NotParticipant));
    }

    #[test]
    fn winner_follows_the_scores() {
        let mut m = confirmed_instant_match();
        let outcome = m.record_result(m.player2_id, 3, 1, Utc::now()).unwrap();
        assert_eq!(outcome.winner_id, m.player1_id);
        assert_eq!(outcome.loser_id, m.player2_id);
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.player1_score, Some(3));
        assert_eq!(m.player2_score, Some(1));
        assert!(m.completed_date.is_some());

        let mut m = confirmed_instant_match();
        let outcome = m.record_result(m.player1_id, 0, 2, Utc::now()).unwrap();
        assert_eq!(outcome.winner_id, m.player2_id);
        assert_eq!(outcome.loser_id, m.player1_id);
    }

    #[test]
    fn completed_match_rejects_every_transition() {
        let mut m = confirmed_instant_match();
        m.record_result(m.player1_id, 1, 0, Utc::now()).unwrap();

        assert!(matches!(
            m.record_result(m.player1_id, 1, 0, Utc::now()),
            Err(ApiError::InvalidState)
        ));
        assert!(matches!(m.cancel(m.player1_id), Err(ApiError::InvalidState)));
        assert!(matches!(
            m.confirm(m.player1_id, Utc::now()),
            Err(ApiError::InvalidState)
        ));
    }

    #[test]
    fn cancelled_match_rejects_every_transition() {
        let mut m = confirmed_instant_match();
        m.cancel(m.player2_id).unwrap();
        assert_eq!(m.status, MatchStatus::Cancelled);

        assert!(matches!(m.cancel(m.player1_id), Err(ApiError::InvalidState)));
        assert!(matches!(
            m.record_result(m.player1_id, 1, 0, Utc::now()),
            Err(ApiError::InvalidState)
        ));
    }

    #[test]
    fn cancel_rejects_non_participant() {
        let mut m = instant_match();
        let err = m.cancel(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApiError::NotParticipant));
        assert_eq!(m.status, MatchStatus::Scheduled);
    }

    #[test]
    fn status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&MatchStatus::Scheduled).unwrap();
        assert_eq!(json, "\"SCHEDULED\"");

        let status: MatchStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(status, MatchStatus::Cancelled);
    }

    #[test]
    fn schedule_dto_validation() {
        let valid = ScheduleMatchDTO {
            league_id: Uuid::new_v4(),
            challenger_external_id: "1001".to_string(),
            opponent_external_id: "1002".to_string(),
            scheduled_date: None,
        };
        assert!(valid.validate().is_ok());

        let invalid = ScheduleMatchDTO {
            league_id: Uuid::new_v4(),
            challenger_external_id: String::new(),
            opponent_external_id: "1002".to_string(),
            scheduled_date: None,
        };
        assert!(invalid.validate().is_err());
    }
}
