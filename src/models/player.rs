use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::rank::Tier;
use crate::rating::STARTING_ELO;

/// League-scoped participation record. The same account holds a distinct
/// row, rating and rank per league it has joined.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Player {
    pub id: Uuid,
    pub external_id: String,
    pub league_id: Uuid,
    pub display_name: String,
    pub elo: i32,
    pub rank: Tier,
    pub wins: i32,
    pub losses: i32,
    pub joined_at: DateTime<Utc>,
}

impl Player {
    /// Fresh membership: every player enters a league at the starting
    /// rating and the lowest tier.
    pub fn new(
        external_id: String,
        league_id: Uuid,
        display_name: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            external_id,
            league_id,
            display_name,
            elo: STARTING_ELO,
            rank: Tier::classify(STARTING_ELO),
            wins: 0,
            losses: 0,
            joined_at: now,
        }
    }
}

/// Join League Request DTO
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct JoinLeagueDTO {
    #[validate(length(min = 1, max = 64))]
    pub external_id: String,
    #[validate(length(min = 1, max = 64))]
    pub display_name: String,
}

/// One row of a league's standings table, ordered by rating.
#[derive(Debug, Clone, Serialize)]
pub struct StandingsEntry {
    pub position: usize,
    pub player_id: Uuid,
    pub display_name: String,
    pub wins: i32,
    pub losses: i32,
    pub win_rate: f64,
    pub elo: i32,
    pub rank: Tier,
}

impl StandingsEntry {
    pub fn from_player(position: usize, player: &Player) -> Self {
        let played = player.wins + player.losses;
        let win_rate = if played > 0 {
            f64::from(player.wins) / f64::from(played) * 100.0
        } else {
            0.0
        };
        Self {
            position,
            player_id: player.id,
            display_name: player.display_name.clone(),
            wins: player.wins,
            losses: player.losses,
            win_rate,
            elo: player.elo,
            rank: player.rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(wins: i32, losses: i32) -> Player {
        Player {
            id: Uuid::new_v4(),
            external_id: "acct-1".to_string(),
            league_id: Uuid::new_v4(),
            display_name: "Sable".to_string(),
            elo: STARTING_ELO,
            rank: Tier::Bronze,
            wins,
            losses,
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn new_member_starts_at_base_rating() {
        let p = Player::new("acct-9".to_string(), Uuid::new_v4(), "Moss".to_string(), Utc::now());
        assert_eq!(p.elo, STARTING_ELO);
        assert_eq!(p.rank, Tier::Bronze);
        assert_eq!(p.wins, 0);
        assert_eq!(p.losses, 0);
    }

    #[test]
    fn win_rate_handles_zero_games() {
        let entry = StandingsEntry::from_player(1, &player(0, 0));
        assert_eq!(entry.win_rate, 0.0);
    }

    #[test]
    fn win_rate_is_percentage_of_games_played() {
        let entry = StandingsEntry::from_player(1, &player(3, 1));
        assert_eq!(entry.win_rate, 75.0);
    }

    #[test]
    fn join_league_dto_validation() {
        let valid = JoinLeagueDTO {
            external_id: "12345".to_string(),
            display_name: "Sable".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = JoinLeagueDTO {
            external_id: String::new(),
            display_name: "Sable".to_string(),
        };
        assert!(invalid.validate().is_err());
    }
}
