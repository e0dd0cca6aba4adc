//! Rank tiers derived from ELO, and the league-scoped Grandmaster rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Players at or above this rating compete for the single Grandmaster slot.
pub const GRANDMASTER_FLOOR: i32 = 2200;

/// Named rating band. `Grandmaster` is never assigned by [`Tier::classify`]
/// alone; it is granted to at most one player per league by arbitration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, sqlx::Type)]
#[sqlx(type_name = "player_rank", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Diamond,
    Master,
    Grandmaster,
}

impl Tier {
    /// Map a rating to its base tier. Ratings in the Grandmaster band
    /// classify as `Grandmaster` here; arbitration decides who keeps it.
    pub fn classify(elo: i32) -> Tier {
        match elo {
            i32::MIN..=1399 => Tier::Bronze,
            1400..=1599 => Tier::Silver,
            1600..=1799 => Tier::Gold,
            1800..=1999 => Tier::Diamond,
            2000..=2199 => Tier::Master,
            _ => Tier::Grandmaster,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Bronze => write!(f, "Bronze"),
            Tier::Silver => write!(f, "Silver"),
            Tier::Gold => write!(f, "Gold"),
            Tier::Diamond => write!(f, "Diamond"),
            Tier::Master => write!(f, "Master"),
            Tier::Grandmaster => write!(f, "Grandmaster"),
        }
    }
}

/// One player in the Grandmaster band, as loaded for arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub id: Uuid,
    pub elo: i32,
    pub joined_at: DateTime<Utc>,
}

/// Tier each candidate must hold after arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierAssignment {
    pub id: Uuid,
    pub tier: Tier,
}

/// Decide the single Grandmaster for a league.
///
/// Exactly the highest-rated candidate holds the title; every other
/// candidate is forced to `Master` regardless of rating. Ties break on
/// highest elo, then earliest join date, then smallest id, so the outcome
/// does not depend on query order.
pub fn arbitrate_grandmaster(candidates: &[Candidate]) -> Vec<TierAssignment> {
    let mut ordered: Vec<&Candidate> = candidates.iter().collect();
    ordered.sort_by(|a, b| {
        b.elo
            .cmp(&a.elo)
            .then_with(|| a.joined_at.cmp(&b.joined_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    ordered
        .iter()
        .enumerate()
        .map(|(i, c)| TierAssignment {
            id: c.id,
            tier: if i == 0 { Tier::Grandmaster } else { Tier::Master },
        })
        .collect()
}
