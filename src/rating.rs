//! ELO rating math. Pure functions, no storage access.

/// How much a single match moves a rating.
pub const K_FACTOR: f64 = 32.0;

/// Rating assigned to every player when they join a league.
pub const STARTING_ELO: i32 = 1000;

/// Ratings are never persisted below this value.
pub const ELO_FLOOR: i32 = 1;

/// If the loser outrated the winner by more than this, the upset bonus applies.
pub const UPSET_THRESHOLD: i32 = 100;

const UPSET_MULTIPLIER: f64 = 1.5;

/// Probability that the winner was expected to win, per the logistic ELO model.
pub fn expected_score(winner_elo: i32, loser_elo: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf((loser_elo - winner_elo) as f64 / 400.0))
}

/// Rating delta for a decided match. Always non-negative; the winner gains
/// the delta, the loser gives it up (down to [`ELO_FLOOR`]).
pub fn elo_delta(winner_elo: i32, loser_elo: i32) -> i32 {
    let expected = expected_score(winner_elo, loser_elo);
    let mut delta = K_FACTOR * (1.0 - expected);
    if loser_elo - winner_elo > UPSET_THRESHOLD {
        delta *= UPSET_MULTIPLIER;
    }
    delta.round() as i32
}

/// New ratings after a decided match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingUpdate {
    pub delta: i32,
    pub winner_elo: i32,
    pub loser_elo: i32,
}

/// Apply a match outcome to the two current ratings.
pub fn apply(winner_elo: i32, loser_elo: i32) -> RatingUpdate {
    let delta = elo_delta(winner_elo, loser_elo);
    RatingUpdate {
        delta,
        winner_elo: winner_elo + delta,
        loser_elo: (loser_elo - delta).max(ELO_FLOOR),
    }
}
