// Storage layer: sqlx query modules over the match, player and league tables.
// Functions take `&mut PgConnection` so they compose under one transaction.
pub mod leagues;
pub mod matches;
pub mod players;
