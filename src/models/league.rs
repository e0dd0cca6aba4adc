use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A league is an opaque scope for players and matches. Its lifecycle is
/// managed elsewhere; this service only resolves it for display data.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct League {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
