use sqlx::PgConnection;
use uuid::Uuid;

use crate::api_error::ApiError;
use crate::models::League;

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<League>, ApiError> {
    let league = sqlx::query_as::<_, League>(
        "SELECT id, name, created_at FROM leagues WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(league)
}
