use sqlx::PgConnection;

use crate::domain::events::DomainEvent;
use crate::store::models::Activity;

/// Appends the event to its user's activity log.
pub async fn record(conn: &mut PgConnection, event: &DomainEvent) -> sqlx::Result<()> {
    let entry = event.activity();
    sqlx::query("INSERT INTO activities (user_id, subject, event, description) VALUES ($1, $2, $3, $4)")
        .bind(event.user_id()).bind(&entry.subject).bind(&entry.event).bind(&entry.description)
        .execute(conn).await?;
    Ok(())
}

pub async fn recent(conn: &mut PgConnection, user_id: i64, limit: i64) -> sqlx::Result<Vec<Activity>> {
    sqlx::query_as::<_, Activity>("SELECT id, user_id, subject, event, description, created_at FROM activities WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2")
        .bind(user_id).bind(limit).fetch_all(conn).await
}
