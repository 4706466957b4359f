use chrono::Utc;
use sqlx::SqlitePool;

pub async fn load_token(db: &SqlitePool) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT token FROM session WHERE id = 1")
        .fetch_optional(db)
        .await
}

pub async fn save_token(db: &SqlitePool, token: &str) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO session (id, token, saved_at)
        VALUES (1, ?1, ?2)
        ON CONFLICT(id) DO UPDATE SET token = excluded.token, saved_at = excluded.saved_at
        "#,
    )
    .bind(token)
    .bind(now)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn clear_token(db: &SqlitePool) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM session")
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
