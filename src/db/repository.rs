use sqlx::SqlitePool;

use crate::db::record::TaskRecord;
use crate::models::Task;

/// On-device mirror of the remote task list.
///
/// The store never originates tasks: it only holds what the last successful
/// full fetch returned.
#[derive(Clone)]
pub struct TaskStore {
    db: SqlitePool,
}

impl TaskStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn get_all(&self) -> Result<Vec<Task>, sqlx::Error> {
        let records = sqlx::query_as::<_, TaskRecord>(
            "SELECT id, title, description, assignee, address, status, scheduled_at FROM tasks ORDER BY scheduled_at, id"
        )
        .fetch_all(&self.db)
        .await?;

        Ok(records.into_iter().map(Task::from).collect())
    }

    /// Clears the table and inserts `tasks` in a single transaction.
    pub async fn replace_all(&self, tasks: &[Task]) -> Result<(), sqlx::Error> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM tasks")
            .execute(&mut *tx)
            .await?;

        for record in tasks.iter().map(TaskRecord::from) {
            insert_or_replace(&mut tx, &record).await?;
        }

        tx.commit().await
    }

    pub async fn upsert(&self, task: &Task) -> Result<(), sqlx::Error> {
        let mut conn = self.db.acquire().await?;
        insert_or_replace(&mut conn, &TaskRecord::from(task)).await
    }

    pub async fn delete(&self, task: &Task) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task.id)
            .execute(&self.db)
            .await?
            .rows_affected();

        Ok(result > 0)
    }

    pub async fn clear(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks")
            .execute(&self.db)
            .await?
            .rows_affected();

        Ok(result)
    }
}

async fn insert_or_replace(
    conn: &mut sqlx::SqliteConnection,
    record: &TaskRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT OR REPLACE INTO tasks (id, title, description, assignee, address, status, scheduled_at) VALUES (?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(record.id)
    .bind(&record.title)
    .bind(&record.description)
    .bind(&record.assignee)
    .bind(&record.address)
    .bind(&record.status)
    .bind(record.scheduled_at)
    .execute(conn)
    .await?;

    Ok(())
}
