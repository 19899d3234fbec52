use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::Session;

pub struct SessionRepository;

impl SessionRepository {
    pub async fn create(conn: &Connection, session: &Session) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO sessions (id, title, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                session.id.clone(),
                session.title.clone(),
                session.created_at.to_rfc3339(),
                session.updated_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Session>> {
        let mut rows = conn
            .query(
                "SELECT id, title, created_at, updated_at FROM sessions WHERE id = ?1",
                params![id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_session(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list(conn: &Connection) -> Result<Vec<Session>> {
        let mut rows = conn
            .query(
                "SELECT id, title, created_at, updated_at FROM sessions ORDER BY updated_at DESC",
                (),
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_session(&row)?);
        }
        Ok(results)
    }

    pub async fn update_title(conn: &Connection, id: &str, title: &str) -> Result<bool> {
        let affected = conn
            .execute(
                "UPDATE sessions SET title = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, title, Utc::now().to_rfc3339()],
            )
            .await?;

        Ok(affected > 0)
    }

    /// Bump `updated_at`, marking the session as recently active.
    pub async fn touch(conn: &Connection, id: &str) -> Result<()> {
        conn.execute(
            "UPDATE sessions SET updated_at = ?2 WHERE id = ?1",
            params![id, Utc::now().to_rfc3339()],
        )
        .await?;

        Ok(())
    }

    pub async fn delete(conn: &Connection, id: &str) -> Result<bool> {
        // Messages are removed explicitly: PRAGMA foreign_keys is off by
        // default in SQLite, so the FK cascade cannot be relied upon.
        conn.execute("DELETE FROM messages WHERE session_id = ?1", params![id])
            .await?;

        let affected = conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])
            .await?;

        Ok(affected > 0)
    }

    pub async fn exists(conn: &Connection, id: &str) -> Result<bool> {
        let mut rows = conn
            .query("SELECT 1 FROM sessions WHERE id = ?1", params![id])
            .await?;

        Ok(rows.next().await?.is_some())
    }

    fn row_to_session(row: &libsql::Row) -> Result<Session> {
        Ok(Session {
            id: row.get(0)?,
            title: row.get(1)?,
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(2)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            updated_at: DateTime::parse_from_rfc3339(&row.get::<String>(3)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
