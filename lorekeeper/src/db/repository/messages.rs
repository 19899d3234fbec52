use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::{LorekeeperError, Result};
use crate::models::Message;

pub struct MessageRepository;

impl MessageRepository {
    pub async fn create(conn: &Connection, message: &Message) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO messages (id, session_id, role, content, metadata, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                message.id.clone(),
                message.session_id.clone(),
                message.role.to_string(),
                message.content.clone(),
                serde_json::to_string(&message.metadata)?,
                message.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn list_by_session(conn: &Connection, session_id: &str) -> Result<Vec<Message>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, session_id, role, content, metadata, created_at
                FROM messages
                WHERE session_id = ?1
                ORDER BY created_at ASC
                "#,
                params![session_id],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_message(&row)?);
        }
        Ok(results)
    }

    pub async fn recent(conn: &Connection, session_id: &str, limit: u32) -> Result<Vec<Message>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, session_id, role, content, metadata, created_at
                FROM messages
                WHERE session_id = ?1
                ORDER BY created_at DESC
                LIMIT ?2
                "#,
                params![session_id, limit],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_message(&row)?);
        }
        Ok(results)
    }

    fn row_to_message(row: &libsql::Row) -> Result<Message> {
        Ok(Message {
            id: row.get(0)?,
            session_id: row.get(1)?,
            role: row
                .get::<String>(2)?
                .parse()
                .map_err(LorekeeperError::Internal)?,
            content: row.get(3)?,
            metadata: serde_json::from_str(&row.get::<String>(4)?).unwrap_or_default(),
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(5)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
