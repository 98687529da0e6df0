use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use daybook_types::Response;
use uuid::Uuid;

use crate::db::DbPool;

pub struct ResponseRepository {
    pool: DbPool,
}

impl ResponseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Total responses in the table
    pub fn count(&self) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Responses attached to one question, ordered by id
    pub fn list_by_question(&self, question_id: i64) -> Result<Vec<Response>> {
        let conn = self.pool.get()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, question_id, user_id, response_text, created_at, word_count, is_draft
                 FROM responses WHERE question_id = ? ORDER BY id",
            )
            .context("Failed to prepare responses query")?;

        let responses = stmt
            .query_map([question_id], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect responses")?;

        Ok(responses)
    }

    /// Responses whose question no longer exists. Always empty when foreign
    /// keys are enforced; the inspector reports it for databases written by
    /// the older scripts, which ran without the pragma.
    pub fn list_orphaned(&self) -> Result<Vec<Response>> {
        let conn = self.pool.get()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, question_id, user_id, response_text, created_at, word_count, is_draft
                 FROM responses r
                 WHERE NOT EXISTS (SELECT 1 FROM questions q WHERE q.id = r.question_id)
                 ORDER BY id",
            )
            .context("Failed to prepare orphan query")?;

        let responses = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect orphaned responses")?;

        Ok(responses)
    }

    /// Distinct authors, used by the account reconciliation tool
    pub fn user_ids(&self) -> Result<Vec<Uuid>> {
        let conn = self.pool.get()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT user_id FROM responses ORDER BY user_id")
            .context("Failed to prepare user id query")?;

        let ids = stmt
            .query_map([], |row| {
                let raw: String = row.get(0)?;
                Uuid::parse_str(&raw)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect user ids")?;

        Ok(ids)
    }

    /// Insert one response (tests and hand repairs)
    pub fn insert(&self, response: &Response) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO responses (id, question_id, user_id, response_text, created_at, word_count, is_draft)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                response.id,
                response.question_id,
                response.user_id.to_string(),
                &response.response_text,
                response.created_at.to_rfc3339(),
                response.word_count,
                response.is_draft as i64,
            ),
        )
        .context("Failed to insert response")?;
        Ok(())
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Response> {
        let user_id: String = row.get(2)?;
        let created_at: String = row.get(4)?;
        Ok(Response {
            id: row.get(0)?,
            question_id: row.get(1)?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
            response_text: row.get(3)?,
            created_at: created_at
                .parse::<DateTime<Utc>>()
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
            word_count: row.get(5)?,
            is_draft: row.get::<_, i64>(6)? != 0,
        })
    }
}
