use anyhow::{Context, Result};
use daybook_types::{Question, Scope, SeedRecord, TextPolicy};
use std::collections::HashSet;

use crate::db::DbPool;

pub struct QuestionRepository {
    pool: DbPool,
}

/// Counts reported by a seeding pass, for the operator summary.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    pub inserted: usize,
    /// Records skipped because the same text already exists in the category.
    pub skipped_existing: usize,
    /// Records skipped because their id is already taken by a different row.
    pub skipped_id_conflict: usize,
}

impl QuestionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// List questions in a scope, ordered by id
    pub fn list(&self, scope: &Scope) -> Result<Vec<Question>> {
        let conn = self.pool.get()?;
        let (sql, params): (&str, Vec<String>) = match scope {
            Scope::All => (
                "SELECT id, question_text, category FROM questions ORDER BY id",
                Vec::new(),
            ),
            Scope::Category(c) => (
                "SELECT id, question_text, category FROM questions WHERE category = ? ORDER BY id",
                vec![c.clone()],
            ),
        };

        let mut stmt = conn.prepare(sql).context("Failed to prepare questions query")?;
        let questions = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                Ok(Question {
                    id: row.get(0)?,
                    question_text: row.get(1)?,
                    category: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect questions")?;

        Ok(questions)
    }

    /// Count rows in a scope
    pub fn count(&self, scope: &Scope) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = match scope {
            Scope::All => {
                conn.query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?
            }
            Scope::Category(c) => conn.query_row(
                "SELECT COUNT(*) FROM questions WHERE category = ?",
                [c],
                |row| row.get(0),
            )?,
        };
        Ok(count as usize)
    }

    /// Count distinct text keys in a scope under a normalization policy.
    /// Computed in Rust rather than SQL so both policies share one code path.
    pub fn count_distinct_text(&self, scope: &Scope, policy: TextPolicy) -> Result<usize> {
        let questions = self.list(scope)?;
        let keys: HashSet<String> = questions
            .iter()
            .map(|q| policy.key(&q.question_text))
            .collect();
        Ok(keys.len())
    }

    /// Distinct category labels, for scope validation and reports
    pub fn categories(&self) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT category FROM questions ORDER BY category")
            .context("Failed to prepare categories query")?;
        let categories = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect categories")?;
        Ok(categories)
    }

    /// Insert one question with an explicit id (tests and hand repairs)
    pub fn insert(&self, question: &Question) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO questions (id, question_text, category) VALUES (?, ?, ?)",
            (question.id, &question.question_text, &question.category),
        )
        .context("Failed to insert question")?;
        Ok(())
    }

    /// Seed questions from JSON records, idempotently.
    ///
    /// The original bulk loader was re-run without this guard, which is how
    /// the duplicates got in. A record is skipped when its text (under
    /// `policy`) already exists in the same category, or when its id is
    /// taken by a different row.
    pub fn seed_records(
        &self,
        records: &[SeedRecord],
        policy: TextPolicy,
        dry_run: bool,
    ) -> Result<SeedOutcome> {
        let conn = self.pool.get()?;
        let mut outcome = SeedOutcome::default();

        // Existing text keys per (category, key)
        let mut existing: HashSet<(String, String)> = HashSet::new();
        {
            let mut stmt = conn
                .prepare("SELECT question_text, category FROM questions")
                .context("Failed to prepare existing-text query")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            for (text, category) in rows {
                existing.insert((category, policy.key(&text)));
            }
        }

        for record in records {
            let key = (record.category.clone(), policy.key(&record.question));
            if existing.contains(&key) {
                outcome.skipped_existing += 1;
                continue;
            }

            if dry_run {
                existing.insert(key);
                outcome.inserted += 1;
                continue;
            }

            let affected = conn
                .execute(
                    "INSERT OR IGNORE INTO questions (id, question_text, category) VALUES (?, ?, ?)",
                    (record.id, &record.question, &record.category),
                )
                .with_context(|| format!("Failed to seed question {}", record.id))?;

            if affected == 0 {
                outcome.skipped_id_conflict += 1;
            } else {
                existing.insert(key);
                outcome.inserted += 1;
            }
        }

        tracing::info!(
            inserted = outcome.inserted,
            skipped_existing = outcome.skipped_existing,
            skipped_id_conflict = outcome.skipped_id_conflict,
            "seed pass finished"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_test_db() -> Result<Database> {
        let db = Database::in_memory()?;
        db.initialize()?;
        Ok(db)
    }

    fn record(id: i64, question: &str, category: &str) -> SeedRecord {
        SeedRecord {
            id,
            question: question.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_list_scoped_by_category() -> Result<()> {
        let db = setup_test_db()?;
        db.seed_test_data()?;
        let repo = QuestionRepository::new(db.pool.clone());

        let all = repo.list(&Scope::All)?;
        assert_eq!(all.len(), 5);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id), "ordered by id");

        let dating = repo.list(&Scope::Category("dating".to_string()))?;
        assert_eq!(dating.len(), 2);
        assert!(dating.iter().all(|q| q.category == "dating"));

        Ok(())
    }

    #[test]
    fn test_empty_scope_is_empty_success() -> Result<()> {
        let db = setup_test_db()?;
        let repo = QuestionRepository::new(db.pool.clone());

        assert!(repo.list(&Scope::All)?.is_empty());
        assert_eq!(repo.count(&Scope::Category("missing".to_string()))?, 0);

        Ok(())
    }

    #[test]
    fn test_distinct_text_counts_follow_policy() -> Result<()> {
        let db = setup_test_db()?;
        db.seed_test_data()?;
        let repo = QuestionRepository::new(db.pool.clone());

        let scope = Scope::Category("philosophy".to_string());
        // 'What is courage?' vs 'what is courage?  ' differ only by case
        // and trailing whitespace
        assert_eq!(repo.count_distinct_text(&scope, TextPolicy::Exact)?, 2);
        assert_eq!(repo.count_distinct_text(&scope, TextPolicy::Normalized)?, 1);

        Ok(())
    }

    #[test]
    fn test_seed_records_is_idempotent() -> Result<()> {
        let db = setup_test_db()?;
        let repo = QuestionRepository::new(db.pool.clone());

        let records = vec![
            record(1, "How do you approach first dates?", "dating"),
            record(2, "What is courage?", "philosophy"),
        ];

        let first = repo.seed_records(&records, TextPolicy::Normalized, false)?;
        assert_eq!(first.inserted, 2);

        let second = repo.seed_records(&records, TextPolicy::Normalized, false)?;
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped_existing, 2);
        assert_eq!(repo.count(&Scope::All)?, 2);

        Ok(())
    }

    #[test]
    fn test_seed_records_skips_normalized_duplicates() -> Result<()> {
        let db = setup_test_db()?;
        let repo = QuestionRepository::new(db.pool.clone());

        let records = vec![
            record(1, "What is courage?", "philosophy"),
            record(2, "  what is COURAGE?", "philosophy"),
            // Same text, different category: allowed
            record(3, "What is courage?", "dating"),
        ];

        let outcome = repo.seed_records(&records, TextPolicy::Normalized, false)?;
        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.skipped_existing, 1);

        Ok(())
    }

    #[test]
    fn test_seed_records_reports_id_conflicts() -> Result<()> {
        let db = setup_test_db()?;
        let repo = QuestionRepository::new(db.pool.clone());

        repo.insert(&Question {
            id: 1,
            question_text: "What does home mean to you?".to_string(),
            category: "identity".to_string(),
        })?;

        let outcome = repo.seed_records(
            &[record(1, "A different question", "identity")],
            TextPolicy::Exact,
            false,
        )?;
        assert_eq!(outcome.inserted, 0);
        assert_eq!(outcome.skipped_id_conflict, 1);

        Ok(())
    }

    #[test]
    fn test_seed_dry_run_writes_nothing() -> Result<()> {
        let db = setup_test_db()?;
        let repo = QuestionRepository::new(db.pool.clone());

        let outcome = repo.seed_records(
            &[record(1, "What is courage?", "philosophy")],
            TextPolicy::Exact,
            true,
        )?;
        assert_eq!(outcome.inserted, 1);
        assert_eq!(repo.count(&Scope::All)?, 0);

        Ok(())
    }
}
