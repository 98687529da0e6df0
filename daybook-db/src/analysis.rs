//! Read-only duplicate analysis over the questions table.
//!
//! Pure reporting: used to decide whether the mutating cleanup needs to run
//! at all, and for before/after statistics. Never writes.

use anyhow::{Context, Result};
use daybook_types::{DuplicateGroup, Question, Scope, TextPolicy};
use rusqlite::Connection;
use std::collections::HashMap;

/// Load the questions in a scope, ordered by id.
///
/// Takes a bare `Connection` so the dedup transaction can reuse it against
/// an open `Transaction` (which derefs to `Connection`).
pub(crate) fn scoped_rows(conn: &Connection, scope: &Scope) -> rusqlite::Result<Vec<Question>> {
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

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok(Question {
                id: row.get(0)?,
                question_text: row.get(1)?,
                category: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Group questions sharing a text key under `policy`.
///
/// Only groups of size > 1 are returned. Ids within a group are ascending
/// (so index 0 is the canonical row); groups are sorted by descending
/// occurrence count, ties broken by text for a stable report.
pub fn group_duplicates(questions: &[Question], policy: TextPolicy) -> Vec<DuplicateGroup> {
    let mut by_key: HashMap<String, (String, Vec<i64>)> = HashMap::new();

    for q in questions {
        let key = policy.key(&q.question_text);
        let entry = by_key
            .entry(key)
            .or_insert_with(|| (q.question_text.clone(), Vec::new()));
        entry.1.push(q.id);
    }

    let mut groups: Vec<DuplicateGroup> = by_key
        .into_values()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(text, mut ids)| {
            ids.sort_unstable();
            DuplicateGroup {
                count: ids.len(),
                text,
                ids,
            }
        })
        .collect();

    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.text.cmp(&b.text)));
    groups
}

/// Report every duplicate group in a scope. Zero duplicates is an empty
/// vector, not an error.
pub fn find_duplicates(
    conn: &Connection,
    scope: &Scope,
    policy: TextPolicy,
) -> Result<Vec<DuplicateGroup>> {
    let rows = scoped_rows(conn, scope).context("Failed to load questions for analysis")?;
    Ok(group_duplicates(&rows, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn question(id: i64, text: &str, category: &str) -> Question {
        Question {
            id,
            question_text: text.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_no_duplicates_yields_empty_report() {
        let rows = vec![
            question(1, "What is courage?", "philosophy"),
            question(2, "What does home mean to you?", "identity"),
        ];
        assert!(group_duplicates(&rows, TextPolicy::Exact).is_empty());
        assert!(group_duplicates(&[], TextPolicy::Exact).is_empty());
    }

    #[test]
    fn test_groups_sorted_by_descending_count() {
        let rows = vec![
            question(1, "A", "x"),
            question(2, "A", "x"),
            question(3, "B", "x"),
            question(4, "B", "x"),
            question(5, "B", "x"),
            question(6, "C", "x"),
        ];
        let groups = group_duplicates(&rows, TextPolicy::Exact);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].text, "B");
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[1].text, "A");
        assert_eq!(groups[1].count, 2);
    }

    #[test]
    fn test_ids_ascending_within_group() {
        let rows = vec![
            question(9, "A", "x"),
            question(1, "A", "x"),
            question(5, "A", "x"),
        ];
        let groups = group_duplicates(&rows, TextPolicy::Exact);
        assert_eq!(groups[0].ids, vec![1, 5, 9]);
        assert_eq!(groups[0].canonical_id(), 1);
    }

    #[test]
    fn test_policy_changes_grouping() {
        let rows = vec![
            question(1, "What is courage?", "philosophy"),
            question(2, "  what is COURAGE?", "philosophy"),
        ];
        assert!(group_duplicates(&rows, TextPolicy::Exact).is_empty());
        let normalized = group_duplicates(&rows, TextPolicy::Normalized);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].ids, vec![1, 2]);
    }

    #[test]
    fn test_find_duplicates_respects_scope() -> Result<()> {
        let db = Database::in_memory()?;
        db.initialize()?;
        db.seed_test_data()?;
        let conn = db.connection()?;

        let dating = find_duplicates(
            &conn,
            &Scope::Category("dating".to_string()),
            TextPolicy::Exact,
        )?;
        assert_eq!(dating.len(), 1);
        assert_eq!(dating[0].ids, vec![1, 5]);

        // The philosophy pair only collapses under normalization
        let philosophy_exact = find_duplicates(
            &conn,
            &Scope::Category("philosophy".to_string()),
            TextPolicy::Exact,
        )?;
        assert!(philosophy_exact.is_empty());

        let all_normalized = find_duplicates(&conn, &Scope::All, TextPolicy::Normalized)?;
        assert_eq!(all_normalized.len(), 2);

        Ok(())
    }
}
