//! Deduplication with response repointing.
//!
//! The one behavior the old one-off scripts kept reimplementing: collapse
//! questions that share the same text, keep the oldest row, and move every
//! dependent response onto the survivor before the duplicates are deleted.
//! Repoint, delete, and the post-condition check all run inside a single
//! transaction; any failure rolls the whole batch back.

use daybook_types::{Scope, TextPolicy};
use rusqlite::Connection;
use std::collections::HashSet;

use crate::analysis::{group_duplicates, scoped_rows};
use crate::error::MaintenanceError;

/// Rows affected by one dedup run, for the operator's audit output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DedupOutcome {
    /// Duplicate groups that were collapsed
    pub groups_collapsed: usize,
    /// Non-canonical question rows deleted
    pub questions_deleted: usize,
    /// Responses moved onto a canonical question
    pub responses_repointed: usize,
}

impl DedupOutcome {
    pub fn is_noop(&self) -> bool {
        self.questions_deleted == 0
    }
}

/// Collapse duplicate questions in `scope` under `policy`.
///
/// For each group of rows sharing a text key, the row with the minimum id
/// survives (the oldest insert, most likely to already carry responses).
/// Responses pointing at any other row in the group are repointed to the
/// survivor, then the non-canonical rows are deleted. Before commit the
/// scope is re-read and `count(distinct key) == count(rows)` is asserted;
/// a mismatch rolls back and returns [`MaintenanceError::Verification`].
///
/// Running this twice in a row is idempotent: the second run deletes zero
/// rows. Responses are never deleted.
pub fn dedup_questions(
    conn: &mut Connection,
    scope: &Scope,
    policy: TextPolicy,
) -> Result<DedupOutcome, MaintenanceError> {
    let tx = conn
        .transaction()
        .map_err(MaintenanceError::from_sqlite)?;

    let rows = scoped_rows(&tx, scope).map_err(MaintenanceError::from_sqlite)?;
    let groups = group_duplicates(&rows, policy);

    let mut outcome = DedupOutcome {
        groups_collapsed: groups.len(),
        ..Default::default()
    };

    for group in &groups {
        let canonical = group.canonical_id();
        for &duplicate in group.duplicate_ids() {
            // Repoint before delete so no response ever dangles, even
            // transiently, inside the transaction.
            let repointed = tx
                .execute(
                    "UPDATE responses SET question_id = ? WHERE question_id = ?",
                    (canonical, duplicate),
                )
                .map_err(MaintenanceError::from_sqlite)?;
            outcome.responses_repointed += repointed;

            let deleted = tx
                .execute("DELETE FROM questions WHERE id = ?", [duplicate])
                .map_err(MaintenanceError::from_sqlite)?;
            outcome.questions_deleted += deleted;
        }
    }

    // Post-condition: the scope must now be duplicate-free under the same
    // policy the grouping used. A mismatch means a concurrent writer or a
    // normalization bug, not a transient fault; the operator investigates.
    let remaining = scoped_rows(&tx, scope).map_err(MaintenanceError::from_sqlite)?;
    let distinct: HashSet<String> = remaining
        .iter()
        .map(|q| policy.key(&q.question_text))
        .collect();
    if distinct.len() != remaining.len() {
        // Dropping the transaction without commit rolls everything back
        return Err(MaintenanceError::Verification {
            scope: scope.describe(),
            distinct: distinct.len(),
            total: remaining.len(),
        });
    }

    tx.commit().map_err(MaintenanceError::from_sqlite)?;

    tracing::info!(
        scope = %scope.describe(),
        policy = policy.as_str(),
        groups = outcome.groups_collapsed,
        deleted = outcome.questions_deleted,
        repointed = outcome.responses_repointed,
        "dedup committed"
    );

    Ok(outcome)
}
