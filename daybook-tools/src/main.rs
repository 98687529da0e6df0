use anyhow::{Context, Result};
use clap::Parser;
use daybook_db::config::Settings;
use daybook_db::db::Database;
use daybook_db::{analysis, dedup, MaintenanceError};
use daybook_types::{Scope, TextPolicy};

/// Daybook Question Deduplication Utility
///
/// This tool collapses duplicate question rows while preserving every
/// response: responses attached to a duplicate are repointed to the
/// surviving row before the duplicate is deleted, all in one transaction.
#[derive(Parser, Debug)]
#[command(name = "dedup-questions")]
#[command(about = "Remove duplicate Daybook questions, preserving responses", long_about = None)]
struct Args {
    /// Path to the SQLite database file (overrides DATABASE_PATH)
    #[arg(short, long)]
    database: Option<String>,

    /// Restrict the cleanup to one category
    #[arg(short, long)]
    category: Option<String>,

    /// Compare texts after trimming whitespace and case-folding
    /// (default is exact, byte-for-byte comparison)
    #[arg(long)]
    normalize: bool,

    /// Perform a dry run without making changes
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,
}

/// Connect to the database and validate that both tables exist
fn connect_database(path: &str) -> Result<Database> {
    println!("Connecting to database: {}", path);

    if !std::path::Path::new(path).exists() {
        anyhow::bail!("Database file not found: {}", path);
    }

    let db = Database::new(path).context("Failed to open database connection")?;

    let conn = db.connection()?;
    for table in ["questions", "responses"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                [table],
                |row| row.get::<_, i32>(0).map(|count| count > 0),
            )
            .with_context(|| format!("Failed to check for {} table", table))?;
        if !exists {
            anyhow::bail!("Database schema is invalid - {} table not found", table);
        }
    }

    println!("Database connection successful - schema validated");
    Ok(db)
}

/// Display the duplicate report before any mutation happens
fn display_report(report: &[daybook_types::DuplicateGroup]) {
    if report.is_empty() {
        println!("No duplicates found - nothing to do.");
        return;
    }

    println!("Found {} duplicate group(s):", report.len());
    for group in report {
        println!(
            "  {} occurrences: {:?} -> keep {} | \"{}\"",
            group.count,
            group.ids,
            group.canonical_id(),
            preview(&group.text),
        );
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > 60 {
        let cut: String = text.chars().take(60).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybook_db=info".into()),
        )
        .init();

    let args = Args::parse();

    let scope = Scope::from_category(args.category.clone());
    let policy = if args.normalize {
        TextPolicy::Normalized
    } else {
        TextPolicy::Exact
    };

    println!("Daybook Question Deduplication Utility");
    println!("========================================");
    println!();

    let settings = Settings::new().context("Failed to load settings")?;
    let db_path = args.database.unwrap_or(settings.database.path);

    println!("Database: {}", db_path);
    println!("Scope: {}", scope.describe());
    println!("Text policy: {}", policy.as_str());
    println!("Dry run: {}", args.dry_run);
    println!();

    let db = connect_database(&db_path)?;
    let mut conn = db.connection()?;

    // Report first; the report also decides whether the mutating pass runs
    let report = analysis::find_duplicates(&conn, &scope, policy)?;
    display_report(&report);

    if report.is_empty() || args.dry_run {
        if args.dry_run && !report.is_empty() {
            let would_delete: usize = report.iter().map(|g| g.duplicate_ids().len()).sum();
            println!();
            println!(
                "This was a dry run - {} row(s) would be deleted, no changes were made.",
                would_delete
            );
        }
        return Ok(());
    }

    if !args.yes {
        let to_delete: usize = report.iter().map(|g| g.duplicate_ids().len()).sum();
        println!();
        println!(
            "This will delete {} question row(s) and repoint their responses.",
            to_delete
        );
        println!("Do you want to continue? (y/N): ");

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read user input")?;

        let input = input.trim().to_lowercase();
        if input != "y" && input != "yes" {
            println!("Cleanup cancelled.");
            return Ok(());
        }
    }

    println!();
    println!("Running cleanup...");
    match dedup::dedup_questions(&mut conn, &scope, policy) {
        Ok(outcome) => {
            println!();
            println!("Cleanup Summary");
            println!("===============");
            println!("Duplicate groups collapsed: {}", outcome.groups_collapsed);
            println!("Question rows deleted: {}", outcome.questions_deleted);
            println!("Responses repointed: {}", outcome.responses_repointed);
            println!();
            println!("Cleanup completed successfully!");
        }
        Err(MaintenanceError::Verification {
            scope,
            distinct,
            total,
        }) => {
            // Rolled back; duplicates that survive a cleanup mean a
            // concurrent writer or a policy mismatch, so no blind retry.
            eprintln!();
            eprintln!(
                "VERIFICATION FAILED for {}: {} distinct texts across {} rows.",
                scope, distinct, total
            );
            eprintln!("All changes were rolled back. Investigate before re-running.");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Cleanup failed and was rolled back"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_db::db::Database;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn db_with_questions(rows: &[(i64, &str)]) -> Database {
        let db = Database::in_memory().expect("Failed to create in-memory database");
        db.initialize().expect("Failed to initialize database");
        let conn = db.connection().expect("Failed to get connection");
        for (id, text) in rows {
            conn.execute(
                "INSERT INTO questions (id, question_text, category) VALUES (?, ?, 'general')",
                (*id, *text),
            )
            .expect("Failed to insert question");
        }
        db
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "a".repeat(100);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 63);
        assert_eq!(preview("short"), "short");
    }

    // Property 1: after a cleanup, the scope holds one row per distinct
    // text key, whatever the input looked like
    proptest! {
        #[test]
        fn prop_dedup_leaves_distinct_texts(
            texts in proptest::collection::vec("[a-z ]{1,20}", 1..40)
        ) {
            let rows: Vec<(i64, &str)> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| (i as i64 + 1, t.as_str()))
                .collect();
            let db = db_with_questions(&rows);
            let mut conn = db.connection().expect("connection");

            dedup::dedup_questions(&mut conn, &Scope::All, TextPolicy::Exact)
                .expect("dedup");

            let remaining: Vec<String> = {
                let mut stmt = conn
                    .prepare("SELECT question_text FROM questions")
                    .expect("prepare");
                stmt.query_map([], |r| r.get(0))
                    .expect("query")
                    .collect::<Result<_, _>>()
                    .expect("collect")
            };
            let distinct: HashSet<&String> = remaining.iter().collect();
            prop_assert_eq!(distinct.len(), remaining.len());

            let expected: HashSet<&String> = texts.iter().collect();
            prop_assert_eq!(distinct.len(), expected.len());
        }

        // Property 2: the survivor of every group is the minimum id
        #[test]
        fn prop_canonical_is_minimum_id(
            texts in proptest::collection::vec("[a-z]{1,5}", 1..30)
        ) {
            let rows: Vec<(i64, &str)> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| (i as i64 + 1, t.as_str()))
                .collect();

            // Expected survivor per text: first (lowest) id
            let mut expected: std::collections::HashMap<&str, i64> =
                std::collections::HashMap::new();
            for &(id, text) in &rows {
                expected.entry(text).or_insert(id);
            }

            let db = db_with_questions(&rows);
            let mut conn = db.connection().expect("connection");
            dedup::dedup_questions(&mut conn, &Scope::All, TextPolicy::Exact)
                .expect("dedup");

            let surviving: Vec<(i64, String)> = {
                let mut stmt = conn
                    .prepare("SELECT id, question_text FROM questions")
                    .expect("prepare");
                stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
                    .expect("query")
                    .collect::<Result<_, _>>()
                    .expect("collect")
            };
            for (id, text) in surviving {
                prop_assert_eq!(expected[text.as_str()], id);
            }
        }

        // Property 3: a second run never deletes anything
        #[test]
        fn prop_dedup_is_idempotent(
            texts in proptest::collection::vec("[a-z]{1,4}", 1..25)
        ) {
            let rows: Vec<(i64, &str)> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| (i as i64 + 1, t.as_str()))
                .collect();
            let db = db_with_questions(&rows);
            let mut conn = db.connection().expect("connection");

            dedup::dedup_questions(&mut conn, &Scope::All, TextPolicy::Exact)
                .expect("first run");
            let second = dedup::dedup_questions(&mut conn, &Scope::All, TextPolicy::Exact)
                .expect("second run");

            prop_assert_eq!(second.questions_deleted, 0);
            prop_assert_eq!(second.responses_repointed, 0);
        }
    }
}
