use anyhow::{Context, Result};
use clap::Parser;
use daybook_db::analysis;
use daybook_db::config::Settings;
use daybook_db::db::repositories::QuestionRepository;
use daybook_db::db::Database;
use daybook_types::{Scope, TextPolicy};

/// Duplicate Question Analyzer
///
/// Read-only report of duplicate question texts: per distinct text, the
/// occurrence count and the ids sharing it, sorted by descending count.
/// This replaces the pile of near-identical per-category scripts with one
/// tool parameterized by scope.
#[derive(Parser, Debug)]
#[command(name = "analyze-duplicates")]
#[command(about = "Report duplicate Daybook questions without changing anything", long_about = None)]
struct Args {
    /// Path to the SQLite database file (overrides DATABASE_PATH)
    #[arg(short, long)]
    database: Option<String>,

    /// Restrict the report to one category; omit for all categories
    #[arg(short, long)]
    category: Option<String>,

    /// Compare texts after trimming whitespace and case-folding
    #[arg(long)]
    normalize: bool,

    /// Also break the report down per category
    #[arg(long)]
    per_category: bool,
}

fn report_scope(db: &Database, scope: &Scope, policy: TextPolicy) -> Result<usize> {
    let repo = QuestionRepository::new(db.pool.clone());
    let total = repo.count(scope)?;
    let distinct = repo.count_distinct_text(scope, policy)?;

    let conn = db.connection()?;
    let groups = analysis::find_duplicates(&conn, scope, policy)?;

    println!("Scope: {}", scope.describe());
    println!("  Rows: {} | Distinct texts: {}", total, distinct);

    if groups.is_empty() {
        println!("  No duplicates.");
    } else {
        for group in &groups {
            println!("  {}x ids {:?}: {}", group.count, group.ids, group.text);
        }
    }
    println!();

    Ok(groups.len())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let policy = if args.normalize {
        TextPolicy::Normalized
    } else {
        TextPolicy::Exact
    };

    println!("Daybook Duplicate Question Analyzer");
    println!("====================================");
    println!();

    let settings = Settings::new().context("Failed to load settings")?;
    let db_path = args.database.unwrap_or(settings.database.path);
    println!("Database: {}", db_path);
    println!("Text policy: {}", policy.as_str());
    println!();

    if !std::path::Path::new(&db_path).exists() {
        anyhow::bail!("Database file not found: {}", db_path);
    }
    let db = Database::new(&db_path).context("Failed to open database connection")?;

    let mut group_total = 0;

    if args.per_category && args.category.is_none() {
        let repo = QuestionRepository::new(db.pool.clone());
        for category in repo.categories()? {
            group_total += report_scope(&db, &Scope::Category(category), policy)?;
        }
    } else {
        let scope = Scope::from_category(args.category);
        group_total += report_scope(&db, &scope, policy)?;
    }

    if group_total == 0 {
        println!("Database is clean - no cleanup needed.");
    } else {
        println!(
            "{} duplicate group(s) found. Run dedup-questions to collapse them.",
            group_total
        );
    }

    Ok(())
}
