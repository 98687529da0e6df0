use anyhow::{Context, Result};
use clap::Parser;
use daybook_db::config::Settings;
use daybook_db::db::repositories::QuestionRepository;
use daybook_db::db::Database;
use daybook_db::export;
use daybook_types::TextPolicy;
use std::fs::File;
use std::io::BufReader;

/// Question Seeder
///
/// Loads questions from a JSON seed file into the database, idempotently:
/// records whose text already exists in the same category are skipped, so
/// re-running a seed pass (the original source of all the duplicates) is
/// harmless.
#[derive(Parser, Debug)]
#[command(name = "seed-questions")]
#[command(about = "Idempotently seed Daybook questions from a JSON file", long_about = None)]
struct Args {
    /// Path to the JSON seed file
    #[arg(short, long)]
    seed: String,

    /// Path to the SQLite database file (overrides DATABASE_PATH)
    #[arg(short, long)]
    database: Option<String>,

    /// Compare texts after trimming whitespace and case-folding when
    /// deciding whether a record already exists
    #[arg(long)]
    normalize: bool,

    /// Perform a dry run without making changes
    #[arg(short = 'n', long)]
    dry_run: bool,
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
    let policy = if args.normalize {
        TextPolicy::Normalized
    } else {
        TextPolicy::Exact
    };

    println!("Daybook Question Seeder");
    println!("========================");
    println!();

    let settings = Settings::new().context("Failed to load settings")?;
    let db_path = args.database.unwrap_or(settings.database.path);
    println!("Database: {}", db_path);
    println!("Seed file: {}", args.seed);
    println!("Text policy: {}", policy.as_str());
    println!("Dry run: {}", args.dry_run);
    println!();

    let seed_file = File::open(&args.seed)
        .with_context(|| format!("Failed to open seed file: {}", args.seed))?;
    let records = export::load_seed(BufReader::new(seed_file))?;
    println!("Loaded {} seed record(s)", records.len());

    if records.is_empty() {
        println!("Seed file is empty - nothing to do.");
        return Ok(());
    }

    let db = Database::new(&db_path).context("Failed to open database connection")?;
    db.initialize()
        .context("Failed to initialize database schema")?;

    let repo = QuestionRepository::new(db.pool.clone());
    let outcome = repo.seed_records(&records, policy, args.dry_run)?;

    println!();
    println!("Seeding Summary");
    println!("===============");
    println!("Inserted: {}", outcome.inserted);
    println!("Skipped (text already present): {}", outcome.skipped_existing);
    println!("Skipped (id already taken): {}", outcome.skipped_id_conflict);
    println!();
    if args.dry_run {
        println!("This was a dry run - no changes were made to the database.");
    } else {
        println!("Seeding completed successfully!");
    }

    Ok(())
}
