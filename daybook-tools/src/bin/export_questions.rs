use anyhow::{Context, Result};
use clap::Parser;
use daybook_db::config::Settings;
use daybook_db::db::repositories::QuestionRepository;
use daybook_db::db::Database;
use daybook_db::export;
use daybook_types::{ExportFormat, Scope};
use std::fs::File;
use std::io::BufWriter;

/// Question Exporter
///
/// Dumps a scope of the questions table to CSV or JSON. The JSON shape
/// matches the seed format, so an export can be re-imported with
/// seed-questions.
#[derive(Parser, Debug)]
#[command(name = "export-questions")]
#[command(about = "Export Daybook questions to CSV or JSON", long_about = None)]
struct Args {
    /// Path to the SQLite database file (overrides DATABASE_PATH)
    #[arg(short, long)]
    database: Option<String>,

    /// Output file path
    #[arg(short, long)]
    output: String,

    /// Output format: csv or json
    #[arg(short, long, default_value = "csv")]
    format: String,

    /// Restrict the export to one category
    #[arg(short, long)]
    category: Option<String>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let format = ExportFormat::parse(&args.format)
        .with_context(|| format!("Unknown export format: {}", args.format))?;
    let scope = Scope::from_category(args.category);

    println!("Daybook Question Exporter");
    println!("==========================");
    println!();

    let settings = Settings::new().context("Failed to load settings")?;
    let db_path = args.database.unwrap_or(settings.database.path);
    println!("Database: {}", db_path);
    println!("Scope: {}", scope.describe());
    println!("Format: {}", format.as_str());
    println!("Output: {}", args.output);
    println!();

    if !std::path::Path::new(&db_path).exists() {
        anyhow::bail!("Database file not found: {}", db_path);
    }
    let db = Database::new(&db_path).context("Failed to open database connection")?;
    let repo = QuestionRepository::new(db.pool.clone());

    let questions = repo.list(&scope)?;
    println!("Found {} question(s) in scope", questions.len());

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create output file: {}", args.output))?;
    let writer = BufWriter::new(file);

    match format {
        ExportFormat::Csv => export::write_csv(&questions, writer)?,
        ExportFormat::Json => export::write_json(&questions, writer)?,
    }

    println!(
        "Exported {} question(s) to {}",
        questions.len(),
        args.output
    );

    Ok(())
}
