use anyhow::{anyhow, Context, Result};
use clap::Parser;
use daybook_db::config::Settings;
use daybook_db::db::repositories::ResponseRepository;
use daybook_db::db::Database;
use daybook_db::remote::RemoteClient;
use serde_json::json;
use std::collections::HashSet;

/// Account Reconciliation Tool
///
/// Compares the account rows in the hosted backend against the local users
/// who actually authored responses, deletes remote rows with no local
/// counterpart, and inserts rows for local users the backend is missing.
/// The backend is opaque; credentials come from the environment
/// (REMOTE_BASE_URL, REMOTE_API_KEY, REMOTE_EMAIL, REMOTE_PASSWORD).
#[derive(Parser, Debug)]
#[command(name = "sync-accounts")]
#[command(about = "Reconcile hosted account rows with local Daybook users", long_about = None)]
struct Args {
    /// Path to the SQLite database file (overrides DATABASE_PATH)
    #[arg(short, long)]
    database: Option<String>,

    /// Remote table holding the account rows
    #[arg(short, long, default_value = "accounts")]
    table: String,

    /// Perform a dry run without touching the backend
    #[arg(short = 'n', long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybook_db=info".into()),
        )
        .init();

    let args = Args::parse();

    println!("Daybook Account Reconciliation");
    println!("===============================");
    println!();

    let settings = Settings::new().context("Failed to load settings")?;
    let db_path = args.database.unwrap_or(settings.database.path);
    println!("Database: {}", db_path);
    println!("Remote table: {}", args.table);
    println!("Dry run: {}", args.dry_run);
    println!();

    // Local side: the distinct authors in the responses table
    if !std::path::Path::new(&db_path).exists() {
        anyhow::bail!("Database file not found: {}", db_path);
    }
    let db = Database::new(&db_path).context("Failed to open database connection")?;
    let local_users: HashSet<String> = ResponseRepository::new(db.pool.clone())
        .user_ids()?
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    println!("Local users with responses: {}", local_users.len());

    // Remote side
    let client = RemoteClient::from_config(&settings.remote)?;
    let email = settings
        .remote
        .email
        .as_deref()
        .ok_or_else(|| anyhow!("REMOTE_EMAIL is not configured"))?;
    let password = settings
        .remote
        .password
        .as_deref()
        .ok_or_else(|| anyhow!("REMOTE_PASSWORD is not configured"))?;

    let session = client.sign_in(email, password).await?;
    println!("Signed in to the account backend");

    let rows = client.list_rows(&session, &args.table).await?;
    println!("Remote account rows: {}", rows.len());
    println!();

    let remote_users: HashSet<String> = rows
        .iter()
        .filter_map(|row| row.get("user_id").and_then(|v| v.as_str()))
        .map(str::to_string)
        .collect();

    let orphaned: Vec<&String> = remote_users.difference(&local_users).collect();
    let missing: Vec<&String> = local_users.difference(&remote_users).collect();

    println!("Orphaned remote rows (no local user): {}", orphaned.len());
    println!("Missing remote rows (local user only): {}", missing.len());

    if orphaned.is_empty() && missing.is_empty() {
        println!();
        println!("Backend and local database already agree - nothing to do.");
        return Ok(());
    }

    if args.dry_run {
        for user_id in &orphaned {
            println!("  would delete remote row for {}", user_id);
        }
        for user_id in &missing {
            println!("  would insert remote row for {}", user_id);
        }
        println!();
        println!("This was a dry run - no changes were made to the backend.");
        return Ok(());
    }

    let mut deleted = 0;
    for user_id in &orphaned {
        // Remote rows are keyed by user_id; id lookup happens backend-side
        let row_id = rows
            .iter()
            .find(|row| row.get("user_id").and_then(|v| v.as_str()) == Some(user_id.as_str()))
            .and_then(|row| row.get("id"))
            .map(|v| v.to_string().trim_matches('"').to_string())
            .ok_or_else(|| anyhow!("remote row for {} has no id field", user_id))?;
        client.delete_row(&session, &args.table, &row_id).await?;
        deleted += 1;
    }

    let mut inserted = 0;
    for user_id in &missing {
        client
            .insert_row(&session, &args.table, &json!({ "user_id": user_id }))
            .await?;
        inserted += 1;
    }

    println!();
    println!("Reconciliation Summary");
    println!("======================");
    println!("Remote rows deleted: {}", deleted);
    println!("Remote rows inserted: {}", inserted);
    println!();
    println!("Reconciliation completed successfully!");

    Ok(())
}
