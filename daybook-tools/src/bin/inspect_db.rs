use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

/// Database Inspector
///
/// Diagnostic report over a Daybook database: table and index presence,
/// column layout, record counts, and the referential-integrity check the
/// old one-off scripts used to eyeball by hand (responses pointing at a
/// question that no longer exists).
#[derive(Parser, Debug)]
#[command(name = "inspect-db")]
#[command(about = "Inspect Daybook database schema and integrity", long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value = "./daybook.db")]
    database: String,
}

#[derive(Debug)]
struct ColumnInfo {
    name: String,
    type_name: String,
    not_null: bool,
    pk: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Daybook Database Inspector");
    println!("===========================");
    println!();
    println!("Database: {}", args.database);
    println!();

    if !std::path::Path::new(&args.database).exists() {
        println!("Database file not found: {}", args.database);
        return Ok(());
    }

    let conn = Connection::open(&args.database)
        .context("Failed to open database connection")?;

    println!("Database file exists and is accessible");
    println!();

    let required_tables = ["questions", "responses"];

    println!("Checking for required tables:");
    println!("-----------------------------");

    let mut all_tables_exist = true;
    for table_name in &required_tables {
        let exists = check_table_exists(&conn, table_name)?;
        if exists {
            println!("  ok {}", table_name);
        } else {
            println!("  MISSING {}", table_name);
            all_tables_exist = false;
        }
    }
    println!();

    println!("Table details:");
    println!("--------------");
    for table_name in &required_tables {
        if !check_table_exists(&conn, table_name)? {
            continue;
        }
        println!();
        println!("Table: {}", table_name);
        for col in get_table_columns(&conn, table_name)? {
            let pk_marker = if col.pk { " (PRIMARY KEY)" } else { "" };
            let null_marker = if col.not_null { " NOT NULL" } else { "" };
            println!("  - {} : {}{}{}", col.name, col.type_name, null_marker, pk_marker);
        }
    }

    println!();
    println!("Checking for indexes:");
    println!("---------------------");
    let expected_indexes = [
        "idx_questions_category",
        "idx_responses_question_id",
        "idx_responses_user_id",
    ];
    for index_name in &expected_indexes {
        if check_index_exists(&conn, index_name)? {
            println!("  ok {}", index_name);
        } else {
            println!("  MISSING {}", index_name);
        }
    }

    println!();
    println!("Record Counts:");
    println!("--------------");
    for table_name in &required_tables {
        if check_table_exists(&conn, table_name)? {
            let count = count_records(&conn, table_name)?;
            println!("  {} : {} records", table_name, count);
        }
    }

    if all_tables_exist {
        println!();
        println!("Categories:");
        println!("-----------");
        let mut stmt = conn.prepare(
            "SELECT category, COUNT(*) FROM questions GROUP BY category ORDER BY COUNT(*) DESC",
        )?;
        let categories = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for category in categories {
            let (name, count) = category?;
            println!("  {} : {} questions", name, count);
        }

        // Referential integrity: responses must never dangle
        println!();
        println!("Integrity:");
        println!("----------");
        let orphans: i64 = conn.query_row(
            "SELECT COUNT(*) FROM responses r
             WHERE NOT EXISTS (SELECT 1 FROM questions q WHERE q.id = r.question_id)",
            [],
            |row| row.get(0),
        )?;
        if orphans == 0 {
            println!("  ok no orphaned responses");
        } else {
            println!("  PROBLEM: {} orphaned response(s) found", orphans);
            let mut stmt = conn.prepare(
                "SELECT id, question_id FROM responses r
                 WHERE NOT EXISTS (SELECT 1 FROM questions q WHERE q.id = r.question_id)
                 LIMIT 10",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (id, question_id) = row?;
                println!("    response {} -> missing question {}", id, question_id);
            }
        }
    }

    println!();
    println!("Summary:");
    println!("--------");
    if all_tables_exist {
        println!("All required tables exist");
    } else {
        println!("Some required tables are missing");
        println!("Initialize the schema from daybook-db/src/db/schema.rs first");
    }

    Ok(())
}

fn check_table_exists(conn: &Connection, table_name: &str) -> Result<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
        [table_name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn check_index_exists(conn: &Connection, index_name: &str) -> Result<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name=?",
        [index_name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn get_table_columns(conn: &Connection, table_name: &str) -> Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table_name))?;

    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                type_name: row.get(2)?,
                not_null: row.get::<_, i32>(3)? != 0,
                pk: row.get::<_, i32>(5)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(columns)
}

fn count_records(conn: &Connection, table_name: &str) -> Result<i32> {
    let count: i32 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", table_name),
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
