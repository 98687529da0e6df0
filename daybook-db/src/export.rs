//! JSON and CSV import/export for the questions table.
//!
//! The JSON shape matches the original seed files (`id`, `question`,
//! `category`) so an export can be fed straight back into the seeder.
//! Writers take `io::Write` so tests run against buffers and the tools
//! against files.

use anyhow::{Context, Result};
use daybook_types::{Question, SeedRecord};
use std::io::{Read, Write};

/// CSV header, kept in one place so tests and tools agree
pub const CSV_HEADER: [&str; 3] = ["id", "question_text", "category"];

/// Write questions as CSV: header row plus one row per question.
/// Zero questions produce a file containing only the header line.
pub fn write_csv<W: Write>(questions: &[Question], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(CSV_HEADER)
        .context("Failed to write CSV header")?;

    for q in questions {
        let id = q.id.to_string();
        csv_writer
            .write_record([id.as_str(), q.question_text.as_str(), q.category.as_str()])
            .with_context(|| format!("Failed to write CSV row for question {}", q.id))?;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write questions as a JSON array of seed records, sorted by id.
pub fn write_json<W: Write>(questions: &[Question], writer: W) -> Result<()> {
    let mut records: Vec<SeedRecord> = questions.iter().map(SeedRecord::from_question).collect();
    records.sort_by_key(|r| r.id);
    serde_json::to_writer_pretty(writer, &records).context("Failed to write JSON export")?;
    Ok(())
}

/// Load seed records from a JSON array. Records come back sorted by id and
/// are otherwise untouched; unknown extra keys in the source are ignored.
pub fn load_seed<R: Read>(reader: R) -> Result<Vec<SeedRecord>> {
    let mut records: Vec<SeedRecord> =
        serde_json::from_reader(reader).context("Failed to parse JSON seed file")?;
    records.sort_by_key(|r| r.id);
    Ok(records)
}
