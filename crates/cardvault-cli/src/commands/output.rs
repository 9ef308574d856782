//! Table and JSON rendering for query results

use anyhow::{Context, Result};
use cardvault_core::FileRecord;
use serde::Serialize;

use super::show::RecordDetail;
use crate::cli::OutputFormat;
use crate::truncate_string;

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

pub fn print_records(records: &[FileRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&records),
        OutputFormat::Table => {
            print_records_table(records);
            Ok(())
        }
    }
}

fn print_records_table(records: &[FileRecord]) {
    if records.is_empty() {
        println!("No files found.");
        return;
    }

    println!(
        "{:>6} {:<5} {:<10} {:<30} {:<45}",
        "ID", "Type", "Created", "Original Name", "Backup Path"
    );
    println!("{}", "-".repeat(100));

    for record in records {
        println!(
            "{:>6} {:<5} {:<10} {:<30} {:<45}",
            record.id,
            record.file_type,
            record.created_at.format("%Y-%m-%d"),
            truncate_string(&record.original_name, 30),
            truncate_string(&record.backup_path, 45),
        );
    }

    println!("\nTotal: {} files", records.len());
}

pub fn print_detail(detail: &RecordDetail, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(detail);
    }

    let record = &detail.record;
    println!("ID:            {}", record.id);
    println!("Original name: {}", record.original_name);
    println!("Type:          {}", record.file_type);
    println!("Created:       {}", record.created_at.format("%Y-%m-%d"));
    println!("Backup path:   {}", record.backup_path);
    println!("Archive file:  {}", detail.archive_path.display());
    println!(
        "Present:       {}",
        if detail.present { "yes" } else { "MISSING" }
    );
    println!(
        "Metadata:\n{}",
        serde_json::to_string_pretty(&record.metadata).context("Serialize metadata")?
    );
    Ok(())
}
