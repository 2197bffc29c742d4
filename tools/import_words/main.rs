//! Import Shavian words into the dictionary
//!
//! Supports multiple input formats:
//! - JSON: any dictionary document shape (canonical, [[script, value], ...],
//!   or {script: value})
//! - CSV: script,translation with an optional header row
//! - TXT: one `script<TAB>translation` pair per line
//!
//! Usage:
//!   cargo run -p import_words -- --root notes --input words.json
//!   cargo run -p import_words -- --root notes --input words.csv --format csv
//!   cargo run -p import_words -- --root notes --input words.txt --format txt --dry-run

use clap::Parser;
use shavian_core::{Dictionary, FileStorage};
use std::path::{Path, PathBuf};

#[derive(clap::Parser, Debug)]
#[command(name = "import_words")]
#[command(about = "Import Shavian words into the dictionary")]
struct Args {
    /// Document collection root holding the dictionary
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Input file containing words
    #[arg(short, long)]
    input: PathBuf,

    /// Input format: json, csv, or txt
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Dry run (show what would be imported without actually importing)
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let content = std::fs::read_to_string(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read input file: {}", e))?;

    let entries = match args.format.as_str() {
        "json" => parse_json(&content)?,
        "csv" => parse_csv(&content),
        "txt" => parse_txt(&content),
        _ => anyhow::bail!("Unsupported format: {}. Use 'json', 'csv', or 'txt'", args.format),
    };

    println!("Parsed {} words from {}", entries.len(), args.input.display());

    if args.dry_run {
        println!("\n[DRY RUN] Would import:");
        for (script, translation) in entries.iter().take(10) {
            println!("  {} → {}", script, translation);
        }
        if entries.len() > 10 {
            println!("  ... and {} more", entries.len() - 10);
        }
        return Ok(());
    }

    let (applied, added) = import_entries(&args.root, &entries)?;

    println!(
        "✓ Imported {} words ({} new, {} skipped)",
        applied,
        added,
        entries.len() - applied
    );
    Ok(())
}

/// Merge `entries` into the dictionary under `root` with a single save.
/// Returns how many entries were applied and how many of those were new.
fn import_entries(root: &Path, entries: &[(String, String)]) -> anyhow::Result<(usize, usize)> {
    let mut dictionary = Dictionary::load(FileStorage::in_root(root));
    let before = dictionary.len();
    let json = serde_json::to_string(entries)?;
    let applied = dictionary
        .merge_json(&json)
        .map_err(|e| anyhow::anyhow!("Failed to save dictionary: {}", e))?;
    Ok((applied, dictionary.len() - before))
}

/// Read any accepted dictionary document shape.
fn parse_json(content: &str) -> anyhow::Result<Vec<(String, String)>> {
    let mut scratch = Dictionary::in_memory();
    scratch
        .merge_json(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse JSON: {}", e))?;
    Ok(scratch
        .entries_sorted()
        .into_iter()
        .map(|m| (m.script.clone(), m.translation.clone()))
        .collect())
}

fn parse_csv(content: &str) -> Vec<(String, String)> {
    let mut lines = content.lines().map(str::trim);

    let mut entries = Vec::new();
    // Skip header if it looks like a header
    if let Some(first_line) = lines.next() {
        if !first_line.to_lowercase().starts_with("script") {
            entries.extend(parse_csv_line(first_line));
        }
    }

    for line in lines {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        entries.extend(parse_csv_line(line));
    }
    entries
}

fn parse_csv_line(line: &str) -> Option<(String, String)> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    parts.push(current);

    let mut parts = parts.into_iter().map(|p| p.trim().to_string());
    let script = parts.next()?;
    let translation = parts.next()?;
    if script.is_empty() || translation.is_empty() {
        return None;
    }
    Some((script, translation))
}

fn parse_txt(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (script, translation) = line.split_once('\t')?;
            Some((script.trim().to_string(), translation.trim().to_string()))
        })
        .collect()
}
