//! Export the Shavian dictionary to JSON or CSV format
//!
//! Usage:
//!   cargo run -p export_dictionary -- --root notes --format json
//!   cargo run -p export_dictionary -- --root notes --format csv --output words.csv

use clap::Parser;
use shavian_core::{Dictionary, FileStorage, LoadOrigin, WordMapping};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "export_dictionary")]
#[command(about = "Export the Shavian dictionary to JSON or CSV format")]
struct Args {
    /// Document collection root holding the dictionary
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Output format: json or csv
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let storage = FileStorage::in_root(&args.root);
    let path = storage.path().to_path_buf();
    let dictionary = Dictionary::load(storage);
    if dictionary.load_origin() == LoadOrigin::Fresh {
        anyhow::bail!("No dictionary found at {}", path.display());
    }

    let output = match args.format.as_str() {
        "json" => dictionary.to_json()?,
        "csv" => export_csv(&dictionary.entries_sorted()),
        _ => anyhow::bail!("Unsupported format: {}. Use 'json' or 'csv'", args.format),
    };

    if let Some(path) = args.output {
        std::fs::write(path, output)?;
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn export_csv(entries: &[&WordMapping]) -> String {
    let mut output = String::from("script,translation,date_added\n");
    for m in entries {
        output.push_str(&format!(
            "{},{},{}\n",
            csv_field(&m.script),
            csv_field(&m.translation),
            m.created_at.to_rfc3339()
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_escapes_quotes() {
        let mut dict = Dictionary::in_memory();
        dict.define("𐑕𐑱", "say \"hi\"").unwrap();
        let csv = export_csv(&dict.entries_sorted());
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("\"𐑕𐑱\",\"say \"\"hi\"\"\","));
    }
}
