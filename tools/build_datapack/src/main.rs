use anyhow::{bail, Context, Result};
use clap::Parser;
use composer_core::{by_score_desc, utils::normalize, DataPackEntry, DataPackStorage};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "build_datapack")]
#[command(about = "Build datapack.fst + datapack.bincode from a Bopomofo phrase table")]
struct Args {
    /// Table with lines `symbols<TAB>text[<TAB>score]`
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Debug, PartialEq)]
struct Row {
    symbols: String,
    text: String,
    score: Option<f64>,
}

// expected: symbols\ttext[\tscore]; blank lines and `#` comments are skipped
fn parse_table_line(line: &str) -> Result<Option<Row>> {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    if line.trim().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 2 || parts.len() > 3 {
        bail!("expected 2 or 3 tab-separated fields, got {}", parts.len());
    }
    let score = match parts.get(2).map(|s| s.trim()) {
        Some(s) if !s.is_empty() => {
            Some(s.parse::<f64>().with_context(|| format!("bad score {:?}", s))?)
        }
        _ => None,
    };

    Ok(Some(Row {
        symbols: parts[0].trim().to_string(),
        text: normalize(parts[1]),
        score,
    }))
}

/// Group rows by compact key; every entry keeps its toned reading. A repeated
/// text with the same reading keeps its best score, and every list ends up
/// sorted by descending score.
fn build_grouped<R: BufRead>(reader: R) -> Result<BTreeMap<String, Vec<DataPackEntry>>> {
    let mut grouped: BTreeMap<String, Vec<DataPackEntry>> = BTreeMap::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let row = parse_table_line(&line).with_context(|| format!("line {}", lineno + 1))?;
        let Some(row) = row else { continue };

        if row.text.is_empty() || row.symbols.is_empty() {
            tracing::warn!(line = lineno + 1, "skipping row with empty field");
            continue;
        }
        if !row.symbols.chars().all(libzhuyin::is_bopomofo_symbol) {
            tracing::warn!(line = lineno + 1, symbols = %row.symbols, "skipping non-Bopomofo key");
            continue;
        }

        let key = libzhuyin::encode(&row.symbols);
        let candidate = entry(&row);
        let list = grouped.entry(key).or_default();
        match list
            .iter_mut()
            .find(|e| e.text == candidate.text && e.reading == candidate.reading)
        {
            Some(existing) => {
                if by_score_desc(&candidate, existing).is_lt() {
                    existing.score = candidate.score;
                }
            }
            None => list.push(candidate),
        }
    }

    for list in grouped.values_mut() {
        list.sort_by(by_score_desc);
    }
    Ok(grouped)
}

fn entry(row: &Row) -> DataPackEntry {
    let entry = match row.score {
        Some(score) => DataPackEntry::new(row.text.clone(), score),
        None => DataPackEntry::unscored(row.text.clone()),
    };
    entry.with_reading(libzhuyin::encode_lossless(&row.symbols))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let file = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let grouped = build_grouped(BufReader::new(file))?;

    let phrases: usize = grouped.values().map(Vec::len).sum();
    DataPackStorage::write_fst_bincode(&grouped, &args.output)?;
    tracing::info!(
        keys = grouped.len(),
        phrases,
        output = %args.output.display(),
        "data pack written"
    );
    Ok(())
}
