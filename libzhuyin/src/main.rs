use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use composer_core::{QueryEngine, QueryOutcome, SegmentCache};
use libzhuyin::{
    decode, encode, encode_lossless, phrase_entry, reorder, Candidate, DataPackStorage,
    DictionaryLookup, FoldingDictionary, ImeContext, InputEvent, MemoryDictionary, ZhuyinConfig,
    ZhuyinEngine,
};
use tracing_subscriber::EnvFilter;

type Dictionary = FoldingDictionary<Box<dyn DictionaryLookup>>;

#[derive(Parser)]
#[command(name = "zhuyin")]
#[command(about = "Zhuyin/Bopomofo phrase composition demo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Data pack directory (datapack.fst + datapack.bincode); a small demo
    /// dictionary is used otherwise
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// ZhuyinConfig TOML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print candidates as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session: type symbols, `:enter`, `:bs`, `:esc`, `:N`
    Repl,
    /// Print the candidates for a symbol buffer
    Query { symbols: String },
    /// Show how symbols split into syllables
    Encode { symbols: String },
}

fn demo_dictionary() -> MemoryDictionary {
    [
        ("ㄋㄧˇ", "你", 4.0),
        ("ㄏㄠˇ", "好", 5.0),
        ("ㄏㄠˋ", "號", 2.0),
        ("ㄋㄧˇㄏㄠˇ", "你好", 9.0),
        ("ㄇㄚ˙", "嗎", 3.0),
        ("ㄏㄠˇㄇㄚ˙", "好嗎", 6.0),
        ("ㄓㄨㄥ", "中", 4.0),
        ("ㄍㄨㄛˊ", "國", 3.0),
        ("ㄓㄨㄥㄍㄨㄛˊ", "中國", 8.0),
        ("ㄓㄨㄥㄍㄨㄛˊㄖㄣˊ", "中國人", 7.0),
        ("ㄍㄨㄛˊㄐㄧㄚ", "國家", 5.0),
    ]
    .into_iter()
    .fold(MemoryDictionary::new(), |mut dict, (symbols, text, score)| {
        let (key, entry) = phrase_entry(symbols, text, score);
        dict.insert(key, entry);
        dict
    })
}

fn load_config(path: Option<&Path>) -> Result<ZhuyinConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ZhuyinConfig::from_toml_str(&content)
                .with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(ZhuyinConfig::default()),
    }
}

fn open_dictionary(data: Option<&Path>, config: &ZhuyinConfig) -> Result<Dictionary> {
    let pairs = config.pairs().context("invalid interchangeable_pairs")?;
    let inner: Box<dyn DictionaryLookup> = match data {
        Some(dir) => {
            let pack = DataPackStorage::load_dir(dir)
                .with_context(|| format!("loading data pack from {}", dir.display()))?;
            tracing::info!(keys = pack.len(), "data pack opened");
            Box::new(pack)
        }
        None => Box::new(demo_dictionary()),
    };
    Ok(FoldingDictionary::new(inner, pairs))
}

fn print_candidates(candidates: &[Candidate], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(candidates)?);
        return Ok(());
    }
    if candidates.is_empty() {
        println!("  (no candidates)");
    }
    for (i, c) in candidates.iter().enumerate() {
        println!("{}. {}  [{}]", i + 1, c.text, decode(&c.consumed));
    }
    Ok(())
}

fn run_query(
    symbols: &str,
    config: &ZhuyinConfig,
    dictionary: &Dictionary,
    json: bool,
) -> Result<()> {
    let symbols = if config.base().reorder_symbols {
        reorder(symbols)
    } else {
        symbols.to_string()
    };
    let mut cache = SegmentCache::new();
    let codec = config.codec();
    let engine = QueryEngine::new(&codec, dictionary);
    match engine.query(&mut cache, &symbols, config.base().syllable_limit()) {
        QueryOutcome::Candidates { candidates, .. } => print_candidates(&candidates, json),
        QueryOutcome::Overflow => {
            anyhow::bail!(
                "{} has more than {} syllables",
                symbols,
                config.base().syllable_limit()
            )
        }
    }
}

fn run_encode(symbols: &str, json: bool) -> Result<()> {
    let lossless = encode_lossless(symbols);
    let compact = encode(symbols);
    let syllables: Vec<String> = lossless.chars().map(|c| decode(&c.to_string())).collect();
    if json {
        let value = serde_json::json!({
            "syllables": syllables,
            "lossless": lossless.chars().map(|c| c as u32).collect::<Vec<_>>(),
            "compact": compact.chars().map(|c| c as u32).collect::<Vec<_>>(),
            "reordered": reorder(symbols),
        });
        println!("{}", value);
        return Ok(());
    }
    for (syllable, code) in syllables.iter().zip(compact.chars()) {
        println!("{}\t{:#06x}", syllable, code as u32);
    }
    println!("reordered: {}", reorder(symbols));
    Ok(())
}

fn show_session(
    engine: &mut ZhuyinEngine<Box<dyn DictionaryLookup>, ImeContext>,
    json: bool,
) -> Result<()> {
    let committed = engine.callbacks_mut().take_commit();
    if !committed.is_empty() {
        println!("commit: {}", committed);
    }
    let context = engine.callbacks();
    if !context.preedit_text.is_empty() {
        println!("preedit: {}", context.preedit_text);
    }
    print_candidates(&context.candidates, json)
}

fn run_repl(config: &ZhuyinConfig, dictionary: Dictionary, json: bool) -> Result<()> {
    let mut engine =
        ZhuyinEngine::with_config(config.codec(), ImeContext::new(), config.base().clone());
    engine.load(dictionary)?;

    println!("zhuyin demo: type Bopomofo symbols, then :enter, :bs, :esc or :N to pick");
    println!("Example: ㄋㄧˇㄏㄠˇ for 你好. Ctrl-D to exit.");

    let mut request_id = 0u64;
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            ":enter" => {
                request_id += 1;
                engine.handle_key(InputEvent::Enter, request_id)?;
            }
            ":bs" => {
                request_id += 1;
                engine.handle_key(InputEvent::Backspace, request_id)?;
            }
            ":esc" => {
                request_id += 1;
                engine.handle_key(InputEvent::Escape, request_id)?;
            }
            pick if pick.starts_with(':') => {
                let Ok(n) = pick[1..].parse::<usize>() else {
                    println!("unknown command {}", pick);
                    continue;
                };
                let picked = n.checked_sub(1).and_then(|i| engine.candidates().get(i));
                let Some(candidate) = picked.cloned() else {
                    println!("no candidate #{}", n);
                    continue;
                };
                request_id += 1;
                engine.select_candidate(candidate, request_id)?;
            }
            symbols => {
                for ch in symbols.chars() {
                    request_id += 1;
                    engine.handle_key_event(ch as u32, request_id)?;
                }
            }
        }

        show_session(&mut engine, json)?;
        io::stdout().flush()?;
    }

    engine.unload()?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Encode { symbols }) => run_encode(&symbols, cli.json),
        Some(Commands::Query { symbols }) => {
            let dictionary = open_dictionary(cli.data.as_deref(), &config)?;
            run_query(&symbols, &config, &dictionary, cli.json)
        }
        Some(Commands::Repl) | None => {
            let dictionary = open_dictionary(cli.data.as_deref(), &config)?;
            run_repl(&config, dictionary, cli.json)
        }
    }
}
