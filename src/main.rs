use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use url::Url;

use sitter_highlights::config::Config;
use sitter_highlights::document::DocumentId;
use sitter_highlights::highlight::{EditorId, RecordingSink, VisibleRange, VisibleRangeSet};
use sitter_highlights::logging::init_logger;
use sitter_highlights::parsers::LanguageRegistry;
use sitter_highlights::session::{HighlightSession, HostEvent};

#[derive(Parser, Debug)]
#[command(name = "sitter-highlights", version)]
#[command(about = "Tree-sitter based type, field and function highlighting")]
struct Cli {
    /// Stderr log filter (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Disable ANSI colors in log output
    #[arg(long, global = true)]
    no_color: bool,

    /// Also write a debug log to the user cache directory
    #[arg(long, global = true)]
    log_file: bool,

    /// JSON config file (otherwise $SITTER_HIGHLIGHTS_CONFIG, then defaults)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Highlight one file and print its decoration sets as JSON
    Highlight {
        file: PathBuf,

        /// Language tag (inferred from the file extension otherwise)
        #[arg(long, short = 'l', value_name = "TAG")]
        language: Option<String>,

        /// Visible line range, zero-based and inclusive; repeatable. Defaults to the whole file.
        #[arg(long, value_name = "START:END", value_parser = parse_lines)]
        lines: Vec<VisibleRange>,
    },
    /// Dispatch a JSON array of host events and print each decoration batch as a JSON line
    Replay { script: PathBuf },
}

fn parse_lines(raw: &str) -> Result<VisibleRange, String> {
    let (start, end) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{raw}'"))?;
    let start: u32 = start.trim().parse().map_err(|e| format!("bad start line '{start}': {e}"))?;
    let end: u32 = end.trim().parse().map_err(|e| format!("bad end line '{end}': {e}"))?;
    Ok(VisibleRange::new(start, end))
}

fn document_id(path: &Path) -> DocumentId {
    fs::canonicalize(path)
        .ok()
        .and_then(|abs| Url::from_file_path(abs).ok())
        .map(|uri| DocumentId::from(&uri))
        .unwrap_or_else(|| DocumentId::from(path.to_string_lossy().into_owned()))
}

fn highlight(config: Config, file: &Path, language: Option<String>, lines: Vec<VisibleRange>) -> anyhow::Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let registry = LanguageRegistry::from_config(&config)?;
    let language = match language {
        Some(tag) => tag,
        None => {
            let ext = file.extension().and_then(|e| e.to_str()).unwrap_or_default();
            match registry.language_for_extension(ext) {
                Some(tag) => tag.to_string(),
                None => bail!("cannot infer a language for {}, pass --language", file.display()),
            }
        }
    };
    if !registry.supports(&language) {
        bail!("no grammar registered for language '{}'", language);
    }

    let visible = if lines.is_empty() {
        VisibleRangeSet::lines(0, text.matches('\n').count() as u32)
    } else {
        VisibleRangeSet::new(lines)
    };
    let mut session = HighlightSession::with_registry(config, registry, RecordingSink::new());
    session.on_document_visible(EditorId::from("cli"), document_id(file), &language, &text, visible)?;

    let batches = session.sink_mut().drain();
    println!("{}", serde_json::to_string_pretty(&batches)?);
    Ok(())
}

fn replay(config: Config, script: &Path) -> anyhow::Result<()> {
    let raw = fs::read_to_string(script).with_context(|| format!("failed to read {}", script.display()))?;
    let events: Vec<HostEvent> =
        serde_json::from_str(&raw).with_context(|| format!("invalid event script {}", script.display()))?;
    info!("Replaying {} events from {}", events.len(), script.display());

    let mut session = HighlightSession::new(config, RecordingSink::new())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for event in events {
        session.dispatch(event);
        for batch in session.sink_mut().drain() {
            writeln!(out, "{}", serde_json::to_string(&batch)?)?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard =
        init_logger(cli.no_color, cli.log_level.as_deref(), cli.log_file).context("failed to initialize logging")?;
    let config = Config::from_env_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Highlight { file, language, lines } => highlight(config, &file, language, lines),
        Command::Replay { script } => replay(config, &script),
    }
}
