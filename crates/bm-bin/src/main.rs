//! Boardmark entrypoint: load a markdown document, run the style
//! maintenance pass, and print the result.
use anyhow::{Context, Result};
use clap::Parser;
use core_config::{Config, load_from};
use core_events::EditEvent;
use core_model::{Block, Document};
use core_render::{HtmlRenderer, style_runs};
use core_state::{EditorState, StyleMaintenanceEngine};
use std::fmt::Write as _;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "boardmark", version, about = "Live markdown styling for card descriptions")]
struct Args {
    /// Markdown file to load. Reads stdin when omitted.
    pub path: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `boardmark.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Print the maintained document as JSON.
    #[arg(long, conflicts_with = "html")]
    pub json: bool,
    /// Print the maintained document as HTML.
    #[arg(long)]
    pub html: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Blocks,
    Json,
    Html,
}

impl OutputFormat {
    fn from_args(args: &Args) -> Self {
        if args.json {
            OutputFormat::Json
        } else if args.html {
            OutputFormat::Html
        } else {
            OutputFormat::Blocks
        }
    }
}

fn configure_logging(config: &Config) -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("boardmark.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.file.log.filter.as_str()));
    let file_appender = tracing_appender::rolling::never(log_dir, "boardmark.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Global subscriber already installed; dropping the guard stops the writer.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };
    debug!(target: "io", size_bytes = raw.len(), "input_read_ok");
    Ok(normalize_line_endings(&raw))
}

fn load_document(config: &Config, text: String) -> Result<EditorState> {
    let mut state = EditorState::new(StyleMaintenanceEngine::from_config(config));
    state
        .dispatch(EditEvent::Load { text })
        .context("loading document")?;
    Ok(state)
}

fn format_block(out: &mut String, block: &Block) {
    let _ = writeln!(
        out,
        "{} {} {:?}",
        block.key(),
        block.block_type(),
        block.text()
    );
    for run in style_runs(block) {
        if run.styles.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  {}..={} {}", run.range.start, run.range.end, run.styles);
    }
}

fn format_blocks(doc: &Document) -> String {
    let mut out = String::new();
    for block in doc.blocks() {
        format_block(&mut out, block);
    }
    out
}

fn render(doc: &Document, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Blocks => format_blocks(doc),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(doc).context("serializing document")?;
            json.push('\n');
            json
        }
        OutputFormat::Html => HtmlRenderer::new(()).render_document(doc),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let _log_guard = configure_logging(&config);
    install_panic_hook();
    info!(target: "runtime", config_override = args.config.is_some(), "startup");

    let text = read_input(args.path.as_deref())?;
    let state = load_document(&config, text)?;
    let doc = state.document();
    info!(
        target: "runtime",
        blocks = doc.len(),
        passes = state.passes(),
        "document_maintained"
    );

    let output = render(doc, OutputFormat::from_args(&args))?;
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(output.as_bytes())?;
    lock.flush()?;
    info!(target: "runtime", "shutdown");
    Ok(())
}
