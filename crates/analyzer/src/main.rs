use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use analyzer::logs::{level_stats, EntryFilter};
use analyzer::parser::ParsingMetrics;
use analyzer::runtime::boot;
use analyzer::{LogEntry, LogLevel, ParseBatch};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "analyzer", about = "Parse tab-separated operator logs")]
struct Cli {
    /// Log files to parse, in order.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Parser config file (defaults to $ANALYZER_CONFIG_FILE).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only entries at exactly this level (e.g. ERROR).
    #[arg(long, value_parser = parse_level)]
    level: Option<LogLevel>,

    /// Case-insensitive logger substring.
    #[arg(long)]
    logger: Option<String>,

    /// Case-insensitive message substring.
    #[arg(long)]
    message: Option<String>,

    /// Drop lines that failed to parse.
    #[arg(long)]
    hide_invalid: bool,
}

fn parse_level(s: &str) -> Result<LogLevel, String> {
    s.to_ascii_uppercase()
        .parse::<LogLevel>()
        .map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    boot::init_logging();

    let config = boot::load_config(cli.config.as_deref())?;
    let metrics = Arc::new(ParsingMetrics::new());
    let mut batch = ParseBatch::new(config.max_line_bytes).with_metrics(metrics.clone());

    let mut failed = 0usize;
    for path in &cli.files {
        match batch.add_file(path) {
            Ok(count) => tracing::debug!(file = %path.display(), entries = count, "parsed"),
            Err(e) => {
                tracing::error!("{}", e);
                failed += 1;
            }
        }
    }

    let parsed_files = batch.filenames().len();
    let entries = batch.finish();
    let filter = build_filter(&cli);
    let shown = filter.apply(&entries);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match cli.format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &shown)?;
            writeln!(out)?;
        }
        Format::Text => {
            for entry in &shown {
                write_text(&mut out, entry)?;
            }
        }
    }
    out.flush()?;

    let snap = metrics.snapshot();
    let stats = level_stats(&entries)
        .into_iter()
        .map(|(level, n)| format!("{}={}", level, n))
        .collect::<Vec<_>>()
        .join(" ");
    eprintln!(
        "{} entries ({} shown) from {} file(s), {} continuation line(s); {}",
        entries.len(),
        shown.len(),
        parsed_files,
        snap.continuation_lines,
        stats
    );

    if failed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn build_filter(cli: &Cli) -> EntryFilter {
    EntryFilter {
        level: cli.level,
        logger: cli.logger.clone().unwrap_or_default(),
        message: cli.message.clone().unwrap_or_default(),
        show_invalid: !cli.hide_invalid,
        ..Default::default()
    }
}

fn write_text<W: Write>(out: &mut W, entry: &LogEntry) -> io::Result<()> {
    if !entry.is_valid {
        writeln!(out, "{:<24}  {:<5}  {}", "-", "INVAL", entry.raw)?;
        return writeln!(out, "{:<24}  {:<5}  ! {}", "", "", entry.parse_error);
    }

    let level = entry.level.map(|l| l.as_str()).unwrap_or("?");
    write!(
        out,
        "{:<24}  {:<5}  {}  {}  {}",
        entry.timestamp, level, entry.logger, entry.file_position, entry.message
    )?;
    if !entry.details_json.is_empty() {
        write!(out, "  {}", entry.details_json)?;
    }
    writeln!(out)?;
    for line in &entry.stack_trace {
        writeln!(out, "{:<24}  {:<5}  | {}", "", "", line)?;
    }
    Ok(())
}
