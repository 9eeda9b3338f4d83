//! CLI binary for edgequake-pdftext.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use edgequake_pdftext::{
    extract_pages, extract_to_file, inspect, render_dictionary, render_paginated_text,
    ExtractionConfig, ExtractionProgressCallback, HyphenMode, OutputFormat, PageSelection,
    PdfTextError, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Progress bar on stderr. Pages may finish out of order when several
/// workers run, so the bar only counts.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Spinner until `on_extraction_start` says how many pages to expect.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Extracting");
    }

    fn on_page_complete(&self, page_num: usize, _total_pages: usize, line_count: usize) {
        self.bar
            .set_message(format!("page {page_num}: {line_count} lines"));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages extracted",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Plain text to stdout
  pdftext document.pdf

  # Reading-order sorted text to a file
  pdftext --sort document.pdf -o document.txt

  # Structured JSON for pages 1, 2 to 4 and 10, with glyphs
  pdftext --json --keep-chars --pages 1,2-4,10 paper.pdf > paper.json

  # Large document on four workers
  pdftext --workers 4 book.pdf -o book.txt

  # From a URL
  pdftext https://arxiv.org/pdf/1706.03762 -o attention.txt

  # Metadata only
  pdftext --inspect-only document.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Directory containing the pdfium shared library
  RUST_LOG          Override log filtering (e.g. edgequake_pdftext=debug)
"#;

/// Extract text and layout from PDF files and URLs.
#[derive(Parser, Debug)]
#[command(
    name = "pdftext",
    version,
    about = "Extract text and layout from PDF files and URLs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write output to this file instead of stdout.
    #[arg(short, long, env = "PDFTEXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Output structured JSON (pages → blocks → lines → spans) instead of plain text.
    #[arg(long, env = "PDFTEXT_JSON")]
    json: bool,

    /// Sort blocks into reading order.
    #[arg(long, env = "PDFTEXT_SORT")]
    sort: bool,

    /// Keep soft hyphens at line ends instead of rejoining words.
    #[arg(long, env = "PDFTEXT_KEEP_HYPHENS")]
    keep_hyphens: bool,

    /// Page selection, 1-based: all, 5, 3-15, or 1,2-4,10.
    #[arg(long, env = "PDFTEXT_PAGES", default_value = "all",
          value_parser = parse_pages)]
    pages: PageSelection,

    /// Flatten form fields and annotations into page content first.
    #[arg(long, env = "PDFTEXT_FLATTEN_PDF")]
    flatten_pdf: bool,

    /// Include per-glyph detail in JSON output.
    #[arg(long, env = "PDFTEXT_KEEP_CHARS")]
    keep_chars: bool,

    /// Number of page workers (clamped to at least 10 pages each).
    #[arg(long, env = "PDFTEXT_WORKERS")]
    workers: Option<usize>,

    /// Page raster scale factor (0.1–10).
    #[arg(long, env = "PDFTEXT_SCALE", default_value_t = 2.0)]
    scale: f64,

    /// Do not render page images.
    #[arg(long, env = "PDFTEXT_NO_IMAGES")]
    no_images: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFTEXT_PASSWORD")]
    password: Option<String>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDFTEXT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "PDFTEXT_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFTEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFTEXT_QUIET")]
    quiet: bool,
}

fn parse_pages(s: &str) -> Result<PageSelection, String> {
    PageSelection::parse(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; --verbose brings them back.
    let show_progress = !cli.quiet && !cli.no_progress && cli.output.is_some();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input, &config)
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input);
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
        }
        return Ok(());
    }

    // ── Run extraction ───────────────────────────────────────────────────
    let started = Instant::now();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    if let Some(ref output_path) = cli.output {
        let count = extract_to_file(&cli.input, output_path, format, &config)
            .await
            .map_err(page_range_exit)
            .context("Extraction failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {} pages  {}ms  →  {}",
                green("✔"),
                count,
                started.elapsed().as_millis(),
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let pages = extract_pages(&cli.input, &config)
            .await
            .map_err(page_range_exit)
            .context("Extraction failed")?;

        let body = match format {
            OutputFormat::Json => serde_json::to_string_pretty(&render_dictionary(&pages, &config))
                .context("Failed to serialise output")?,
            OutputFormat::Text => render_paginated_text(&pages, &config).join("\n"),
        };

        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(body.as_bytes())
            .context("Failed to write to stdout")?;
        if !body.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }

        if !cli.quiet {
            eprintln!(
                "{}",
                dim(&format!(
                    "Extracted {} pages in {}ms",
                    pages.len(),
                    started.elapsed().as_millis()
                ))
            );
        }
    }

    Ok(())
}

/// Out-of-range pages are a usage error: report them the way clap reports
/// a bad flag value and exit non-zero.
fn page_range_exit(err: PdfTextError) -> PdfTextError {
    if let PdfTextError::PageOutOfRange { .. } = err {
        Cli::command()
            .error(ErrorKind::ValueValidation, format!("--pages: {err}"))
            .exit();
    }
    err
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .pages(cli.pages.clone())
        .flatten_pdf(cli.flatten_pdf)
        .render_images(!cli.no_images)
        .render_scale(cli.scale)
        .sort(cli.sort)
        .hyphens(if cli.keep_hyphens {
            HyphenMode::Keep
        } else {
            HyphenMode::Join
        })
        .keep_chars(cli.keep_chars)
        .download_timeout_secs(cli.download_timeout);

    if let Some(n) = cli.workers {
        builder = builder.workers(n);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
