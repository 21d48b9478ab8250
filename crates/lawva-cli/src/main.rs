//! Lawva CLI: view generated legal certifications from the terminal.
//!
//! Drives the same fetch lifecycle a result page uses: one controller per
//! invocation, requests against a Lawva server's `/api/certification/{id}`,
//! and the view projection drawn as text.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod render;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lawva_core::fetch::{FetchController, FetchState};
use lawva_core::modal::{ModalState, PanelKind};
use lawva_core::source::{HttpSource, HttpSourceConfig};
use lawva_core::view::{self, OverlayContent};

use crate::render::Palette;

// ── CLI structure ────────────────────────────────────────────────────

/// Lawva: generated legal notices, in your terminal.
#[derive(Parser)]
#[command(
    name = "lawva",
    version,
    about = "Lawva CLI — fetch and view generated legal certifications",
    long_about = None,
    after_help = "Environment variables:\n  \
         LAWVA_ADDR    Server address (default: http://127.0.0.1:3000)\n\n\
         Examples:\n  \
         lawva status\n  \
         lawva show 42\n  \
         lawva original 42 --scroll-law 3\n  \
         lawva follow 41 42 43"
)]
struct Cli {
    /// Lawva server address.
    #[arg(long, env = "LAWVA_ADDR", default_value = "http://127.0.0.1:3000")]
    addr: String,

    /// Request timeout in seconds (default: none).
    #[arg(long)]
    timeout: Option<u64>,

    /// Disable colored output.
    #[arg(long, default_value = "false")]
    no_color: bool,

    /// Log fetch lifecycle events to stderr.
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server is reachable.
    Status,
    /// Show the result page for a certification.
    Show {
        /// Certification id, passed to the server unchanged.
        id: String,
    },
    /// Show the original document and related law overlay.
    Original {
        /// Certification id, passed to the server unchanged.
        id: String,
        /// Lines to scroll the original document panel.
        #[arg(long, default_value = "0")]
        scroll_original: i32,
        /// Lines to scroll the related law panel.
        #[arg(long, default_value = "0")]
        scroll_law: i32,
    },
    /// Switch through several ids without waiting; only the last one is shown.
    Follow {
        /// Certification ids, in navigation order.
        #[arg(required = true)]
        ids: Vec<String>,
        /// Pause between switches, in milliseconds.
        #[arg(long, default_value = "0")]
        interval_ms: u64,
    },
}

// ── Main ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let palette = Palette::new(!cli.no_color);

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lawva_core=debug")),
            )
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    match run(cli, palette).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!();
            eprintln!("  {}{}✗ Error:{} {e:#}", palette.red, palette.bold, palette.reset);
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, palette: Palette) -> Result<ExitCode> {
    let source = HttpSource::with_config(HttpSourceConfig {
        base_url: cli.addr.clone(),
        timeout: cli.timeout.map(Duration::from_secs),
    })
    .context("failed to build HTTP client")?;

    match cli.command {
        Commands::Status => cmd_status(&source, palette).await,
        Commands::Show { id } => cmd_show(source, &id, palette).await,
        Commands::Original {
            id,
            scroll_original,
            scroll_law,
        } => cmd_original(source, &id, scroll_original, scroll_law, palette).await,
        Commands::Follow { ids, interval_ms } => {
            cmd_follow(source, &ids, Duration::from_millis(interval_ms), palette).await
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────

async fn cmd_status(source: &HttpSource, p: Palette) -> Result<ExitCode> {
    let reported = source
        .health()
        .await
        .with_context(|| format!("failed to reach {}", source.health_url()))?;

    println!("{}{}✓{} {} is {reported}", p.green, p.bold, p.reset, source.base_url());
    Ok(ExitCode::SUCCESS)
}

async fn cmd_show(source: HttpSource, id: &str, p: Palette) -> Result<ExitCode> {
    let mut controller = FetchController::new(source);
    controller.load(id);
    let state = controller.settled().await;

    print!("{}", render::page(&view::render(&state), p));
    Ok(exit_code(&state))
}

async fn cmd_original(
    source: HttpSource,
    id: &str,
    scroll_original: i32,
    scroll_law: i32,
    p: Palette,
) -> Result<ExitCode> {
    let mut controller = FetchController::new(source);
    controller.load(id);
    let state = controller.settled().await;

    let FetchState::Loaded(cert) = &state else {
        print!("{}", render::page(&view::render(&state), p));
        return Ok(exit_code(&state));
    };

    let mut modal = ModalState::default();
    modal.open();
    modal.scroll(PanelKind::Original, scroll_original);
    modal.scroll(PanelKind::RelatedLaw, scroll_law);

    let content = OverlayContent::from_certification(cert);
    print!("{}", render::overlay(&content, &modal, p));
    Ok(ExitCode::SUCCESS)
}

async fn cmd_follow(
    source: HttpSource,
    ids: &[String],
    interval: Duration,
    p: Palette,
) -> Result<ExitCode> {
    let mut controller = FetchController::new(source);

    for (i, id) in ids.iter().enumerate() {
        if i > 0 && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        controller.load(id);
        if i + 1 < ids.len() {
            println!("{}→ {id} (superseded){}", p.dim, p.reset);
        }
    }

    let state = controller.settled().await;
    if let Some(last) = controller.target() {
        println!("{}{}→ {last}{}", p.bold, p.cyan, p.reset);
    }
    print!("{}", render::page(&view::render(&state), p));
    Ok(exit_code(&state))
}

fn exit_code(state: &FetchState) -> ExitCode {
    match state {
        FetchState::Failed(_) => ExitCode::FAILURE,
        FetchState::Idle | FetchState::Loading | FetchState::Loaded(_) => ExitCode::SUCCESS,
    }
}
