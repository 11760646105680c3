//! Entry point for `word-pager`.
//!
//! Parses CLI arguments, reads the configuration file once, and dispatches
//! into either **server** or **client** mode.  All protocol work lives in the
//! library; `main.rs` owns only process setup (logging, signal handling,
//! argument parsing, exit status).

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use word_pager::config::DEFAULT_CONFIG_PATH;
use word_pager::{
    write_report, ClientConfig, Config, PageServer, PaginationClient, ServerConfig, WordList,
};

/// Paginated word-list server and word-frequency client.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// JSON configuration file shared by both roles.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Serve the configured word list until interrupted.
    Server,
    /// Fetch the whole list page by page and print word frequencies.
    Client {
        /// Words per request (overrides `k`).
        #[arg(short = 'k', long)]
        page_size: Option<i64>,
        /// Starting offset (overrides `p`).
        #[arg(short = 'p', long, allow_negative_numbers = true)]
        offset: Option<i64>,
        /// Full passes to run (overrides `num_iterations`).
        #[arg(short = 'n', long)]
        repetitions: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();
    let mut cfg = Config::load_or_default(&cli.config);

    match cli.mode {
        Mode::Server => run_server(ServerConfig::from_config(&cfg)).await,
        Mode::Client {
            page_size,
            offset,
            repetitions,
        } => {
            cfg.k = page_size.or(cfg.k);
            cfg.p = offset.or(cfg.p);
            cfg.num_iterations = repetitions.or(cfg.num_iterations);
            run_client(ClientConfig::from_config(&cfg)).await
        }
    }
}

async fn run_server(cfg: ServerConfig) -> Result<()> {
    let words = WordList::load(&cfg.word_file).context("loading word list")?;
    let server = PageServer::from_config(&cfg, words)
        .await
        .context("starting server")?;

    server
        .serve_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("cannot listen for ctrl-c: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await;
    Ok(())
}

async fn run_client(cfg: ClientConfig) -> Result<()> {
    let Some(page_size) = cfg.page_size else {
        log::info!("page size unset or not positive; nothing to fetch");
        return Ok(());
    };

    let client = PaginationClient::from_config(&cfg);
    let summary = client
        .fetch_repeated(cfg.start_offset, page_size, cfg.repetitions)
        .await
        .with_context(|| format!("fetching from {}:{}", cfg.server_address, cfg.port))?;

    write_report(&summary.table, &mut io::stdout().lock()).context("writing report")?;
    Ok(())
}
