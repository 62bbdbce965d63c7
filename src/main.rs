use anyhow::{Context, Result};
use bibpmc::config::{load_config, Config};
use bibpmc::logging::{console_level, remove_stale_log, LogConfig};
use bibpmc::pipeline::{default_out_bib, run, RunOptions};
use bibpmc::sources::{PmcIdConverter, SourceError};
use bibpmc::utils::HttpClient;
use clap::{ArgAction, Parser};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;

/// Exit status for every fatal error
const EXIT_FAILURE: i32 = -1;

/// BibPMC - Add PubMed Central (PMCID) and PubMed (PMID) identifiers to BibTeX entries
#[derive(Parser, Debug)]
#[command(name = "bibpmc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Add PMCIDs and PMIDs to BibTeX entries by looking up their DOIs", long_about = None)]
struct Cli {
    /// Email address sent to NCBI with every request
    email: String,

    /// BibTeX file to update
    in_bib: PathBuf,

    /// Also look up entries that already have a PMCID or a PMID
    #[arg(long)]
    include_existing: bool,

    /// Keep month fields as written instead of converting them to integers
    #[arg(long)]
    no_month_integer: bool,

    /// Output BibTeX file [default: <in_bib stem>_BibPMC.bib]
    #[arg(long, value_name = "PATH")]
    out_bib: Option<PathBuf>,

    /// Write neither the log file nor the XML query log, and remove an old log file
    #[arg(long)]
    disable_file_logging: bool,

    /// Configuration file path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let (config, dispatch) = match setup(&cli) {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    if !execute(cli, config).with_subscriber(dispatch).await {
        std::process::exit(EXIT_FAILURE);
    }
}

/// Load configuration and build the log subscriber
fn setup(cli: &Cli) -> Result<(Config, Dispatch)> {
    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;

    let level = console_level(cli.verbose, cli.quiet, &config.logging.level);
    let file = (!cli.disable_file_logging).then(|| config.logging.file.clone());

    let dispatch = LogConfig::default()
        .with_console_level(level)
        .with_file(file)
        .build_dispatch()
        .with_context(|| format!("failed to open log file {}", config.logging.file.display()))?;

    Ok((config, dispatch))
}

/// Run the pipeline; returns whether it succeeded
async fn execute(cli: Cli, config: Config) -> bool {
    if cli.disable_file_logging {
        let log_file = &config.logging.file;
        match remove_stale_log(log_file) {
            Ok(true) => tracing::info!("removed log file: {}", log_file.display()),
            Ok(false) => {}
            Err(e) => tracing::warn!("could not remove log file {}: {}", log_file.display(), e),
        }
    }

    let out_bib = cli
        .out_bib
        .unwrap_or_else(|| default_out_bib(&cli.in_bib, &config.output.suffix));

    let options = RunOptions {
        email: cli.email,
        in_bib: cli.in_bib,
        out_bib,
        include_existing: cli.include_existing,
        month_int: !cli.no_month_integer,
        query_log: !cli.disable_file_logging,
        show_progress: !cli.quiet && std::io::stderr().is_terminal(),
    };

    tracing::info!("BibPMC {}", env!("CARGO_PKG_VERSION"));
    match &config.source {
        Some(path) => tracing::debug!("using configuration file {}", path.display()),
        None => tracing::debug!("no configuration file, using defaults"),
    }
    tracing::info!("Input BibTeX file: {}", options.in_bib.display());
    tracing::info!("Output BibTeX file: {}", options.out_bib.display());
    tracing::info!("Email: {}", options.email);
    tracing::info!("Include existing: {}", options.include_existing);
    tracing::info!("Convert months to integers: {}", options.month_int);

    let converter = match build_converter(&options.email, &config) {
        Ok(converter) => converter,
        Err(e) => {
            tracing::error!("Error - {}", e);
            return false;
        }
    };

    match run(&options, &converter).await {
        Ok(summary) => {
            tracing::info!(
                "Updated {} of {} entries ({} DOIs looked up, {} resolved)",
                summary.updated,
                summary.entries,
                summary.dois,
                summary.resolve.resolved
            );
            if summary.resolve.failed_batches > 0 {
                tracing::warn!(
                    "Warning - {} of {} batches failed and were skipped",
                    summary.resolve.failed_batches,
                    summary.resolve.batches
                );
            }
            if let Some(path) = &summary.query_log {
                tracing::info!("Query log: {}", path.display());
            }
            true
        }
        Err(e) => {
            tracing::error!("Error - {}", e);
            false
        }
    }
}

fn build_converter(email: &str, config: &Config) -> Result<PmcIdConverter, SourceError> {
    let client = HttpClient::with_timeout(config.service.timeout())?;
    if let Some(timeout) = client.timeout() {
        tracing::debug!("request timeout: {}s", timeout.as_secs());
    }
    let converter = PmcIdConverter::new(email)?
        .with_client(client)
        .with_base_url(&config.service.base_url)?
        .with_tool(config.service.tool.clone());
    tracing::debug!("ID converter endpoint: {}", converter.base_url());
    Ok(converter)
}
