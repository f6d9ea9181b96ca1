//! Warcflow main entry point
//!
//! This is the command-line interface for the warcflow archive extractor
//! and crawl-job orchestrator.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use warcflow::archive::{ArchiveCrawler, ArchiveDownloader, HttpArchiveIndex, WarcGzOpener};
use warcflow::config::{load_config_with_hash, load_site_list, Config};
use warcflow::orchestrator::{CommandJobExecutor, Orchestrator, ShutdownCoordinator};
use warcflow::pipeline::{ExtractionPipeline, JsonDirSink, PipelineSettings, RecordHeaderExtractor};
use warcflow::{CheckpointLog, FilterCriteria, RecordFilter};

/// Warcflow: resumable web archive extraction
///
/// Warcflow downloads WARC archives, streams their records through
/// configurable filter criteria, and schedules one-shot and recurring
/// per-site crawl jobs. Fully extracted archives are checkpointed so an
/// interrupted run picks up where it left off.
#[derive(Parser, Debug)]
#[command(name = "warcflow")]
#[command(version = "1.0.0")]
#[command(about = "Resumable web archive extraction", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume an interrupted run, reusing the checkpoint log and any
    /// downloaded archives
    #[arg(long)]
    resume: bool,

    /// Run the archive extraction loop instead of the site job orchestrator
    #[arg(long, conflicts_with = "dry_run")]
    archive: bool,

    /// Validate config and show what would run without running it
    #[arg(long, conflicts_with = "archive")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.resume {
        // The checkpoint log does not record the criteria it was written
        // under, so resuming with changed filters silently skips archives
        tracing::warn!(
            "resuming; filter criteria must match the interrupted run (config hash: {})",
            config_hash
        );
    }

    let shutdown = ShutdownCoordinator::new();
    spawn_signal_handler(shutdown.clone());

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.archive {
        handle_archive(&config, shutdown).await?;
    } else {
        handle_crawl(&config, &cli.config, shutdown, cli.resume).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warcflow=info,warn"),
            1 => EnvFilter::new("warcflow=debug,info"),
            2 => EnvFilter::new("warcflow=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Requests a cooperative stop on Ctrl-C or SIGTERM. A second signal while
/// draining kills the process the default way.
fn spawn_signal_handler(shutdown: ShutdownCoordinator) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            let mut sigterm = match tokio::signal::unix::signal(
                tokio::signal::unix::SignalKind::terminate(),
            ) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    tracing::error!("Failed to install SIGTERM handler: {}", e);
                    return;
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
        shutdown.request_stop();
    });
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Warcflow Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Parallel crawlers: {}",
        config.crawler.number_of_parallel_crawlers
    );
    println!(
        "  Parallel daemons: {}",
        config.crawler.number_of_parallel_daemons
    );
    println!("  Site list: {}", config.crawler.site_list_path);
    match &config.crawler.job_command {
        Some(command) => println!("  Job command: {}", command),
        None => println!("  Job command: (not set)"),
    }

    println!("\nArchive:");
    println!("  Base URL: {}", config.archive.base_url);
    println!("  Index URL: {}", config.archive.index_url);
    println!("  Date filter: {:?}", config.archive.date_filter);
    println!("  Download dir: {}", config.archive.download_dir);
    println!("  Checkpoint: {}", config.archive.checkpoint_path);
    println!("  Parallel archives: {}", config.archive.parallel_archives);
    println!(
        "  Continue after error: {}",
        config.archive.continue_after_error
    );
    println!(
        "  Delete after extraction: {}",
        config.archive.delete_after_extraction
    );

    println!("\nFilter:");
    if config.filter.hosts.is_empty() {
        println!("  Hosts: (any)");
    } else {
        println!("  Hosts ({}):", config.filter.hosts.len());
        for host in &config.filter.hosts {
            println!("    - {}", host);
        }
    }
    println!("  Start date: {:?}", config.filter.start_date);
    println!("  End date: {:?}", config.filter.end_date);
    println!("  Strict date: {}", config.filter.strict_date);

    println!("\nOutput:");
    println!("  Article dir: {}", config.output.article_dir);

    let sites = load_site_list(Path::new(&config.crawler.site_list_path))?;
    let daemonized = sites.base_urls.iter().filter(|s| s.is_daemonized()).count();
    println!("\nSites ({}):", sites.base_urls.len());
    for site in &sites.base_urls {
        match site.daemonize {
            Some(interval) => println!("  - {} (every {}s)", site.url, interval),
            None => println!("  - {}", site.url),
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would run {} one-shot and {} daemonized site jobs",
        sites.base_urls.len() - daemonized,
        daemonized
    );

    Ok(())
}

/// Handles the --archive mode: download and extract archives
async fn handle_archive(config: &Config, shutdown: ShutdownCoordinator) -> anyhow::Result<()> {
    let checkpoint = Arc::new(CheckpointLog::open(Path::new(
        &config.archive.checkpoint_path,
    ))?);
    tracing::info!(
        "checkpoint log lists {} fully extracted archives",
        checkpoint.len()
    );

    let client = reqwest::Client::new();
    let index = Arc::new(HttpArchiveIndex::new(
        client.clone(),
        config.archive.index_url.clone(),
    ));
    let downloader = Arc::new(ArchiveDownloader::new(
        client,
        Path::new(&config.archive.download_dir),
    ));

    let pipeline = Arc::new(ExtractionPipeline::new(
        Box::new(WarcGzOpener::new()),
        Arc::new(RecordHeaderExtractor),
        Arc::new(JsonDirSink::new(Path::new(&config.output.article_dir))),
        RecordFilter::new(FilterCriteria::from_config(&config.filter)),
        Arc::clone(&checkpoint),
        PipelineSettings {
            continue_after_error: config.archive.continue_after_error,
            delete_after_extraction: config.archive.delete_after_extraction,
        },
    ));

    let crawler = ArchiveCrawler::new(
        index,
        downloader,
        pipeline,
        checkpoint,
        shutdown,
        config.archive.base_url.clone(),
        config.archive.date_filter.clone(),
        config.archive.parallel_archives,
    );

    match crawler.crawl().await {
        Ok(()) => {
            tracing::info!("Archive crawl completed");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Archive crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the default mode: orchestrate per-site crawl jobs
async fn handle_crawl(
    config: &Config,
    config_path: &Path,
    shutdown: ShutdownCoordinator,
    resume: bool,
) -> anyhow::Result<()> {
    let Some(job_command) = &config.crawler.job_command else {
        anyhow::bail!("crawler.job-command must be set to orchestrate site jobs");
    };

    let site_list_path = Path::new(&config.crawler.site_list_path);
    let sites = load_site_list(site_list_path)?;
    tracing::info!("site list holds {} sites", sites.base_urls.len());

    let orchestrator = Orchestrator::new(
        config_path,
        site_list_path,
        sites,
        Arc::new(CommandJobExecutor::new(job_command.clone())),
        shutdown,
        config.crawler.number_of_parallel_crawlers,
        config.crawler.number_of_parallel_daemons,
        resume,
    );

    match orchestrator.run().await {
        Ok(()) => {
            tracing::info!("Orchestration completed");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Orchestration failed: {}", e);
            Err(e.into())
        }
    }
}
