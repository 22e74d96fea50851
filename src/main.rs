use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use docscrape::{
    cli::Args,
    output::{control_output, FileSink},
    Config, ResponseCache, Session,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    let args = Args::parse();

    // ─── 1) init logging ─────────────────────────────────────────────
    let default_filter = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("scraper started");
    info!(?args, "command-line arguments");

    // ─── 2) run the job; failures end here, logged, with exit status 1 ──
    let outcome = run(&args);
    if let Err(e) = &outcome {
        error!(job = %args.mode, "job failed: {:#}", e);
    }
    info!("scraper finished");

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn run(args: &Args) -> Result<()> {
    let config = Config::load(args.config.as_deref()).context("loading config")?;

    let cache = if args.no_cache && !args.clear_cache {
        None
    } else {
        let cache = ResponseCache::open(&config.cache_dir).context("opening HTTP cache")?;
        if args.clear_cache {
            cache.clear().context("clearing HTTP cache")?;
        }
        (!args.no_cache).then_some(cache)
    };
    let session = Session::new(&config.user_agent, cache)?;

    let table = args
        .mode
        .run(&session, &config)
        .with_context(|| format!("running {}", args.mode))?;

    if let Some(table) = table {
        let sink = FileSink {
            results_dir: &config.results_dir,
            datetime_format: &config.datetime_format,
        };
        control_output(&table, args.output.unwrap_or_default(), args.mode, &sink)
            .context("writing results")?;
    }
    Ok(())
}
