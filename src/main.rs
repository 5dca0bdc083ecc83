//! emotion-tts-batch CLI entry point.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use emotion_tts_batch::backend::{Backend, SynthesisOptions, create_backend};
use emotion_tts_batch::cli::{Args, Reference};
use emotion_tts_batch::engine::{BatchDriver, BatchLayout};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose)?;

    let layout = BatchLayout::from_args(&args);
    layout.check()?;

    let default_ref = args
        .default_ref
        .as_deref()
        .map(Reference::parse)
        .transpose()
        .context("Invalid --default-ref")?;

    let name = args.backend.name();
    let backend = create_backend(
        args.backend,
        &args.host,
        args.backend_port(),
        Duration::from_secs(args.timeout),
    )
    .with_context(|| format!("Failed to set up {name} client"))?;

    info!("Loading {name} model...");
    let health = backend
        .health()
        .with_context(|| format!("Error loading {name} model"))?;
    info!("{name} model loaded successfully! ({})", health.status);

    let references = layout.resolver_chain(default_ref, args.allow_unconditioned);
    let options = SynthesisOptions::default()
        .with_progress(args.show_progress)
        .with_seed(args.seed)
        .with_speed(args.speed);

    let driver = BatchDriver::new(backend, layout, references, options);
    let report = driver.run(&args.emotions);

    info!(
        "{name} batch processing completed! saved={} skipped={} failed={}",
        report.saved_count(),
        report.skipped_count(),
        report.failed_count()
    );

    if let Some(path) = &args.report {
        // Per-item outcomes never change the exit status
        match report.write_json(path) {
            Ok(()) => info!("Report written to: {}", path.display()),
            Err(e) => warn!("Failed to write report {}: {e}", path.display()),
        }
    }

    Ok(())
}
