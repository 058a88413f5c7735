use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod collation;
mod engine;
mod fixture;
mod handle;
mod writer;

use cli::RootArgs;
use engine::{EngineKind, MemoryHive, OffregEngine};
use writer::{write_test_hive, WriterConfig};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);
    run(&args.writer_config())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "testhive_writer=debug"
    } else {
        "testhive_writer=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(config: &WriterConfig) -> Result<()> {
    tracing::info!(
        engine = config.engine.name(),
        output = %config.output.display(),
        os_version = %config.os_version,
        "writing test hive"
    );

    // Engine-Unavailable is reported before any key is created.
    let summary = match config.engine {
        EngineKind::Offreg => {
            let engine = OffregEngine::load().context("load the Offline Registry Library")?;
            write_test_hive(&engine, &config.output, config.os_version)?
        }
        EngineKind::Memory => {
            write_test_hive(&MemoryHive::new(), &config.output, config.os_version)?
        }
    };

    tracing::info!(
        engine = summary.engine,
        scenarios = summary.scenarios.len(),
        "wrote {}",
        summary.output.display()
    );
    Ok(())
}
