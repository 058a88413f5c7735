//! Writes the complete test hive.
//!
//! Creates the root, builds every scenario below its own subkey in a fixed
//! order and saves the result over any previous output file.
use crate::engine::{EngineKind, HiveEngine, OsVersion};
use crate::fixture::Scenario;
use crate::handle::OpenKey;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default output file, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "testhive";

/// Resolved settings for one writer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    pub output: PathBuf,
    pub engine: EngineKind,
    pub os_version: OsVersion,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            engine: EngineKind::Offreg,
            os_version: OsVersion::default(),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub output: PathBuf,
    pub engine: &'static str,
    pub scenarios: Vec<&'static str>,
}

/// Builds every scenario with `engine` and saves the hive to `output`.
pub fn write_test_hive<E: HiveEngine>(
    engine: &E,
    output: &Path,
    os_version: OsVersion,
) -> Result<WriteSummary> {
    let root = OpenKey::create_hive(engine)?;
    let mut scenarios = Vec::with_capacity(Scenario::ALL.len());

    for scenario in Scenario::ALL {
        let name = scenario.key_name();
        let key = root.create_subkey(name)?;
        scenario
            .build(&key)
            .with_context(|| format!("build scenario {name}"))?;
        key.close()?;
        tracing::info!(scenario = name, "scenario written");
        scenarios.push(name);
    }

    // Rewrite the hive file from scratch.
    prepare_output(output)?;
    engine
        .save_hive(root.handle()?, output, os_version)
        .with_context(|| format!("save hive to {}", output.display()))?;
    root.close()?;

    Ok(WriteSummary {
        output: output.to_path_buf(),
        engine: engine.name(),
        scenarios,
    })
}

/// Removes a previous output file and creates missing parent directories.
fn prepare_output(output: &Path) -> Result<()> {
    match fs::remove_file(output) {
        Ok(()) => tracing::debug!(path = %output.display(), "removed previous output"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("remove {}", output.display()));
        }
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}
