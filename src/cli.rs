//! CLI argument parsing for the test hive writer.
//!
//! Every flag has a default, so a bare invocation writes `testhive` in the
//! working directory the way the reader's test suite expects it.
use crate::engine::{EngineKind, OsVersion};
use crate::writer::{WriterConfig, DEFAULT_OUTPUT};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "testhive-writer",
    version,
    about = "Write a registry hive that exercises the edge cases of the regf format",
    after_help = "Examples:\n  testhive-writer\n  testhive-writer --output testdata/testhive\n  testhive-writer --engine memory --output testhive.json"
)]
pub struct RootArgs {
    /// Output file, replaced on every successful run
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Hive engine used to build and save the hive
    #[arg(long, value_enum, default_value_t = EngineKind::Offreg)]
    pub engine: EngineKind,

    /// Target Windows version passed to the save routine
    #[arg(long, value_name = "MAJOR.MINOR", default_value = "6.1")]
    pub os_version: OsVersion,

    /// Emit debug logging for every key and value written
    #[arg(short, long)]
    pub verbose: bool,
}

impl RootArgs {
    pub fn writer_config(&self) -> WriterConfig {
        WriterConfig {
            output: self.output.clone(),
            engine: self.engine,
            os_version: self.os_version,
        }
    }
}
