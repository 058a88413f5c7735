//! Hive engine capability surface.
//!
//! The writer never builds hive cells itself. It drives an engine through the
//! [`HiveEngine`] trait and relies on it for allocation, Big Data chaining,
//! subkey indexes and the final save.
mod dl;
mod memory;
mod offreg;

pub use memory::MemoryHive;
#[cfg(test)]
pub use memory::{HiveSnapshot, KeySnapshot, MemoryKey};
pub use offreg::OffregEngine;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// `REG_OPTION_NON_VOLATILE`
pub const REG_OPTION_NON_VOLATILE: u32 = 0;

/// Registry value data types written by the fixture scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    RegSz,
    RegExpandSz,
    RegBinary,
    RegDword,
    RegDwordBigEndian,
    RegMultiSz,
    RegQword,
}

impl ValueType {
    /// Numeric type tag as stored in a Key Value cell.
    pub fn tag(self) -> u32 {
        match self {
            Self::RegSz => 1,
            Self::RegExpandSz => 2,
            Self::RegBinary => 3,
            Self::RegDword => 4,
            Self::RegDwordBigEndian => 5,
            Self::RegMultiSz => 7,
            Self::RegQword => 11,
        }
    }
}

/// Options passed along with every key creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOptions {
    pub flags: u32,
}

impl KeyOptions {
    pub const fn non_volatile() -> Self {
        Self {
            flags: REG_OPTION_NON_VOLATILE,
        }
    }
}

impl Default for KeyOptions {
    fn default() -> Self {
        Self::non_volatile()
    }
}

/// Target Windows version handed to the save routine.
///
/// The engine derives the hive format minor version from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
}

impl OsVersion {
    /// Windows 7, the version the fixture has always been written for.
    pub const WINDOWS_7: Self = Self { major: 6, minor: 1 };
}

impl Default for OsVersion {
    fn default() -> Self {
        Self::WINDOWS_7
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for OsVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| format!("expected MAJOR.MINOR, got {s:?}"))?;
        let major = major
            .parse()
            .map_err(|_| format!("invalid major version {major:?}"))?;
        let minor = minor
            .parse()
            .map_err(|_| format!("invalid minor version {minor:?}"))?;
        Ok(Self { major, minor })
    }
}

/// Engine implementations selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Windows Offline Registry Library (offreg.dll)
    Offreg,
    /// In-process engine that saves a JSON snapshot of the logical tree
    Memory,
}

impl EngineKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Offreg => "offreg",
            Self::Memory => "memory",
        }
    }
}

/// Failures reported by a hive engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("hive engine unavailable: {0}")]
    Unavailable(String),

    #[error("{op} failed with error {code}")]
    Call { op: &'static str, code: u32 },

    #[error("saving the hive failed with error {code}")]
    Persist { code: u32 },

    #[error("name {0:?} contains a NUL character")]
    InvalidName(String),

    #[error("key handle {0} is not open")]
    UnknownHandle(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Capability surface of a hive engine.
///
/// Calls are synchronous. Every handle returned by [`HiveEngine::create_hive`]
/// or [`HiveEngine::create_key`] must be passed to [`HiveEngine::close_key`]
/// exactly once; [`crate::handle::OpenKey`] takes care of that.
pub trait HiveEngine {
    type Handle;

    /// Short name used in log output.
    fn name(&self) -> &'static str;

    fn create_hive(&self) -> Result<Self::Handle, EngineError>;

    /// Creates `name` under `parent`, or opens it if a sibling with an equal
    /// name (under the format's collation) already exists.
    fn create_key(
        &self,
        parent: &Self::Handle,
        name: &str,
        options: KeyOptions,
    ) -> Result<Self::Handle, EngineError>;

    fn set_value(
        &self,
        key: &Self::Handle,
        name: &str,
        value_type: ValueType,
        data: &[u8],
    ) -> Result<(), EngineError>;

    fn close_key(&self, handle: Self::Handle) -> Result<(), EngineError>;

    fn save_hive(
        &self,
        root: &Self::Handle,
        path: &Path,
        version: OsVersion,
    ) -> Result<(), EngineError>;
}
