//! Shared test infrastructure for integration tests.

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Snapshot written by `--engine memory`.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub schema_version: u32,
    pub os_version: OsVersion,
    pub root: Key,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Key {
    pub name: String,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub subkeys: Vec<Key>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Value {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub data: String,
}

impl Key {
    /// Case-insensitive lookup, matching ASCII names only.
    pub fn subkey(&self, name: &str) -> Option<&Key> {
        self.subkeys
            .iter()
            .find(|key| key.name.eq_ignore_ascii_case(name))
    }

    pub fn expect_subkey(&self, name: &str) -> &Key {
        self.subkey(name)
            .unwrap_or_else(|| panic!("missing subkey {name:?} under {:?}", self.name))
    }

    pub fn value(&self, name: &str) -> &Value {
        self.values
            .iter()
            .find(|value| value.name == name)
            .unwrap_or_else(|| panic!("missing value {name:?} under {:?}", self.name))
    }
}

impl Value {
    pub fn bytes(&self) -> Vec<u8> {
        BASE64.decode(&self.data).expect("base64 value data")
    }
}

/// A scratch directory the writer runs in.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn create() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Runs the writer with the working directory set to this workspace.
    pub fn run<I, S>(&self, args: I) -> Output
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        Command::new(env!("CARGO_BIN_EXE_testhive-writer"))
            .args(args)
            .current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("run testhive-writer")
    }

    /// Writes a snapshot with the memory engine and parses it.
    pub fn write_memory_snapshot(&self, rel: &str) -> Snapshot {
        let output = self.run(["--engine", "memory", "--output", rel]);
        assert!(
            output.status.success(),
            "writer failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        read_snapshot(&self.path(rel))
    }
}

pub fn read_snapshot(path: &Path) -> Snapshot {
    let bytes = std::fs::read(path).expect("read snapshot");
    serde_json::from_slice(&bytes).expect("parse snapshot")
}

pub fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).expect("valid utf-16")
}
