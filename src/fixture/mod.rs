//! Fixture scenarios written below the hive root.
//!
//! Each scenario fills one subkey of the root with a payload aimed at a
//! single structural edge case of the regf format. Scenarios are independent
//! and are written in [`Scenario::ALL`] order so the output is reproducible.
mod big_data;
mod character_encoding;
mod data_types;
mod subkeys;
mod subpath;

use crate::engine::HiveEngine;
use crate::handle::OpenKey;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Values on both sides of the single-cell capacity.
    BigData,
    /// Key names probing Latin-1 storage and case folding.
    CharacterEncoding,
    /// One value per supported data type.
    Data,
    /// Enough subkeys to force an Index Root.
    Subkeys,
    /// Keys nested zero, one and two levels deep.
    Subpath,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::BigData,
        Scenario::CharacterEncoding,
        Scenario::Data,
        Scenario::Subkeys,
        Scenario::Subpath,
    ];

    /// Name of the root subkey holding this scenario.
    pub fn key_name(self) -> &'static str {
        match self {
            Scenario::BigData => "big-data-test",
            Scenario::CharacterEncoding => "character-encoding-test",
            Scenario::Data => "data-test",
            Scenario::Subkeys => "subkey-test",
            Scenario::Subpath => "subpath-test",
        }
    }

    /// Populates `key` with this scenario's payload.
    ///
    /// Every handle opened here is closed before returning, also on error.
    pub fn build<E: HiveEngine>(self, key: &OpenKey<'_, E>) -> Result<()> {
        match self {
            Scenario::BigData => big_data::build(key),
            Scenario::CharacterEncoding => character_encoding::build(key),
            Scenario::Data => data_types::build(key),
            Scenario::Subkeys => subkeys::build(key),
            Scenario::Subpath => subpath::build(key),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Scenario;
    use crate::engine::{KeySnapshot, MemoryHive, OsVersion};
    use crate::handle::OpenKey;

    /// Runs one scenario against a fresh memory engine and returns the
    /// resulting scenario key.
    pub fn build_scenario(scenario: Scenario) -> KeySnapshot {
        let engine = MemoryHive::new();
        let root = OpenKey::create_hive(&engine).expect("create hive");
        let key = root
            .create_subkey(scenario.key_name())
            .expect("create scenario key");
        scenario.build(&key).expect("build scenario");
        key.close().expect("close scenario key");
        assert_eq!(engine.open_handles(), 1, "only the root may stay open");

        let snapshot = engine
            .snapshot(root.handle().expect("root handle"), OsVersion::default())
            .expect("snapshot");
        snapshot
            .root
            .subkey(scenario.key_name())
            .cloned()
            .expect("scenario key present")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn scenario_key_names_are_distinct() {
        let names: BTreeSet<_> = Scenario::ALL.iter().map(|s| s.key_name()).collect();
        assert_eq!(names.len(), Scenario::ALL.len());
    }

    #[test]
    fn scenarios_run_in_fixed_order() {
        let names: Vec<_> = Scenario::ALL.iter().map(|s| s.key_name()).collect();
        assert_eq!(
            names,
            [
                "big-data-test",
                "character-encoding-test",
                "data-test",
                "subkey-test",
                "subpath-test"
            ]
        );
    }
}
