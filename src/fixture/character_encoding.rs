use crate::engine::HiveEngine;
use crate::handle::OpenKey;
use anyhow::Result;

/// German umlauts. Latin-1 names are stored with one byte per character.
pub const LATIN1_NAME: &str = "\u{e4}\u{f6}\u{fc}";

/// FULLWIDTH LATIN CAPITAL/SMALL LETTER A. Names inside the Basic
/// Multilingual Plane compare case-insensitively, so only one key survives.
pub const BMP_PAIR: [&str; 2] = ["\u{ff21}", "\u{ff41}"];

/// DESERET CAPITAL/SMALL LETTER LONG I. Outside the BMP no case folding takes
/// place and both keys are created.
pub const SUPPLEMENTARY_PAIR: [&str; 2] = ["\u{10410}", "\u{10438}"];

pub fn build<E: HiveEngine>(key: &OpenKey<'_, E>) -> Result<()> {
    key.touch_subkey(LATIN1_NAME)?;
    for name in BMP_PAIR.iter().chain(&SUPPLEMENTARY_PAIR) {
        key.touch_subkey(name)?;
    }
    Ok(())
}
