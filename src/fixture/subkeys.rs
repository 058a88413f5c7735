use crate::engine::HiveEngine;
use crate::handle::OpenKey;
use anyhow::Result;

/// More subkeys than a single leaf list of the Offline Registry Library
/// holds, so the engine has to write an Index Root.
pub const SUBKEY_COUNT: usize = 512;

/// `Key<n>` for even and `key<n>` for odd `n`, so that lookups can prove
/// case-insensitivity across the whole index.
pub fn subkey_name(n: usize) -> String {
    let first_letter = if n % 2 == 0 { 'K' } else { 'k' };
    format!("{first_letter}ey{n}")
}

pub fn build<E: HiveEngine>(key: &OpenKey<'_, E>) -> Result<()> {
    for n in 0..SUBKEY_COUNT {
        key.touch_subkey(&subkey_name(n))?;
    }
    Ok(())
}
