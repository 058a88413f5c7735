use crate::engine::HiveEngine;
use crate::handle::OpenKey;
use anyhow::Result;

pub fn build<E: HiveEngine>(key: &OpenKey<'_, E>) -> Result<()> {
    key.touch_subkey("no-subkeys")?;

    let single = key.create_subkey("with-single-level-subkey")?;
    single.touch_subkey("subkey")?;
    single.close()?;

    let outer = key.create_subkey("with-two-levels-of-subkeys")?;
    let inner = outer.create_subkey("subkey1")?;
    inner.touch_subkey("subkey2")?;
    inner.close()?;
    outer.close()?;

    Ok(())
}
