use crate::engine::{HiveEngine, ValueType};
use crate::handle::OpenKey;
use anyhow::Result;

/// Payload size at which a value no longer fits a single cell and the engine
/// has to chain it through a Big Data structure.
pub const BIG_DATA_THRESHOLD: usize = 16344;

pub struct BigDataValue {
    pub name: &'static str,
    pub fill: u8,
    pub len: usize,
}

pub const BIG_DATA_VALUES: [BigDataValue; 3] = [
    // Still fits into a single cell.
    BigDataValue {
        name: "A",
        fill: b'A',
        len: BIG_DATA_THRESHOLD - 1,
    },
    // Right at the threshold, still a single cell.
    BigDataValue {
        name: "B",
        fill: b'B',
        len: BIG_DATA_THRESHOLD,
    },
    // Must be stored as Big Data.
    BigDataValue {
        name: "C",
        fill: b'C',
        len: BIG_DATA_THRESHOLD + 1,
    },
];

pub fn build<E: HiveEngine>(key: &OpenKey<'_, E>) -> Result<()> {
    let mut data = Vec::with_capacity(BIG_DATA_THRESHOLD + 1);
    for value in &BIG_DATA_VALUES {
        data.clear();
        data.resize(value.len, value.fill);
        key.set_value(value.name, ValueType::RegBinary, &data)?;
    }
    Ok(())
}
