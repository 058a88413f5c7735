//! Key name collation of the regf format.
//!
//! Names are compared as UTF-16 code units after upper-casing each unit on
//! its own. A surrogate half has no case mapping, so characters outside the
//! Basic Multilingual Plane are always compared exactly.
use std::cmp::Ordering;

/// Upper-cases a single UTF-16 code unit.
///
/// Mappings that expand to more than one character or leave the BMP keep the
/// unit unchanged.
pub fn fold_unit(unit: u16) -> u16 {
    let Some(ch) = char::from_u32(u32::from(unit)) else {
        return unit;
    };
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => u16::try_from(u32::from(single)).unwrap_or(unit),
        _ => unit,
    }
}

pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.encode_utf16()
        .map(fold_unit)
        .cmp(b.encode_utf16().map(fold_unit))
}

pub fn names_equal(a: &str, b: &str) -> bool {
    compare_names(a, b) == Ordering::Equal
}
