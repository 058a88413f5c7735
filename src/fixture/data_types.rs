use crate::engine::{HiveEngine, ValueType};
use crate::handle::OpenKey;
use anyhow::Result;

const STRING_TEST_DATA: &str = "sz-test";
const MULTI_STRING_TEST_DATA: [&str; 2] = ["multi-sz-test", "line2"];
const DWORD_TEST_DATA: u32 = 42;
const QWORD_TEST_DATA: u64 = u64::MAX;
const BINARY_TEST_DATA: [u8; 5] = [1, 2, 3, 4, 5];

pub struct DataValue {
    pub name: &'static str,
    pub value_type: ValueType,
    pub data: Vec<u8>,
}

fn utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// `REG_MULTI_SZ` payload: every string NUL-terminated, followed by the empty
/// string that ends the list.
fn multi_string(strings: &[&str]) -> Vec<u8> {
    let mut data = Vec::new();
    for string in strings {
        data.extend(utf16le(string));
        data.extend([0, 0]);
    }
    data.extend([0, 0]);
    data
}

/// The values of the data scenario, in write order.
pub fn data_values() -> Vec<DataValue> {
    let string = utf16le(STRING_TEST_DATA);
    let mut string_with_nul = string.clone();
    string_with_nul.extend([0, 0]);

    vec![
        DataValue {
            name: "reg-sz",
            value_type: ValueType::RegSz,
            data: string.clone(),
        },
        DataValue {
            name: "reg-sz-with-terminating-nul",
            value_type: ValueType::RegSz,
            data: string_with_nul,
        },
        // Stored unexpanded, expansion is up to the reader.
        DataValue {
            name: "reg-expand-sz",
            value_type: ValueType::RegExpandSz,
            data: string,
        },
        DataValue {
            name: "reg-multi-sz",
            value_type: ValueType::RegMultiSz,
            data: multi_string(&MULTI_STRING_TEST_DATA),
        },
        DataValue {
            name: "dword",
            value_type: ValueType::RegDword,
            data: DWORD_TEST_DATA.to_le_bytes().to_vec(),
        },
        DataValue {
            name: "dword-big-endian",
            value_type: ValueType::RegDwordBigEndian,
            data: DWORD_TEST_DATA.to_be_bytes().to_vec(),
        },
        DataValue {
            name: "qword",
            value_type: ValueType::RegQword,
            data: QWORD_TEST_DATA.to_le_bytes().to_vec(),
        },
        DataValue {
            name: "binary",
            value_type: ValueType::RegBinary,
            data: BINARY_TEST_DATA.to_vec(),
        },
    ]
}

pub fn build<E: HiveEngine>(key: &OpenKey<'_, E>) -> Result<()> {
    for value in data_values() {
        key.set_value(value.name, value.value_type, &value.data)?;
    }
    Ok(())
}
