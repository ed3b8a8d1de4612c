use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const REG_NONE: u32 = 0;
pub const REG_SZ: u32 = 1;
pub const REG_EXPAND_SZ: u32 = 2;
pub const REG_BINARY: u32 = 3;
pub const REG_DWORD: u32 = 4;
pub const REG_DWORD_BIG_ENDIAN: u32 = 5;
pub const REG_MULTI_SZ: u32 = 7;
pub const REG_QWORD: u32 = 11;

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_OFFSET: i64 = 11_644_473_600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryValue {
    pub name: String,
    pub data: Value,
    #[serde(rename = "type")]
    pub value_type: u32,
    #[serde(skip)]
    pub last_write_time: Option<DateTime<Utc>>,
}

impl RegistryValue {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(Default)"
        } else {
            &self.name
        }
    }
}

fn utf16_units(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

fn hex(data: &[u8]) -> Value {
    Value::String(data.iter().map(|b| format!("{:02x}", b)).collect())
}

/// Decodes raw value bytes as returned by the wide-character registry API.
pub fn decode_value(value_type: u32, data: &[u8]) -> Value {
    match value_type {
        REG_SZ | REG_EXPAND_SZ => {
            let text = String::from_utf16_lossy(&utf16_units(data));
            Value::String(text.trim_end_matches('\0').to_string())
        }
        REG_MULTI_SZ => Value::Array(
            String::from_utf16_lossy(&utf16_units(data))
                .split('\0')
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        ),
        REG_DWORD if data.len() >= 4 => {
            Value::from(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
        }
        REG_DWORD_BIG_ENDIAN if data.len() >= 4 => {
            Value::from(u32::from_be_bytes([data[0], data[1], data[2], data[3]]))
        }
        REG_QWORD if data.len() >= 8 => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&data[..8]);
            Value::from(u64::from_le_bytes(bytes))
        }
        _ => hex(data),
    }
}

pub fn filetime_to_datetime(low: u32, high: u32) -> Option<DateTime<Utc>> {
    let ticks = ((high as u64) << 32) | low as u64;
    if ticks == 0 {
        return None;
    }
    let seconds = (ticks / 10_000_000) as i64 - FILETIME_UNIX_OFFSET;
    let nanos = ((ticks % 10_000_000) * 100) as u32;
    DateTime::<Utc>::from_timestamp(seconds, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wide(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    #[test]
    fn decodes_strings() {
        assert_eq!(decode_value(REG_SZ, &wide("C:\\Program Files\0")), json!("C:\\Program Files"));
        assert_eq!(decode_value(REG_EXPAND_SZ, &wide("%APPDATA%\0")), json!("%APPDATA%"));
        assert_eq!(decode_value(REG_MULTI_SZ, &wide("a\0b\0\0")), json!(["a", "b"]));
    }

    #[test]
    fn decodes_numbers() {
        assert_eq!(decode_value(REG_DWORD, &1u32.to_le_bytes()), json!(1));
        assert_eq!(decode_value(REG_DWORD_BIG_ENDIAN, &[0, 0, 1, 0]), json!(256));
        assert_eq!(decode_value(REG_QWORD, &u64::MAX.to_le_bytes()), json!(u64::MAX));
    }

    #[test]
    fn binary_and_malformed_values_become_hex() {
        assert_eq!(decode_value(REG_BINARY, &[0xde, 0xad]), json!("dead"));
        assert_eq!(decode_value(REG_DWORD, &[1, 2]), json!("0102"));
        assert_eq!(decode_value(REG_NONE, &[]), json!(""));
    }

    #[test]
    fn filetime_converts_to_utc() {
        // 2021-01-01T00:00:00Z
        let ticks: u64 = (1_609_459_200 + 11_644_473_600) * 10_000_000;
        let dt = filetime_to_datetime(ticks as u32, (ticks >> 32) as u32).unwrap();
        assert_eq!(dt.to_rfc3339(), "2021-01-01T00:00:00+00:00");
        assert!(filetime_to_datetime(0, 0).is_none());
    }

    #[test]
    fn serializes_type_field() {
        let value = RegistryValue {
            name: String::new(),
            data: json!("x"),
            value_type: REG_SZ,
            last_write_time: None,
        };
        assert_eq!(value.display_name(), "(Default)");
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"name": "", "data": "x", "type": 1})
        );
    }
}
