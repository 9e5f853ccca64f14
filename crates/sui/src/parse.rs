//! Defensive decoders for raw on-chain field encodings.
//!
//! Move objects come back from the RPC as JSON-ish trees whose exact shape
//! depends on how the node rendered each field: a `0x1::string::String` may
//! arrive as a plain string, a byte array, or a `{ fields: { bytes } }`
//! wrapper. Every decoder here is total: unrecognized input yields an empty
//! or zero value, never an error.

use crate::constants::TOKEN_BASE_UNITS;
use serde_json::Value;

/// Convert a proto value from the gRPC `json` read mask to `serde_json`.
pub fn proto_to_json(value: &prost_types::Value) -> Value {
    match &value.kind {
        Some(prost_types::value::Kind::StringValue(s)) => Value::String(s.clone()),
        Some(prost_types::value::Kind::NumberValue(n)) => Value::Number(
            serde_json::Number::from_f64(*n).unwrap_or(serde_json::Number::from(0)),
        ),
        Some(prost_types::value::Kind::BoolValue(b)) => Value::Bool(*b),
        Some(prost_types::value::Kind::NullValue(_)) => Value::Null,
        Some(prost_types::value::Kind::ListValue(list)) => {
            Value::Array(list.values.iter().map(proto_to_json).collect())
        }
        Some(prost_types::value::Kind::StructValue(s)) => {
            let map: serde_json::Map<String, Value> = s
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), proto_to_json(v)))
                .collect();
            Value::Object(map)
        }
        None => Value::Null,
    }
}

/// Collect a JSON array of byte values into a `Vec<u8>`.
fn bytes_from_array(arr: &[Value]) -> Vec<u8> {
    arr.iter()
        .filter_map(|v| v.as_u64().map(|b| b as u8))
        .collect()
}

/// Decode a Move string field regardless of its wire rendering.
///
/// Accepts: absent input, an already-decoded string, a `vector<u8>` byte
/// array, a `{ fields: { bytes } }` String struct, or a `{ bytes }`
/// simplified view. Anything else decodes to `""`.
pub fn decode_move_string(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match value {
        Value::String(s) => s.clone(),
        Value::Array(arr) => String::from_utf8_lossy(&bytes_from_array(arr)).into_owned(),
        Value::Object(obj) => {
            let bytes = obj
                .get("fields")
                .and_then(|f| f.get("bytes"))
                .or_else(|| obj.get("bytes"));
            match bytes {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Array(arr)) => {
                    String::from_utf8_lossy(&bytes_from_array(arr)).into_owned()
                }
                _ => String::new(),
            }
        }
        _ => String::new(),
    }
}

/// Decode a `vector<address>` field; unrecognized shapes yield an empty list.
pub fn decode_address_vec(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Decode a u64 field that the node may render as a number or a string.
///
/// Proto `NumberValue` fields come through [`proto_to_json`] as f64-backed
/// numbers, for which `as_u64` returns `None`; round those instead of
/// collapsing them to zero.
pub fn decode_u64(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.round() as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

/// Decode an object id that may arrive as a plain string or an
/// `{ id: "0x.." }` wrapper (the shape of `event_id` on Submission objects).
pub fn decode_id(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(obj)) => obj
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Convert base units (MIST, or LIFE base units) to whole tokens.
pub fn mist_to_sui(mist: u64) -> f64 {
    mist as f64 / TOKEN_BASE_UNITS as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_move_string_totality() {
        assert_eq!(decode_move_string(None), "");
        assert_eq!(decode_move_string(Some(&Value::Null)), "");
        assert_eq!(decode_move_string(Some(&json!(42))), "");
        assert_eq!(decode_move_string(Some(&json!([]))), "");
        assert_eq!(decode_move_string(Some(&json!({ "unexpected": true }))), "");
    }

    #[test]
    fn test_decode_move_string_shapes() {
        assert_eq!(decode_move_string(Some(&json!("hello"))), "hello");

        let bytes: Vec<u8> = "quest".bytes().collect();
        assert_eq!(decode_move_string(Some(&json!(bytes))), "quest");

        assert_eq!(
            decode_move_string(Some(&json!({ "fields": { "bytes": "wrapped" } }))),
            "wrapped"
        );
        let wrapped_bytes: Vec<u8> = "wrapped".bytes().collect();
        assert_eq!(
            decode_move_string(Some(&json!({ "fields": { "bytes": wrapped_bytes } }))),
            "wrapped"
        );
        let plain_bytes: Vec<u8> = "plain".bytes().collect();
        assert_eq!(
            decode_move_string(Some(&json!({ "bytes": plain_bytes }))),
            "plain"
        );
    }

    #[test]
    fn test_decode_move_string_roundtrip_multibyte() {
        let text = "quête 任務 🏆";
        let bytes: Vec<u8> = text.bytes().collect();
        assert_eq!(decode_move_string(Some(&json!(bytes))), text);
    }

    #[test]
    fn test_decode_address_vec() {
        assert!(decode_address_vec(None).is_empty());
        assert!(decode_address_vec(Some(&json!("0xabc"))).is_empty());
        assert_eq!(
            decode_address_vec(Some(&json!(["0xabc", "0xdef"]))),
            vec!["0xabc".to_string(), "0xdef".to_string()]
        );
    }

    #[test]
    fn test_decode_u64() {
        assert_eq!(decode_u64(None), 0);
        assert_eq!(decode_u64(Some(&json!("12345"))), 12345);
        assert_eq!(decode_u64(Some(&json!(7))), 7);
        assert_eq!(decode_u64(Some(&json!("not a number"))), 0);
        assert_eq!(decode_u64(Some(&json!([1, 2]))), 0);
    }

    #[test]
    fn test_decode_u64_from_proto_number() {
        // The gRPC json read mask renders small integers as NumberValue, which
        // proto_to_json turns into f64-backed serde_json numbers. Those must
        // decode to their integer value, not collapse to 0.
        let status = prost_types::Value {
            kind: Some(prost_types::value::Kind::NumberValue(3.0)),
        };
        assert_eq!(decode_u64(Some(&proto_to_json(&status))), 3);

        let timestamp = prost_types::Value {
            kind: Some(prost_types::value::Kind::NumberValue(1_757_000_000_000.0)),
        };
        assert_eq!(decode_u64(Some(&proto_to_json(&timestamp))), 1_757_000_000_000);
    }

    #[test]
    fn test_decode_id() {
        assert_eq!(decode_id(Some(&json!("0x1"))), "0x1");
        assert_eq!(decode_id(Some(&json!({ "id": "0x2" }))), "0x2");
        assert_eq!(decode_id(None), "");
    }

    #[test]
    fn test_mist_to_sui() {
        assert_eq!(mist_to_sui(1_000_000_000), 1.0);
        assert_eq!(mist_to_sui(0), 0.0);
        assert_eq!(mist_to_sui(2_500_000_000), 2.5);
    }
}
