// crates/moderntensor-core/src/encoding.rs
//
// Serde helpers for opaque byte fields (uids, endpoints, wallet hashes).
//
// Bytes that are valid UTF-8 serialize as plain strings; anything else
// serializes as "0x"-prefixed hex. On input, a "0x"-prefixed string of valid
// hex is decoded as hex and every other string is taken as its UTF-8 bytes.

use serde::{Deserialize, Deserializer, Serializer};

fn encode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) if !text.starts_with("0x") => text.to_string(),
        _ => format!("0x{}", hex::encode(bytes)),
    }
}

fn decode(text: String) -> Vec<u8> {
    if let Some(stripped) = text.strip_prefix("0x") {
        if let Ok(bytes) = hex::decode(stripped) {
            return bytes;
        }
    }
    text.into_bytes()
}

/// `#[serde(with = "text_bytes")]` for `Vec<u8>`.
pub mod text_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Ok(decode(String::deserialize(deserializer)?))
    }
}

/// `#[serde(with = "text_bytes_vec")]` for `Vec<Vec<u8>>`.
pub mod text_bytes_vec {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer>(items: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(&encode(item))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(decode).collect())
    }
}
