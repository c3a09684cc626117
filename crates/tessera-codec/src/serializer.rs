//! Payload serializer registry (codec registry "B"): (de)serializes the
//! user-level request argument / return value carried inside an envelope's
//! `payload` field. Independent of [`crate::envelope::EnvelopeCodec`].
//!
//! Serializers are looked up dynamically by tag (`"json"`, `"msgpack"`,
//! `"proto"`) but the actual (de)serialize call is always generic over a
//! concrete `T` known at the call site — there's no value in an
//! object-safe `dyn Serializer`, since nothing ever holds one without also
//! knowing `T`. [`Serializer`] is therefore a closed, tag-dispatched enum
//! rather than a trait object, matching how few concrete wire formats this
//! crate ships.

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};

use crate::errors::{CodecError, Result};

/// A registered payload (de)serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serializer {
    /// `serde_json`, tag `"json"`.
    Json,
    /// `rmp-serde` (`MessagePack`), tag `"msgpack"`.
    Msgpack,
    /// `bincode`, tag `"proto"` (the default). Stands in for a schema-less
    /// binary codec; see `DESIGN.md` for why this isn't a real Protocol
    /// Buffers implementation.
    Binary,
}

impl Serializer {
    /// Resolve a serializer by its registry tag.
    #[must_use]
    pub fn by_tag(tag: &str) -> Option<Self> {
        match tag {
            "json" => Some(Self::Json),
            "msgpack" => Some(Self::Msgpack),
            "proto" => Some(Self::Binary),
            _ => None,
        }
    }

    /// The registry tag this serializer is registered under.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Msgpack => "msgpack",
            Self::Binary => "proto",
        }
    }

    /// Encode `value` to bytes.
    pub fn serialize<T: Serialize>(self, value: &T) -> Result<Bytes> {
        let bytes = match self {
            Self::Json => serde_json::to_vec(value).map_err(|e| CodecError::Serialize(e.to_string()))?,
            Self::Msgpack => {
                rmp_serde::to_vec(value).map_err(|e| CodecError::Serialize(e.to_string()))?
            }
            Self::Binary => {
                bincode::serialize(value).map_err(|e| CodecError::Serialize(e.to_string()))?
            }
        };
        Ok(Bytes::from(bytes))
    }

    /// Decode bytes into a concrete type.
    pub fn deserialize<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T> {
        match self {
            Self::Json => serde_json::from_slice(bytes).map_err(|e| CodecError::Deserialize(e.to_string())),
            Self::Msgpack => {
                rmp_serde::from_slice(bytes).map_err(|e| CodecError::Deserialize(e.to_string()))
            }
            Self::Binary => {
                bincode::deserialize(bytes).map_err(|e| CodecError::Deserialize(e.to_string()))
            }
        }
    }
}

impl Default for Serializer {
    /// Matches `ClientOptions::serialization_type`'s default.
    fn default() -> Self {
        Self::Binary
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct CalcArgs {
        op: String,
        num1: i64,
        num2: i64,
    }

    fn sample() -> CalcArgs {
        CalcArgs { op: "multiply".to_owned(), num1: 6, num2: 7 }
    }

    #[test]
    fn json_round_trips() {
        let encoded = Serializer::Json.serialize(&sample()).unwrap();
        let decoded: CalcArgs = Serializer::Json.deserialize(&encoded).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn msgpack_round_trips() {
        let encoded = Serializer::Msgpack.serialize(&sample()).unwrap();
        let decoded: CalcArgs = Serializer::Msgpack.deserialize(&encoded).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn binary_round_trips() {
        let encoded = Serializer::Binary.serialize(&sample()).unwrap();
        let decoded: CalcArgs = Serializer::Binary.deserialize(&encoded).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn by_tag_resolves_known_tags() {
        assert_eq!(Serializer::by_tag("json"), Some(Serializer::Json));
        assert_eq!(Serializer::by_tag("msgpack"), Some(Serializer::Msgpack));
        assert_eq!(Serializer::by_tag("proto"), Some(Serializer::Binary));
        assert_eq!(Serializer::by_tag("xml"), None);
    }

    #[test]
    fn default_matches_proto_tag() {
        assert_eq!(Serializer::default().tag(), "proto");
    }
}
