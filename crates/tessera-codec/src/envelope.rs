//! The two envelope types carried inside a frame's body, and the codec that
//! (de)serializes them to bytes.
//!
//! `Request.payload` and `Response.payload` are themselves opaque to this
//! layer — they hold whatever a registered [`crate::serializer::Serializer`]
//! produced. This module only knows the envelope shell.

use std::collections::HashMap;

use bytes::{Bytes, BytesMut};

use crate::{
    errors::Result,
    wire::{BufExt, BufMutExt},
};

/// An outbound call: routing info, caller metadata, and an already-serialized
/// user payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// `/service/method`, looked up by the server's dispatcher.
    pub service_path: String,
    /// User-codec-encoded method argument.
    pub payload: Bytes,
    /// Per-call key→bytes metadata (auth tokens, trace ids, user data).
    pub metadata: HashMap<String, Bytes>,
}

/// A call's result: either a user-codec-encoded return value (`ret_code ==
/// 0`) or a framework/user error surfaced as `ret_code`/`ret_msg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// User-codec-encoded return value. Empty when `ret_code != 0`.
    pub payload: Bytes,
    /// `0` on success; otherwise a framework error code or an
    /// application-defined non-zero code.
    pub ret_code: i32,
    /// Human-readable error detail; empty on success.
    pub ret_msg: String,
}

impl Response {
    /// Build a success response wrapping an already-encoded payload.
    #[must_use]
    pub fn ok(payload: Bytes) -> Self {
        Self { payload, ret_code: 0, ret_msg: String::new() }
    }

    /// Build an error response carrying no payload.
    #[must_use]
    pub fn error(ret_code: i32, ret_msg: impl Into<String>) -> Self {
        Self { payload: Bytes::new(), ret_code, ret_msg: ret_msg.into() }
    }

    /// Whether this response represents success (`ret_code == 0`).
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.ret_code == 0
    }
}

/// Encodes/decodes [`Request`]/[`Response`] to/from the frame body.
///
/// Implementations are registered in an envelope [`crate::registry::CodecRegistry`]
/// under a tag string (e.g. `"proto"`), independently of the payload
/// [`crate::serializer::Serializer`] registry — the two layers never share a
/// namespace.
pub trait EnvelopeCodec: Send + Sync {
    /// Serialize a request envelope.
    fn encode_request(&self, req: &Request) -> Result<Bytes>;
    /// Parse a request envelope.
    fn decode_request(&self, buf: &[u8]) -> Result<Request>;
    /// Serialize a response envelope.
    fn encode_response(&self, resp: &Response) -> Result<Bytes>;
    /// Parse a response envelope.
    fn decode_response(&self, buf: &[u8]) -> Result<Response>;
}

/// The default envelope codec: a hand-rolled, length-prefixed big-endian
/// binary layout. Registered under the tag `"proto"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryEnvelopeCodec;

impl EnvelopeCodec for BinaryEnvelopeCodec {
    fn encode_request(&self, req: &Request) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(64 + req.payload.len());
        buf.put_str_field(&req.service_path);
        buf.put_bytes_field(&req.payload);
        buf.put_metadata(&req.metadata);
        Ok(buf.freeze())
    }

    fn decode_request(&self, buf: &[u8]) -> Result<Request> {
        let mut cursor = buf;
        let service_path = cursor.try_str_field()?;
        let payload = cursor.try_bytes_field()?;
        let metadata = cursor.try_metadata()?;
        Ok(Request { service_path, payload, metadata })
    }

    fn encode_response(&self, resp: &Response) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(32 + resp.payload.len() + resp.ret_msg.len());
        buf.put_bytes_field(&resp.payload);
        buf.put_i32(resp.ret_code);
        buf.put_str_field(&resp.ret_msg);
        Ok(buf.freeze())
    }

    fn decode_response(&self, buf: &[u8]) -> Result<Response> {
        let mut cursor = buf;
        let payload = cursor.try_bytes_field()?;
        if cursor.len() < 4 {
            return Err(crate::errors::CodecError::InvalidLength);
        }
        let ret_code = {
            use bytes::Buf;
            cursor.get_i32()
        };
        let ret_msg = cursor.try_str_field()?;
        Ok(Response { payload, ret_code, ret_msg })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips() {
        let codec = BinaryEnvelopeCodec;
        let mut metadata = HashMap::new();
        metadata.insert("authorization".to_owned(), Bytes::from_static(b"Bearer abc"));
        let req = Request {
            service_path: "/Calculator/Calculate".to_owned(),
            payload: Bytes::from_static(b"\x01\x02\x03"),
            metadata,
        };
        let encoded = codec.encode_request(&req).unwrap();
        let decoded = codec.decode_request(&encoded).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn response_round_trips_ok() {
        let codec = BinaryEnvelopeCodec;
        let resp = Response::ok(Bytes::from_static(b"result"));
        let encoded = codec.encode_response(&resp).unwrap();
        let decoded = codec.decode_response(&encoded).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn response_round_trips_error() {
        let codec = BinaryEnvelopeCodec;
        let resp = Response::error(42, "divide by zero");
        let encoded = codec.encode_response(&resp).unwrap();
        let decoded = codec.decode_response(&encoded).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn decode_rejects_truncated_buffer() {
        let codec = BinaryEnvelopeCodec;
        let req = Request {
            service_path: "/A/B".to_owned(),
            payload: Bytes::from_static(b"x"),
            metadata: HashMap::new(),
        };
        let encoded = codec.encode_request(&req).unwrap();
        let truncated = &encoded[..encoded.len() - 2];
        assert!(codec.decode_request(truncated).is_err());
    }
}
