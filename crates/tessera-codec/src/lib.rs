//! Envelope and payload serializer registries for the Tessera RPC wire
//! format's two independent codec layers.
//!
//! - Registry A ([`ENVELOPE_CODECS`]): how a [`Request`]/[`Response`] itself
//!   is turned into the bytes carried in a frame's body.
//! - Registry B: how the user-level argument/return value inside a
//!   `Request`/`Response`'s `payload` field is turned into bytes. Unlike
//!   registry A, this one is a closed set ([`Serializer`]) rather than a
//!   registry of trait objects, since payload formats are a handful of
//!   concrete wire encodings rather than an open extension point.

mod envelope;
mod errors;
mod registry;
mod serializer;
mod wire;

use std::sync::Arc;

pub use envelope::{BinaryEnvelopeCodec, EnvelopeCodec, Request, Response};
pub use errors::{CodecError, Result};
pub use registry::CodecRegistry;
pub use serializer::Serializer;

/// Global envelope codec registry (registry A). Populated by
/// [`register_defaults`]; applications may register additional envelope
/// codecs before the first `serve`/`invoke`.
pub static ENVELOPE_CODECS: CodecRegistry<dyn EnvelopeCodec> = CodecRegistry::new();

/// Registers the built-in `"proto"` envelope codec. Idempotent: a second
/// call observes [`CodecError::DuplicateTag`] and ignores it, since
/// re-registering the same default is harmless.
pub fn register_defaults() {
    let codec: Arc<dyn EnvelopeCodec> = Arc::new(BinaryEnvelopeCodec);
    if ENVELOPE_CODECS.register("proto", codec).is_err() {
        // Already registered by an earlier call or another entry point in
        // the same process; the existing registration stands.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_defaults_is_idempotent() {
        register_defaults();
        register_defaults();
        assert!(ENVELOPE_CODECS.get("proto").is_ok());
    }
}
