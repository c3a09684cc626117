//! Fuzz target for `BinaryEnvelopeCodec::decode_request`/`decode_response`.
//!
//! Arbitrary bytes are fed straight to both decoders (no valid frame header
//! needed — the envelope codec operates on the frame body only). Malformed
//! input must return an `Err`, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tessera_codec::{BinaryEnvelopeCodec, EnvelopeCodec};

fuzz_target!(|data: &[u8]| {
    let codec = BinaryEnvelopeCodec;
    let _ = codec.decode_request(data);
    let _ = codec.decode_response(data);
});
