//! Fuzz target for `FrameHeader::from_bytes` / `FrameReader::read_frame`.
//!
//! Exercises header parsing with arbitrary byte sequences to find parser
//! panics, integer overflows in the length field, or buffer over-reads.
//! Invalid input must return an `Err`, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tessera_proto::FrameHeader;

fuzz_target!(|data: &[u8]| {
    let _ = FrameHeader::from_bytes(data);
});
