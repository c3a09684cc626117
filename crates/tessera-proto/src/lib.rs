//! Length-prefixed binary frame codec for the Tessera RPC wire format.
//!
//! A frame is an 11-byte header ([`FrameHeader`]) followed by exactly
//! `payload_len` bytes. This crate only knows about that outer shell; the
//! payload itself is opaque to it (it is an envelope-codec-encoded
//! `Request`/`Response`, decoded one layer up in `tessera-codec`).

mod errors;
mod frame;
mod header;

pub use errors::{ProtocolError, Result};
pub use frame::{Frame, FrameReader};
pub use header::{FRAME_HEAD_LEN, MAGIC, MAX_PAYLOAD_LENGTH, VERSION, FrameHeader};
