//! Fixed-size frame header.
//!
//! Layout (big endian, [`FRAME_HEAD_LEN`] = 11 bytes):
//!
//! ```text
//! byte 0      magic (0xAF)
//! byte 1      version
//! byte 2      type/flags (opaque, forwarded verbatim)
//! bytes 3..7  stream id (opaque, reserved; always 0 — streaming is a non-goal)
//! bytes 7..11 payload length, u32
//! ```

use byteorder::{BigEndian, ByteOrder};

use crate::errors::{ProtocolError, Result};

/// Protocol magic byte. Chosen outside the ASCII printable range so a stray
/// HTTP request on the same port is rejected on the first byte.
pub const MAGIC: u8 = 0xAF;

/// Current header version.
pub const VERSION: u8 = 0x01;

/// Size of the serialized frame header, in bytes.
pub const FRAME_HEAD_LEN: usize = 11;

/// Maximum payload length accepted by [`crate::FrameReader`] (4 MiB).
pub const MAX_PAYLOAD_LENGTH: u32 = 4 * 1024 * 1024;

/// A parsed (or about-to-be-serialized) frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    version: u8,
    type_flags: u8,
    stream_id: u32,
    payload_len: u32,
}

impl FrameHeader {
    /// Construct a header for a payload of the given length, using the
    /// current protocol version and no stream id (streaming is a non-goal;
    /// the field is carried for forward compatibility and forwarded verbatim
    /// by readers that don't understand it).
    #[must_use]
    pub fn new(payload_len: u32) -> Self {
        Self { version: VERSION, type_flags: 0, stream_id: 0, payload_len }
    }

    /// Override the type/flags byte. The core never inspects this field; it
    /// exists for higher layers (e.g. future multiplexing) to stash data.
    #[must_use]
    pub fn with_type_flags(mut self, type_flags: u8) -> Self {
        self.type_flags = type_flags;
        self
    }

    /// Protocol version this header claims.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Opaque type/flags byte, forwarded verbatim.
    #[must_use]
    pub fn type_flags(&self) -> u8 {
        self.type_flags
    }

    /// Opaque stream id, forwarded verbatim. Always 0 in this implementation.
    #[must_use]
    pub fn stream_id(&self) -> u32 {
        self.stream_id
    }

    /// Declared payload length in bytes.
    #[must_use]
    pub fn payload_len(&self) -> u32 {
        self.payload_len
    }

    /// Serialize the header into its 11-byte wire form.
    #[must_use]
    pub fn to_bytes(self) -> [u8; FRAME_HEAD_LEN] {
        let mut buf = [0u8; FRAME_HEAD_LEN];
        buf[0] = MAGIC;
        buf[1] = self.version;
        buf[2] = self.type_flags;
        BigEndian::write_u32(&mut buf[3..7], self.stream_id);
        BigEndian::write_u32(&mut buf[7..11], self.payload_len);
        buf
    }

    /// Parse a header from exactly [`FRAME_HEAD_LEN`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::IncompleteHeader`] if `buf` is shorter than
    /// [`FRAME_HEAD_LEN`], [`ProtocolError::InvalidMagic`] if byte 0 isn't
    /// [`MAGIC`], or [`ProtocolError::PayloadTooLarge`] if the declared
    /// length exceeds [`MAX_PAYLOAD_LENGTH`].
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < FRAME_HEAD_LEN {
            return Err(ProtocolError::IncompleteHeader { got: buf.len(), want: FRAME_HEAD_LEN });
        }

        if buf[0] != MAGIC {
            return Err(ProtocolError::InvalidMagic(buf[0]));
        }

        let payload_len = BigEndian::read_u32(&buf[7..11]);
        if payload_len > MAX_PAYLOAD_LENGTH {
            return Err(ProtocolError::PayloadTooLarge { size: payload_len, max: MAX_PAYLOAD_LENGTH });
        }

        Ok(Self {
            version: buf[1],
            type_flags: buf[2],
            stream_id: BigEndian::read_u32(&buf[3..7]),
            payload_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let header = FrameHeader::new(42).with_type_flags(0x7);
        let bytes = header.to_bytes();
        let parsed = FrameHeader::from_bytes(&bytes).expect("valid header");
        assert_eq!(header, parsed);
    }

    #[test]
    fn rejects_short_buffer() {
        let buf = [0u8; 5];
        assert_eq!(
            FrameHeader::from_bytes(&buf),
            Err(ProtocolError::IncompleteHeader { got: 5, want: FRAME_HEAD_LEN })
        );
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = FrameHeader::new(0).to_bytes();
        buf[0] = 0x00;
        assert_eq!(FrameHeader::from_bytes(&buf), Err(ProtocolError::InvalidMagic(0x00)));
    }

    #[test]
    fn rejects_oversized_payload() {
        let mut buf = FrameHeader::new(0).to_bytes();
        BigEndian::write_u32(&mut buf[7..11], MAX_PAYLOAD_LENGTH + 1);
        assert_eq!(
            FrameHeader::from_bytes(&buf),
            Err(ProtocolError::PayloadTooLarge { size: MAX_PAYLOAD_LENGTH + 1, max: MAX_PAYLOAD_LENGTH })
        );
    }

    #[test]
    fn accepts_payload_at_exact_limit() {
        let buf = FrameHeader::new(MAX_PAYLOAD_LENGTH).to_bytes();
        assert!(FrameHeader::from_bytes(&buf).is_ok());
    }
}
