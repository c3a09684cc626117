use thiserror::Error;

/// Errors produced while reading or writing a [`crate::Frame`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The header's magic byte did not match [`crate::MAGIC`].
    #[error("invalid magic byte: {0:#04x}")]
    InvalidMagic(u8),

    /// The header declared a payload longer than [`crate::MAX_PAYLOAD_LENGTH`].
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// The length claimed by the frame header.
        size: u32,
        /// [`crate::MAX_PAYLOAD_LENGTH`].
        max: u32,
    },

    /// Fewer than [`crate::FRAME_HEAD_LEN`] bytes were available to parse a header.
    #[error("incomplete frame header (got {got} bytes, need {want})")]
    IncompleteHeader {
        /// Bytes actually available.
        got: usize,
        /// Bytes required ([`crate::FRAME_HEAD_LEN`]).
        want: usize,
    },

    /// The connection was closed (or timed out) before a full frame arrived.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl PartialEq for ProtocolError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidMagic(a), Self::InvalidMagic(b)) => a == b,
            (Self::PayloadTooLarge { size: s1, max: m1 }, Self::PayloadTooLarge { size: s2, max: m2 }) => {
                s1 == s2 && m1 == m2
            }
            (Self::IncompleteHeader { got: g1, want: w1 }, Self::IncompleteHeader { got: g2, want: w2 }) => {
                g1 == g2 && w1 == w2
            }
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}

impl Eq for ProtocolError {}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;
