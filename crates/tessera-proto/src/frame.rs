//! Frame: a [`FrameHeader`] plus its payload body, and the buffered reader
//! that parses one off an async byte stream.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    errors::Result,
    header::{FRAME_HEAD_LEN, FrameHeader},
};

/// Initial capacity of a [`FrameReader`]'s scratch buffer.
const INITIAL_BUFFER_LEN: usize = 1024;

/// Bound on how many times [`FrameReader`] will double its buffer while
/// growing to fit a declared payload length, preventing a pathological
/// doubling loop. `MAX_PAYLOAD_LENGTH` (4 MiB) is reached well within this
/// bound starting from a 1 KiB buffer.
const MAX_GROWTHS: u32 = 12;

/// A header plus the raw (still envelope-codec-encoded) payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The parsed frame header.
    pub header: FrameHeader,
    /// The payload, exactly `header.payload_len()` bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Build a frame wrapping `payload`, computing the header's length field
    /// automatically.
    ///
    /// # Panics
    ///
    /// Panics if `payload.len()` does not fit in a `u32`; in practice this
    /// cannot happen because callers reject oversized payloads before
    /// constructing a `Frame` (see [`crate::MAX_PAYLOAD_LENGTH`]).
    #[must_use]
    pub fn new(payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let len = u32::try_from(payload.len()).unwrap_or(u32::MAX);
        Self { header: FrameHeader::new(len), payload }
    }

    /// Encode this frame (header + payload) and write it to `writer`.
    pub async fn write_to<W>(&self, writer: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let header_bytes = self.header.to_bytes();
        writer.write_all(&header_bytes).await?;
        writer.write_all(&self.payload).await?;
        Ok(())
    }
}

/// Buffered frame reader. Owns a growable scratch buffer so repeated reads on
/// the same connection don't reallocate for every frame.
#[derive(Debug)]
pub struct FrameReader {
    buffer: BytesMut,
    growths: u32,
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader {
    /// Create a reader with the default 1 KiB initial buffer.
    #[must_use]
    pub fn new() -> Self {
        Self { buffer: BytesMut::with_capacity(INITIAL_BUFFER_LEN), growths: 0 }
    }

    /// Read exactly one frame off `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProtocolError::IncompleteHeader`] or
    /// [`crate::ProtocolError::InvalidMagic`] on a malformed header,
    /// [`crate::ProtocolError::PayloadTooLarge`] if the declared length
    /// exceeds [`crate::MAX_PAYLOAD_LENGTH`], or
    /// [`crate::ProtocolError::Io`] on a short read / closed connection.
    pub async fn read_frame<R>(&mut self, reader: &mut R) -> Result<Frame>
    where
        R: AsyncRead + Unpin,
    {
        let mut head_buf = [0u8; FRAME_HEAD_LEN];
        reader.read_exact(&mut head_buf).await?;
        let header = FrameHeader::from_bytes(&head_buf)?;

        let len = header.payload_len() as usize;
        while self.buffer.capacity() < len && self.growths < MAX_GROWTHS {
            let new_cap = (self.buffer.capacity() * 2).max(INITIAL_BUFFER_LEN);
            self.buffer.reserve(new_cap.saturating_sub(self.buffer.capacity()));
            self.growths += 1;
        }

        let mut payload = BytesMut::zeroed(len);
        reader.read_exact(&mut payload).await?;

        Ok(Frame { header, payload: payload.freeze() })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tokio::io::duplex;

    use super::*;
    use crate::header::MAX_PAYLOAD_LENGTH;

    #[tokio::test]
    async fn round_trip_small_frame() {
        let (mut client, mut server) = duplex(8192);
        let frame = Frame::new(Bytes::from_static(b"hello frame"));
        frame.write_to(&mut client).await.unwrap();

        let mut reader = FrameReader::new();
        let decoded = reader.read_frame(&mut server).await.unwrap();
        assert_eq!(decoded.payload, frame.payload);
    }

    #[tokio::test]
    async fn rejects_magic_mutation() {
        let (mut client, mut server) = duplex(8192);
        let frame = Frame::new(Bytes::from_static(b"x"));
        let mut header_bytes = frame.header.to_bytes();
        header_bytes[0] = 0x00;
        client.write_all(&header_bytes).await.unwrap();
        client.write_all(&frame.payload).await.unwrap();

        let mut reader = FrameReader::new();
        let err = reader.read_frame(&mut server).await.unwrap_err();
        assert!(matches!(err, crate::ProtocolError::InvalidMagic(0x00)));
    }

    #[tokio::test]
    async fn rejects_oversized_payload_before_reading_body() {
        let (mut client, mut server) = duplex(64);
        let mut header_bytes = FrameHeader::new(MAX_PAYLOAD_LENGTH + 1).to_bytes();
        // Corrupt nothing else; just send the header, no body — the reader
        // must reject based on the header alone, without blocking on a body
        // that will never arrive.
        client.write_all(&mut header_bytes).await.unwrap();

        let mut reader = FrameReader::new();
        let err = reader.read_frame(&mut server).await.unwrap_err();
        assert!(matches!(err, crate::ProtocolError::PayloadTooLarge { .. }));
    }

    proptest! {
        #[test]
        fn round_trip_arbitrary_small_payload(bytes in prop::collection::vec(any::<u8>(), 0..4096)) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let (mut client, mut server) = duplex(8192 + bytes.len());
                let frame = Frame::new(Bytes::from(bytes.clone()));
                frame.write_to(&mut client).await.unwrap();

                let mut reader = FrameReader::new();
                let decoded = reader.read_frame(&mut server).await.unwrap();
                prop_assert_eq!(decoded.payload.as_ref(), bytes.as_slice());
                Ok(())
            })?;
        }
    }
}
