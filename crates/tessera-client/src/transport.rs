//! Per-network send implementations plugged into [`tessera_pool::Pool`] as
//! [`Dialer`]s, plus the partial-write-with-cancellation loop the spec calls
//! for on the `tcp` path.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tessera_core::Network;
use tessera_pool::{Dialer, Pool};
use tessera_proto::{FRAME_HEAD_LEN, Frame, FrameHeader, MAX_PAYLOAD_LENGTH, ProtocolError};
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    net::{TcpStream, UdpSocket},
    time::Instant,
};

use crate::errors::{ClientError, Result};

/// Dials a fresh [`TcpStream`] per pooled lease.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpDialer;

#[async_trait]
impl Dialer for TcpDialer {
    type Conn = TcpStream;

    async fn dial(&self, _network: Network, addr: &str) -> tessera_pool::Result<Self::Conn> {
        Ok(TcpStream::connect(addr).await?)
    }
}

/// Dials a fresh [`UdpSocket`], pre-connected to `addr` so `send`/`recv`
/// (rather than `send_to`/`recv_from`) can be used.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpDialer;

#[async_trait]
impl Dialer for UdpDialer {
    type Conn = UdpSocket;

    async fn dial(&self, _network: Network, addr: &str) -> tessera_pool::Result<Self::Conn> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(addr).await?;
        Ok(socket)
    }
}

fn frame_bytes(payload: Bytes) -> Bytes {
    let frame = Frame::new(payload);
    let mut buf = BytesMut::with_capacity(FRAME_HEAD_LEN + frame.payload.len());
    buf.extend_from_slice(&frame.header.to_bytes());
    buf.extend_from_slice(&frame.payload);
    buf.freeze()
}

/// Write `buf` to `writer` in a loop, since a single write may be partial;
/// checked against `deadline` between iterations rather than only once
/// up front, so a deadline that elapses mid-write is caught promptly.
async fn write_with_cancellation<W>(writer: &mut W, buf: &[u8], deadline: Option<Instant>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while written < buf.len() {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(ClientError::DeadlineExceeded);
            }
        }
        let n = writer.write(&buf[written..]).await.map_err(ProtocolError::from)?;
        if n == 0 {
            return Err(ClientError::Protocol(ProtocolError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "connection closed mid-write",
            ))));
        }
        written += n;
    }
    Ok(())
}

async fn with_deadline<T, E>(
    fut: impl std::future::Future<Output = std::result::Result<T, E>>,
    deadline: Option<Instant>,
) -> Result<T>
where
    ClientError: From<E>,
{
    match deadline {
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, fut).await {
                Ok(result) => result.map_err(ClientError::from),
                Err(_elapsed) => Err(ClientError::DeadlineExceeded),
            }
        }
        None => fut.await.map_err(ClientError::from),
    }
}

/// Send `payload` over a pooled TCP connection to `addr`, returning the
/// response frame's raw (still envelope-encoded) body.
pub async fn send_tcp(
    pool: &Arc<Pool<TcpDialer>>,
    addr: &str,
    payload: Bytes,
    deadline: Option<Instant>,
) -> Result<Bytes> {
    let mut conn = pool.get(Network::Tcp, addr).await.map_err(|err| ClientError::Pool(err.to_string()))?;

    let buf = frame_bytes(payload);
    write_with_cancellation(&mut *conn, &buf, deadline).await?;

    let mut reader = tessera_proto::FrameReader::new();
    let frame = with_deadline(reader.read_frame(&mut *conn), deadline).await?;
    Ok(frame.payload)
}

/// Send `payload` over a pooled UDP socket to `addr`, returning the response
/// datagram's raw (still envelope-encoded) body.
pub async fn send_udp(
    pool: &Arc<Pool<UdpDialer>>,
    addr: &str,
    payload: Bytes,
    deadline: Option<Instant>,
) -> Result<Bytes> {
    let conn = pool.get(Network::Udp, addr).await.map_err(|err| ClientError::Pool(err.to_string()))?;

    let buf = frame_bytes(payload);
    with_deadline(conn.send(&buf), deadline).await?;

    let mut recv_buf = vec![0u8; MAX_PAYLOAD_LENGTH as usize + FRAME_HEAD_LEN];
    let len = with_deadline(conn.recv(&mut recv_buf), deadline).await?;

    let header = FrameHeader::from_bytes(&recv_buf[..len])?;
    let body_start = FRAME_HEAD_LEN;
    let body_end = body_start + header.payload_len() as usize;
    let body = recv_buf
        .get(body_start..body_end)
        .ok_or(ProtocolError::IncompleteHeader { got: len, want: body_end })?;
    Ok(Bytes::copy_from_slice(body))
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Protocol(ProtocolError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::duplex;

    use super::*;

    #[tokio::test]
    async fn write_with_cancellation_sends_full_buffer() {
        let (mut a, mut b) = duplex(64);
        let payload = b"hello".to_vec();
        write_with_cancellation(&mut a, &payload, None).await.unwrap();
        drop(a);

        let mut received = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut b, &mut received).await.unwrap();
        assert_eq!(received, payload);
    }

    #[tokio::test]
    async fn write_with_cancellation_respects_elapsed_deadline() {
        let (mut a, _b) = duplex(1);
        let past_deadline = Instant::now() - std::time::Duration::from_secs(1);
        let err = write_with_cancellation(&mut a, b"x".repeat(1024).as_slice(), Some(past_deadline))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::DeadlineExceeded));
    }
}
