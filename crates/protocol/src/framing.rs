//! Length-prefixed packet framing
//!
//! # Frame Format
//! ```text
//! {VarInt length}{VarInt packet_id}{payload}
//! ```
//! `length` counts the id and payload bytes, not itself.
//!
//! Reading pulls the prefix one byte at a time so it never consumes bytes of
//! the body; wrap raw sockets in a `BufReader` to avoid a syscall per byte.
//! A body that ends early is reported as [`ServerError::LengthMismatch`],
//! never returned partially.
//!
//! Writing stages `length | id | payload` in a pooled buffer and hands it to
//! the stream in one `write_all`.

use bytes::BufMut;
use mcsrv_core::{Result, ServerError};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::codecs::{read_varint, varint_len, write_varint, Decode, Encode, VARINT_MAX_BYTES};
use crate::packets::ServerboundPacket;
use crate::pool::{BufferPool, PooledBuf, SMALL_BUFFER_SIZE};

/// Largest frame body accepted by default (largest 3-byte VarInt)
pub const MAX_FRAME_LEN: usize = 2_097_151;

/// Envelope shared by every packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Byte count of id + payload
    pub length: i32,
    pub id: i32,
}

/// One frame read off the wire
///
/// Holds the whole body (id + payload) in a pooled buffer, which returns to
/// the pool when the frame is dropped.
#[derive(Debug)]
pub struct Frame {
    pub header: PacketHeader,
    body: PooledBuf,
    id_len: usize,
}

impl Frame {
    #[inline]
    pub fn id(&self) -> i32 {
        self.header.id
    }

    /// Payload bytes after the packet id
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.body[self.id_len..]
    }

    /// Fail unless this frame carries `packet`'s id
    pub fn expect(&self, packet: ServerboundPacket) -> Result<()> {
        if self.header.id != packet.id() {
            return Err(ServerError::UnexpectedPacket {
                state: packet.state(),
                expected: packet.id(),
                actual: self.header.id,
            });
        }
        Ok(())
    }

    /// Decode the payload as a typed packet
    ///
    /// Bytes left over after the packet's last field are ignored.
    pub fn decode<P: Decode>(&self) -> Result<P> {
        let mut payload = self.payload();
        let packet = P::decode(&mut payload)?;
        if !payload.is_empty() {
            tracing::trace!(id = self.header.id, trailing = payload.len(), "Ignoring trailing bytes");
        }
        Ok(packet)
    }
}

/// Read a VarInt directly from a stream, one byte at a time
pub async fn read_varint_async<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32> {
    let mut result: u32 = 0;
    for i in 0..VARINT_MAX_BYTES {
        let byte = reader.read_u8().await?;
        result |= ((byte & 0x7F) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result as i32);
        }
    }
    Err(ServerError::InvalidVarInt)
}

/// Read one frame
///
/// # Errors
/// - [`ServerError::InvalidVarInt`] for a malformed prefix or id
/// - [`ServerError::FrameTooLarge`] when the prefix exceeds `max_len`
/// - [`ServerError::LengthMismatch`] when the stream ends inside the body
/// - [`ServerError::Io`] for transport errors, including EOF inside the prefix
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    pool: &BufferPool,
    max_len: usize,
) -> Result<Frame> {
    let length = read_varint_async(reader).await?;
    let len = usize::try_from(length)
        .map_err(|_| ServerError::InvalidData(format!("Negative frame length: {}", length)))?;
    if len == 0 {
        return Err(ServerError::InvalidData("Empty frame: no packet id".into()));
    }
    if len > max_len {
        return Err(ServerError::FrameTooLarge { len, max: max_len });
    }

    let mut body = pool.get(len);
    body.resize(len, 0);

    let mut filled = 0;
    while filled < len {
        let n = reader.read(&mut body[filled..]).await?;
        if n == 0 {
            return Err(ServerError::LengthMismatch {
                declared: len,
                actual: filled,
            });
        }
        filled += n;
    }

    let mut cursor = &body[..];
    let id = read_varint(&mut cursor)?;
    let id_len = len - cursor.len();

    tracing::trace!(id, len, "Read frame");

    Ok(Frame {
        header: PacketHeader { length, id },
        body,
        id_len,
    })
}

/// Write one frame with a computed length prefix
///
/// Returns the number of bytes written, prefix included.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    pool: &BufferPool,
    id: i32,
    payload: &[u8],
) -> Result<usize> {
    let body_len = varint_len(id) + payload.len();
    let length = i32::try_from(body_len).map_err(|_| ServerError::FrameTooLarge {
        len: body_len,
        max: i32::MAX as usize,
    })?;
    let frame_len = varint_len(length) + body_len;

    let mut staged = pool.get(frame_len);
    write_varint(&mut *staged, length);
    write_varint(&mut *staged, id);
    staged.put_slice(payload);

    if staged.len() != frame_len {
        return Err(ServerError::LengthMismatch {
            declared: frame_len,
            actual: staged.len(),
        });
    }

    writer.write_all(&staged).await?;
    writer.flush().await?;

    tracing::trace!(id, len = body_len, "Wrote frame");
    Ok(frame_len)
}

/// Serialize a typed packet and write it as one frame
///
/// The body is fully encoded before anything reaches the stream, so a packet
/// that fails to encode leaves the stream untouched.
pub async fn write_packet<W, P>(writer: &mut W, pool: &BufferPool, id: i32, packet: &P) -> Result<usize>
where
    W: AsyncWrite + Unpin,
    P: Encode,
{
    let mut body = pool.get(SMALL_BUFFER_SIZE);
    packet.encode(&mut *body)?;
    write_frame(writer, pool, id, &body).await
}
