//! VarInt and length-prefixed packet framing for the Minecraft Server List
//! Ping protocol. See <https://wiki.vg/Server_List_Ping>.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum byte length of a VarInt-prefixed string we'll accept. Generous
/// enough for any status JSON payload seen in the wild.
pub const MAX_STRING_LEN: i32 = 32768;

/// VarInts are bounded to 5 bytes for 32-bit values.
const MAX_VARINT_BYTES: usize = 5;

#[derive(Debug, Error)]
pub enum MalformedFrame {
    #[error("varint exceeded {MAX_VARINT_BYTES} bytes")]
    VarIntTooLong,
    #[error("string length {0} exceeds max of {MAX_STRING_LEN}")]
    StringTooLong(i32),
    #[error("negative length {0}")]
    NegativeLength(i32),
    #[error("string was not valid utf-8")]
    InvalidUtf8,
}

pub fn encode_varint(mut value: i32, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value as u32 & 0b0111_1111) as u8;
        value = ((value as u32) >> 7) as i32;
        if value != 0 {
            byte |= 0b1000_0000;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

pub fn encode_string(s: &str, out: &mut Vec<u8>) {
    encode_varint(s.len() as i32, out);
    out.extend_from_slice(s.as_bytes());
}

pub fn encode_ushort(value: u16, out: &mut Vec<u8>) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Reads a VarInt from an in-memory buffer, returning the value and the
/// number of bytes consumed.
pub fn decode_varint(buf: &[u8]) -> Result<(i32, usize), MalformedFrame> {
    let mut result: i32 = 0;
    for i in 0..MAX_VARINT_BYTES {
        let byte = *buf.get(i).ok_or(MalformedFrame::VarIntTooLong)?;
        result |= ((byte & 0b0111_1111) as i32) << (7 * i);
        if byte & 0b1000_0000 == 0 {
            return Ok((result, i + 1));
        }
    }
    Err(MalformedFrame::VarIntTooLong)
}

/// Reads a VarInt directly off an async reader, one byte at a time.
pub async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<i32> {
    let mut result: i32 = 0;
    for i in 0..MAX_VARINT_BYTES {
        let byte = reader.read_u8().await?;
        result |= ((byte & 0b0111_1111) as i32) << (7 * i);
        if byte & 0b1000_0000 == 0 {
            return Ok(result);
        }
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        MalformedFrame::VarIntTooLong,
    ))
}

pub async fn write_varint<W: AsyncWrite + Unpin>(writer: &mut W, value: i32) -> io::Result<()> {
    let mut buf = Vec::with_capacity(MAX_VARINT_BYTES);
    encode_varint(value, &mut buf);
    writer.write_all(&buf).await
}

/// Builds a full length-prefixed frame (`VarInt(len) || payload`).
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + MAX_VARINT_BYTES);
    encode_varint(payload.len() as i32, &mut out);
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_roundtrip_is_identity() {
        let samples = [0, 1, 127, 128, 255, 300, 2_097_151, 1 << 30, i32::MAX];
        for &value in &samples {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            let (decoded, consumed) = decode_varint(&buf).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, buf.len());
        }
    }

    #[test]
    fn six_byte_varint_is_malformed() {
        let buf = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(matches!(
            decode_varint(&buf),
            Err(MalformedFrame::VarIntTooLong)
        ));
    }

    #[test]
    fn handshake_golden_vector() {
        let packet = crate::protocol::encode_handshake(47, "localhost", 25565, 1);
        let framed = frame(&packet);
        assert_eq!(
            framed,
            vec![
                0x10, 0x00, 0x2F, 0x09, 0x6C, 0x6F, 0x63, 0x61, 0x6C, 0x68, 0x6F, 0x73, 0x74,
                0x63, 0xDD, 0x01,
            ]
        );
    }
}
