//! Primitive binary codecs for the wire protocol
//!
//! # Formats
//! - VarInt: LEB128-style, 7 data bits per byte, high bit = continuation,
//!   1 to 5 bytes, 32-bit signed value reinterpreted as unsigned
//! - String: VarInt byte length followed by exactly that many UTF-8 bytes
//! - Fixed-width integers: big-endian
//! - Boolean: one byte, `0x01` = true, anything else reads back as false
//! - UUID: 16 raw bytes, most significant first
//! - Position: packed i64, see [`BlockPosition`]
//!
//! Every read checks the remaining length first and returns
//! [`ServerError::UnexpectedEof`] on short input; no read panics.

use bytes::{Buf, BufMut};
use mcsrv_core::{BlockPosition, Result, ServerError};
use uuid::Uuid;

const SEGMENT_BITS: u8 = 0x7F;
const CONTINUE_BIT: u8 = 0x80;

/// Maximum number of bytes a VarInt may occupy
pub const VARINT_MAX_BYTES: usize = 5;

/// Trait for values that serialize themselves field by field
pub trait Encode {
    fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()>;
}

/// Trait for values that parse themselves field by field, top to bottom
pub trait Decode: Sized {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self>;
}

#[inline]
fn ensure<B: Buf>(buf: &B, needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        return Err(ServerError::UnexpectedEof {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

/// Number of bytes `val` occupies as a VarInt
#[inline]
pub fn varint_len(val: i32) -> usize {
    let val = val as u32;
    match val {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0xFFF_FFFF => 4,
        _ => 5,
    }
}

/// Write a VarInt
///
/// Negative values are written through their unsigned bit pattern, so `-1`
/// takes five bytes: `FF FF FF FF 0F`.
#[inline]
pub fn write_varint<B: BufMut>(buf: &mut B, val: i32) {
    let mut val = val as u32;
    loop {
        if val & !(SEGMENT_BITS as u32) == 0 {
            buf.put_u8(val as u8);
            return;
        }
        buf.put_u8((val as u8 & SEGMENT_BITS) | CONTINUE_BIT);
        val >>= 7;
    }
}

/// Encode a VarInt into a fresh vector
pub fn encode_varint(val: i32) -> Vec<u8> {
    let mut out = Vec::with_capacity(varint_len(val));
    write_varint(&mut out, val);
    out
}

/// Read a VarInt
///
/// Stops at the first byte without the continuation bit. Fails with
/// [`ServerError::InvalidVarInt`] if a sixth byte would be needed and with
/// [`ServerError::UnexpectedEof`] if the input ends first.
#[inline]
pub fn read_varint<B: Buf>(buf: &mut B) -> Result<i32> {
    let mut result: u32 = 0;
    for i in 0..VARINT_MAX_BYTES {
        ensure(buf, 1)?;
        let byte = buf.get_u8();
        result |= ((byte & SEGMENT_BITS) as u32) << (7 * i);
        if byte & CONTINUE_BIT == 0 {
            return Ok(result as i32);
        }
    }
    Err(ServerError::InvalidVarInt)
}

/// Write a length-prefixed UTF-8 string
#[inline]
pub fn write_string<B: BufMut>(buf: &mut B, val: &str) -> Result<()> {
    let bytes = val.as_bytes();
    let len = i32::try_from(bytes.len())
        .map_err(|_| ServerError::InvalidData(format!("String too long: {} bytes", bytes.len())))?;
    write_varint(buf, len);
    buf.put_slice(bytes);
    Ok(())
}

/// Read a length-prefixed UTF-8 string
///
/// The declared length must be available in full; nothing is truncated.
#[inline]
pub fn read_string<B: Buf>(buf: &mut B) -> Result<String> {
    let len = read_varint(buf)?;
    let len = usize::try_from(len)
        .map_err(|_| ServerError::InvalidData(format!("Negative string length: {}", len)))?;
    ensure(buf, len)?;

    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|e| ServerError::InvalidData(format!("Invalid UTF-8: {}", e)))
}

/// Write a boolean (`0x01` / `0x00`)
#[inline]
pub fn write_bool<B: BufMut>(buf: &mut B, val: bool) {
    buf.put_u8(u8::from(val));
}

/// Read a boolean. Only `0x01` is true; every other byte reads as false.
#[inline]
pub fn read_bool<B: Buf>(buf: &mut B) -> Result<bool> {
    Ok(read_u8(buf)? == 0x01)
}

#[inline]
pub fn read_u8<B: Buf>(buf: &mut B) -> Result<u8> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

#[inline]
pub fn read_i8<B: Buf>(buf: &mut B) -> Result<i8> {
    ensure(buf, 1)?;
    Ok(buf.get_i8())
}

#[inline]
pub fn read_u16<B: Buf>(buf: &mut B) -> Result<u16> {
    ensure(buf, 2)?;
    Ok(buf.get_u16())
}

#[inline]
pub fn read_i16<B: Buf>(buf: &mut B) -> Result<i16> {
    ensure(buf, 2)?;
    Ok(buf.get_i16())
}

#[inline]
pub fn read_i32<B: Buf>(buf: &mut B) -> Result<i32> {
    ensure(buf, 4)?;
    Ok(buf.get_i32())
}

#[inline]
pub fn read_i64<B: Buf>(buf: &mut B) -> Result<i64> {
    ensure(buf, 8)?;
    Ok(buf.get_i64())
}

/// Write a UUID as 16 raw bytes
#[inline]
pub fn write_uuid<B: BufMut>(buf: &mut B, val: &Uuid) {
    buf.put_slice(val.as_bytes());
}

/// Read a UUID from 16 raw bytes
#[inline]
pub fn read_uuid<B: Buf>(buf: &mut B) -> Result<Uuid> {
    ensure(buf, 16)?;
    let mut bytes = [0u8; 16];
    buf.copy_to_slice(&mut bytes);
    Ok(Uuid::from_bytes(bytes))
}

/// Write a packed block position (big-endian i64)
#[inline]
pub fn write_position<B: BufMut>(buf: &mut B, val: BlockPosition) {
    buf.put_i64(val.pack());
}

/// Read a packed block position
#[inline]
pub fn read_position<B: Buf>(buf: &mut B) -> Result<BlockPosition> {
    Ok(BlockPosition::unpack(read_i64(buf)?))
}

/// Check that a declared count matches the list it precedes
#[inline]
pub fn check_count(field: &'static str, declared: i32, actual: usize) -> Result<()> {
    if usize::try_from(declared).ok() != Some(actual) {
        return Err(ServerError::CountMismatch {
            field,
            declared,
            actual,
        });
    }
    Ok(())
}

/// Read a VarInt count and turn it into a list length
#[inline]
pub fn read_count<B: Buf>(buf: &mut B, field: &'static str) -> Result<usize> {
    let count = read_varint(buf)?;
    usize::try_from(count)
        .map_err(|_| ServerError::InvalidData(format!("Negative {} count: {}", field, count)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_varint_fixed_vectors() {
        let cases: Vec<(i32, Vec<u8>)> = vec![
            (0, vec![0x00]),
            (1, vec![0x01]),
            (2, vec![0x02]),
            (127, vec![0x7F]),
            (128, vec![0x80, 0x01]),
            (255, vec![0xFF, 0x01]),
            (25565, vec![0xDD, 0xC7, 0x01]),
            (2097151, vec![0xFF, 0xFF, 0x7F]),
            (2147483647, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x07]),
            (-1, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
            (-2147483648, vec![0x80, 0x80, 0x80, 0x80, 0x08]),
        ];

        for (val, bytes) in cases {
            assert_eq!(encode_varint(val), bytes, "Encoding failed for {}", val);
            assert_eq!(varint_len(val), bytes.len(), "Length failed for {}", val);
            let decoded = read_varint(&mut &bytes[..]).unwrap();
            assert_eq!(decoded, val, "Decoding failed for {}", val);
        }
    }

    #[test]
    fn test_varint_roundtrip_sampled() {
        let mut values = vec![i32::MIN, i32::MIN + 1, -128, -127, -1, 0, 1, 127, 128, i32::MAX - 1, i32::MAX];
        // Stride through the whole range with a large prime step
        let mut v = i32::MIN as i64;
        while v <= i32::MAX as i64 {
            values.push(v as i32);
            v += 7_919_993;
        }

        for val in values {
            let mut buf = BytesMut::new();
            write_varint(&mut buf, val);
            assert_eq!(buf.len(), varint_len(val));
            assert_eq!(read_varint(&mut buf).unwrap(), val, "Failed for {}", val);
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn test_varint_stops_at_terminator() {
        let data = [0x80, 0x01, 0xAA, 0xBB];
        let mut buf = &data[..];
        assert_eq!(read_varint(&mut buf).unwrap(), 128);
        assert_eq!(buf, &[0xAA, 0xBB]);
    }

    #[test]
    fn test_varint_rejects_overlong() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let err = read_varint(&mut &data[..]).unwrap_err();
        assert!(matches!(err, ServerError::InvalidVarInt));

        let data = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert!(matches!(read_varint(&mut &data[..]), Err(ServerError::InvalidVarInt)));
    }

    #[test]
    fn test_varint_truncated_input() {
        let data = [0x80, 0x80];
        let err = read_varint(&mut &data[..]).unwrap_err();
        assert!(matches!(err, ServerError::UnexpectedEof { needed: 1, remaining: 0 }));

        let empty: [u8; 0] = [];
        assert!(matches!(read_varint(&mut &empty[..]), Err(ServerError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_string_roundtrip() {
        let test_cases = vec!["", "Hello", "localhost", "minecraft:core", "héllo wörld", "日本語", "🦀 crab"];

        for val in test_cases {
            let mut buf = BytesMut::new();
            write_string(&mut buf, val).unwrap();

            // The prefix declares the UTF-8 byte length, not the char count
            let mut peek = &buf[..];
            let declared = read_varint(&mut peek).unwrap();
            assert_eq!(declared as usize, val.len());
            assert_eq!(peek.len(), val.len());

            let decoded = read_string(&mut buf).unwrap();
            assert_eq!(val, decoded, "Failed for {}", val);
        }
    }

    #[test]
    fn test_string_short_payload_is_error() {
        // Declares 5 bytes, carries 3
        let data = [0x05, b'a', b'b', b'c'];
        let err = read_string(&mut &data[..]).unwrap_err();
        assert!(matches!(err, ServerError::UnexpectedEof { needed: 5, remaining: 3 }));
    }

    #[test]
    fn test_string_negative_length_is_error() {
        let mut data = encode_varint(-3);
        data.extend_from_slice(b"abc");
        assert!(matches!(read_string(&mut &data[..]), Err(ServerError::InvalidData(_))));
    }

    #[test]
    fn test_string_invalid_utf8() {
        let data = [0x02, 0xC3, 0x28];
        assert!(matches!(read_string(&mut &data[..]), Err(ServerError::InvalidData(_))));
    }

    #[test]
    fn test_bool_is_lenient() {
        assert!(read_bool(&mut &[0x01][..]).unwrap());
        assert!(!read_bool(&mut &[0x00][..]).unwrap());
        assert!(!read_bool(&mut &[0x02][..]).unwrap());
        assert!(!read_bool(&mut &[0xFF][..]).unwrap());

        let mut buf = BytesMut::new();
        write_bool(&mut buf, true);
        write_bool(&mut buf, false);
        assert_eq!(&buf[..], &[0x01, 0x00]);
    }

    #[test]
    fn test_fixed_width_big_endian() {
        let mut buf = BytesMut::new();
        buf.put_u16(25565);
        buf.put_i16(-2);
        buf.put_i32(-559038737);
        buf.put_i64(0x0102030405060708);
        assert_eq!(&buf[..2], &[0x63, 0xDD]);

        assert_eq!(read_u16(&mut buf).unwrap(), 25565);
        assert_eq!(read_i16(&mut buf).unwrap(), -2);
        assert_eq!(read_i32(&mut buf).unwrap(), -559038737);
        assert_eq!(read_i64(&mut buf).unwrap(), 0x0102030405060708);
    }

    #[test]
    fn test_fixed_width_short_input() {
        assert!(matches!(read_u16(&mut &[0x01][..]), Err(ServerError::UnexpectedEof { needed: 2, .. })));
        assert!(matches!(read_i32(&mut &[0x01, 0x02][..]), Err(ServerError::UnexpectedEof { needed: 4, .. })));
        assert!(matches!(read_i64(&mut &[0u8; 0][..]), Err(ServerError::UnexpectedEof { needed: 8, .. })));
        assert!(matches!(read_uuid(&mut &[0u8; 15][..]), Err(ServerError::UnexpectedEof { needed: 16, .. })));
    }

    #[test]
    fn test_uuid_raw_bytes() {
        let uuid = Uuid::from_u128(0x0011_2233_4455_6677_8899_AABB_CCDD_EEFF);
        let mut buf = BytesMut::new();
        write_uuid(&mut buf, &uuid);
        assert_eq!(buf[0], 0x00);
        assert_eq!(buf[15], 0xFF);
        assert_eq!(read_uuid(&mut buf).unwrap(), uuid);
    }

    #[test]
    fn test_position_is_big_endian_i64() {
        let pos = BlockPosition::new(18357644, 831, -20882616);
        let mut buf = BytesMut::new();
        write_position(&mut buf, pos);
        assert_eq!(&buf[..], &pos.pack().to_be_bytes());
        assert_eq!(read_position(&mut buf).unwrap(), pos);
    }

    #[test]
    fn test_count_contract() {
        assert!(check_count("properties", 2, 2).is_ok());
        assert!(matches!(
            check_count("properties", 3, 2),
            Err(ServerError::CountMismatch { field: "properties", declared: 3, actual: 2 })
        ));
        assert!(check_count("packs", -1, 0).is_err());
    }
}
