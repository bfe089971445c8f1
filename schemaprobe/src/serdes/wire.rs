//! Confluent framing of schema-registry encoded payloads.
//!
//! Format: `[magic_byte(1)][schema_id(4, big-endian)][datum(N)]`

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ExtractError;

/// Magic byte indicating a schema id follows
pub const MAGIC_BYTE: u8 = 0x00;

pub const HEADER_LEN: usize = 5;

pub fn is_framed(data: &[u8]) -> bool {
    data.len() >= HEADER_LEN && data[0] == MAGIC_BYTE
}

/// Splits a framed payload into its schema id and datum.
pub fn split_framed(data: &[u8]) -> Result<(u32, &[u8]), ExtractError> {
    if data.len() < HEADER_LEN {
        return Err(ExtractError::Framing(format!(
            "{} bytes is too short to contain a schema id",
            data.len()
        )));
    }

    if data[0] != MAGIC_BYTE {
        return Err(ExtractError::Framing(format!(
            "invalid magic byte: expected 0x00, got 0x{:02x}",
            data[0]
        )));
    }

    let mut id_bytes = &data[1..HEADER_LEN];
    let schema_id = id_bytes.get_u32();

    Ok((schema_id, &data[HEADER_LEN..]))
}

/// Prefixes an encoded datum with the framing header.
pub fn frame(schema_id: u32, datum: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + datum.len());
    buf.put_u8(MAGIC_BYTE);
    buf.put_u32(schema_id);
    buf.put_slice(datum);
    buf.freeze()
}
