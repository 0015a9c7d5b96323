// ============================================================================
// Wire Frame
// ============================================================================
//
// Schema-registry framing shared by every message on the bus:
//
//   +-------+----------------------+------------------+
//   | 0x00  | schema id (u32, BE)  | schema body ...  |
//   +-------+----------------------+------------------+
//
// ============================================================================

use bytes::{Buf, BufMut};
use relay_error::RelayError;

pub const MAGIC_BYTE: u8 = 0x00;
pub const HEADER_LEN: usize = 5;

/// Prefix `body` with the frame header for `schema_id`
pub fn frame(schema_id: u32, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.put_u8(MAGIC_BYTE);
    out.put_u32(schema_id);
    out.put_slice(body);
    out
}

/// Split a framed message into its schema id and body
pub fn unframe(bytes: &[u8]) -> Result<(u32, &[u8]), RelayError> {
    if bytes.len() < HEADER_LEN {
        return Err(RelayError::decode(format!(
            "wire frame too short: {} bytes",
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_LEN];
    let magic = header.get_u8();
    if magic != MAGIC_BYTE {
        return Err(RelayError::decode(format!(
            "unknown magic byte 0x{:02x}",
            magic
        )));
    }
    let schema_id = header.get_u32();

    Ok((schema_id, &bytes[HEADER_LEN..]))
}
