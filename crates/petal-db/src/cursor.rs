//! Cursor tokens.
//!
//! Each backend prefixes its resume point before encoding so a cursor
//! issued by one backend is rejected by the other instead of misread.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;

use petal_types::Cursor;

use crate::store::StoreError;

const SEQ_PREFIX: &str = "seq:";
const DOC_PREFIX: &str = "doc:";

fn encode(raw: String) -> Cursor {
    Cursor::new(B64.encode(raw))
}

fn decode(cursor: &Cursor, prefix: &str) -> Result<String, StoreError> {
    let bytes = B64
        .decode(cursor.as_str())
        .map_err(|_| StoreError::InvalidCursor)?;
    let raw = String::from_utf8(bytes).map_err(|_| StoreError::InvalidCursor)?;
    raw.strip_prefix(prefix)
        .map(str::to_string)
        .ok_or(StoreError::InvalidCursor)
}

/// Cursor resuming after the local row with this insertion sequence.
pub fn from_seq(seq: i64) -> Cursor {
    encode(format!("{}{}", SEQ_PREFIX, seq))
}

pub fn to_seq(cursor: &Cursor) -> Result<i64, StoreError> {
    decode(cursor, SEQ_PREFIX)?
        .parse()
        .map_err(|_| StoreError::InvalidCursor)
}

/// Cursor resuming after the remote document with this id.
pub fn from_document(id: &str) -> Cursor {
    encode(format!("{}{}", DOC_PREFIX, id))
}

pub fn to_document(cursor: &Cursor) -> Result<String, StoreError> {
    let id = decode(cursor, DOC_PREFIX)?;
    if id.is_empty() {
        return Err(StoreError::InvalidCursor);
    }
    Ok(id)
}
