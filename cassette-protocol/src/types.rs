//! Wire-level primitives shared by all request bodies, named after the
//! protocol grammar: `[int]`, `[short]`, `[long]`, `[string]`,
//! `[long string]`, `[bytes]` and `[short bytes]`.

pub mod value;

use std::io::{Cursor, Read};

use crate::error;
use crate::frame::{FromCursor, Serialize, Version};

/// Number of bytes in a `[short]`.
pub const SHORT_LEN: usize = 2;
/// Number of bytes in an `[int]`.
pub const INT_LEN: usize = 4;

/// Protocol `[int]`.
pub type CInt = i32;
/// Protocol `[short]`.
pub type CIntShort = i16;
/// Protocol `[long]`.
pub type CLong = i64;

/// Serializes a `[string]`: short length followed by UTF-8 bytes.
pub fn serialize_str(cursor: &mut Cursor<&mut Vec<u8>>, value: &str, version: Version) {
    let len = value.len() as CIntShort;
    len.serialize(cursor, version);
    value.as_bytes().serialize(cursor, version);
}

/// Serializes a `[long string]`: int length followed by UTF-8 bytes.
pub fn serialize_str_long(cursor: &mut Cursor<&mut Vec<u8>>, value: &str, version: Version) {
    let len = value.len() as CInt;
    len.serialize(cursor, version);
    value.as_bytes().serialize(cursor, version);
}

fn take_slice<'a>(cursor: &mut Cursor<&'a [u8]>, len: usize) -> error::Result<&'a [u8]> {
    let start = cursor.position() as usize;
    let body = *cursor.get_ref();
    let end = start
        .checked_add(len)
        .filter(|end| *end <= body.len())
        .ok_or_else(|| error::Error::General("Unexpected end of buffer!".into()))?;

    cursor.set_position(end as u64);
    Ok(&body[start..end])
}

/// Reads a `[string]` borrowed from the cursor's underlying buffer.
pub fn from_cursor_str<'a>(cursor: &mut Cursor<&'a [u8]>) -> error::Result<&'a str> {
    let mut len = [0; SHORT_LEN];
    cursor.read_exact(&mut len)?;

    let len = CIntShort::from_be_bytes(len);
    if len < 0 {
        return Err(error::Error::General(format!(
            "Negative string length: {len}"
        )));
    }

    Ok(std::str::from_utf8(take_slice(cursor, len as usize)?)?)
}

/// Reads a `[long string]` borrowed from the cursor's underlying buffer.
pub fn from_cursor_str_long<'a>(cursor: &mut Cursor<&'a [u8]>) -> error::Result<&'a str> {
    let mut len = [0; INT_LEN];
    cursor.read_exact(&mut len)?;

    let len = CInt::from_be_bytes(len);
    if len < 0 {
        return Err(error::Error::General(format!(
            "Negative string length: {len}"
        )));
    }

    Ok(std::str::from_utf8(take_slice(cursor, len as usize)?)?)
}

/// Protocol `[bytes]`: int-length-prefixed byte blob, where a negative length
/// denotes a null value.
#[derive(Debug, Clone, Default, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct CBytes {
    bytes: Option<Vec<u8>>,
}

impl CBytes {
    pub fn new(bytes: Vec<u8>) -> CBytes {
        CBytes { bytes: Some(bytes) }
    }

    /// Creates a null value.
    pub fn new_null() -> CBytes {
        CBytes { bytes: None }
    }

    #[inline]
    pub fn as_slice(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    #[inline]
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        self.bytes
    }
}

impl Serialize for CBytes {
    fn serialize(&self, cursor: &mut Cursor<&mut Vec<u8>>, version: Version) {
        match &self.bytes {
            Some(bytes) => {
                let len = bytes.len() as CInt;
                len.serialize(cursor, version);
                bytes.serialize(cursor, version);
            }
            None => (-1 as CInt).serialize(cursor, version),
        }
    }
}

impl FromCursor for CBytes {
    fn from_cursor(cursor: &mut Cursor<&[u8]>, _version: Version) -> error::Result<CBytes> {
        let mut len = [0; INT_LEN];
        cursor.read_exact(&mut len)?;

        let len = CInt::from_be_bytes(len);
        if len < 0 {
            return Ok(CBytes::new_null());
        }

        take_slice(cursor, len as usize).map(|slice| CBytes::new(slice.to_vec()))
    }
}

/// Protocol `[short bytes]`: short-length-prefixed byte blob. Prepared
/// statement ids travel in this shape.
#[derive(Debug, Clone, Default, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct CBytesShort {
    bytes: Vec<u8>,
}

impl CBytesShort {
    pub fn new(bytes: Vec<u8>) -> CBytesShort {
        CBytesShort { bytes }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn serialized_len(&self) -> usize {
        SHORT_LEN + self.bytes.len()
    }
}

impl Serialize for CBytesShort {
    fn serialize(&self, cursor: &mut Cursor<&mut Vec<u8>>, version: Version) {
        let len = self.bytes.len() as CIntShort;
        len.serialize(cursor, version);
        self.bytes.serialize(cursor, version);
    }
}

impl FromCursor for CBytesShort {
    fn from_cursor(cursor: &mut Cursor<&[u8]>, _version: Version) -> error::Result<CBytesShort> {
        let mut len = [0; SHORT_LEN];
        cursor.read_exact(&mut len)?;

        let len = CIntShort::from_be_bytes(len);
        if len < 0 {
            return Err(error::Error::General(format!(
                "Negative short bytes length: {len}"
            )));
        }

        take_slice(cursor, len as usize).map(|slice| CBytesShort::new(slice.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_roundtrip() {
        let mut buf = vec![];
        serialize_str(&mut Cursor::new(&mut buf), "system", Version::V4);
        assert_eq!(buf[..SHORT_LEN], [0, 6]);

        let mut cursor = Cursor::new(buf.as_slice());
        assert_eq!(from_cursor_str(&mut cursor).unwrap(), "system");
    }

    #[test]
    fn long_string_roundtrip() {
        let mut buf = vec![];
        serialize_str_long(&mut Cursor::new(&mut buf), "SELECT 1", Version::V4);
        assert_eq!(buf[..INT_LEN], [0, 0, 0, 8]);

        let mut cursor = Cursor::new(buf.as_slice());
        assert_eq!(from_cursor_str_long(&mut cursor).unwrap(), "SELECT 1");
    }

    #[test]
    fn truncated_string_is_an_error() {
        let data = [0, 10, b'a', b'b'];
        let mut cursor = Cursor::new(data.as_slice());
        assert!(from_cursor_str(&mut cursor).is_err());
    }

    #[test]
    fn null_bytes_roundtrip() {
        let bytes = CBytes::new_null();
        let data = bytes.serialize_to_vec(Version::V4);
        assert_eq!(data, [0xff, 0xff, 0xff, 0xff]);

        let decoded = CBytes::from_cursor(&mut Cursor::new(data.as_slice()), Version::V4).unwrap();
        assert_eq!(decoded.as_slice(), None);
    }

    #[test]
    fn short_bytes_roundtrip() {
        let id = CBytesShort::new(vec![1, 2, 3]);
        let data = id.serialize_to_vec(Version::V4);
        assert_eq!(data.len(), id.serialized_len());

        let decoded =
            CBytesShort::from_cursor(&mut Cursor::new(data.as_slice()), Version::V4).unwrap();
        assert_eq!(decoded.as_slice(), [1, 2, 3]);
    }
}
