use std::io::Cursor;

use crate::error;
use crate::frame::{Direction, Envelope, Flags, FromCursor, Opcode, Serialize, Version};
use crate::types::{from_cursor_str_long, serialize_str_long, INT_LEN};

/// Body of an envelope of type `prepare`.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Clone, Default)]
pub struct BodyReqPrepare {
    pub query: String,
}

impl BodyReqPrepare {
    #[inline]
    pub fn new(query: String) -> BodyReqPrepare {
        BodyReqPrepare { query }
    }
}

impl Serialize for BodyReqPrepare {
    #[inline]
    fn serialize(&self, cursor: &mut Cursor<&mut Vec<u8>>, version: Version) {
        serialize_str_long(cursor, &self.query, version);
    }

    #[inline]
    fn serialize_to_vec(&self, version: Version) -> Vec<u8> {
        let mut buf = Vec::with_capacity(INT_LEN + self.query.len());
        self.serialize(&mut Cursor::new(&mut buf), version);
        buf
    }
}

impl FromCursor for BodyReqPrepare {
    #[inline]
    fn from_cursor(cursor: &mut Cursor<&[u8]>, _version: Version) -> error::Result<Self> {
        from_cursor_str_long(cursor).map(|query| BodyReqPrepare::new(query.into()))
    }
}

impl Envelope {
    pub fn new_req_prepare(query: String, flags: Flags, version: Version) -> Envelope {
        let body = BodyReqPrepare::new(query);

        Envelope::new(
            version,
            Direction::Request,
            flags,
            Opcode::Prepare,
            body.serialize_to_vec(version),
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_deserialize_body() {
        let data = [0, 0, 0, 3, 102, 111, 111];
        let mut cursor = Cursor::new(data.as_slice());

        let body = BodyReqPrepare::from_cursor(&mut cursor, Version::V4).unwrap();
        assert_eq!(body.query, "foo");
    }

    #[test]
    fn same_text_encodes_identically() {
        let first = BodyReqPrepare::new("SELECT k FROM t WHERE k = ?".into());
        let second = BodyReqPrepare::new("SELECT k FROM t WHERE k = ?".into());

        assert_eq!(
            first.serialize_to_vec(Version::V4),
            second.serialize_to_vec(Version::V4)
        );
    }
}
