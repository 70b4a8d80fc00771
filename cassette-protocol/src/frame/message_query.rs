use std::io::Cursor;

use crate::frame::{Direction, Envelope, Flags, Opcode, Serialize, Version};
use crate::query::Query;
use crate::types::serialize_str_long;

/// Body of an envelope of type `query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyReqQuery {
    pub query: Query,
}

impl Serialize for BodyReqQuery {
    fn serialize(&self, cursor: &mut Cursor<&mut Vec<u8>>, version: Version) {
        serialize_str_long(cursor, &self.query.query, version);
        self.query.params.serialize(cursor, version);
    }
}

impl Envelope {
    pub fn new_query(query: Query, flags: Flags, version: Version) -> Envelope {
        let body = BodyReqQuery { query };

        Envelope::new(
            version,
            Direction::Request,
            flags,
            Opcode::Query,
            body.serialize_to_vec(version),
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::Consistency;
    use crate::query::QueryParams;

    #[test]
    fn query_body_starts_with_long_string() {
        let query = Query {
            query: "SELECT * FROM t".into(),
            params: QueryParams {
                consistency: Consistency::Quorum,
                ..Default::default()
            },
        };

        let envelope = Envelope::new_query(query, Flags::empty(), Version::V4);
        assert_eq!(envelope.opcode, Opcode::Query);
        assert_eq!(envelope.body[..4], [0, 0, 0, 15]);
        assert_eq!(&envelope.body[4..19], b"SELECT * FROM t");
    }
}
