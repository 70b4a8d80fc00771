use std::io::Cursor;

use crate::frame::{Direction, Envelope, Flags, Opcode, Serialize, Version};
use crate::query::QueryParams;
use crate::types::CBytesShort;

/// Body of an envelope of type `execute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyReqExecute<'a> {
    pub id: &'a CBytesShort,
    pub params: &'a QueryParams,
}

impl Serialize for BodyReqExecute<'_> {
    fn serialize(&self, cursor: &mut Cursor<&mut Vec<u8>>, version: Version) {
        self.id.serialize(cursor, version);
        self.params.serialize(cursor, version);
    }
}

impl Envelope {
    pub fn new_req_execute(
        id: &CBytesShort,
        params: &QueryParams,
        flags: Flags,
        version: Version,
    ) -> Envelope {
        let body = BodyReqExecute { id, params };

        Envelope::new(
            version,
            Direction::Request,
            flags,
            Opcode::Execute,
            body.serialize_to_vec(version),
            None,
        )
    }
}
