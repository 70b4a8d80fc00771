use std::io::{Cursor, Read};

use crate::error;
use crate::frame::{Direction, Envelope, Flags, FromCursor, Opcode, Serialize, Version};
use crate::types::{CBytesShort, CInt, INT_LEN};

/// Result kind for a `prepared` result body.
pub const RESULT_KIND_PREPARED: CInt = 0x0004;

/// The slice of a `prepared` result the session cares about: the statement id
/// the server will accept in later `EXECUTE`s. Column metadata is left to the
/// connection subsystem.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Clone, Default)]
pub struct BodyResResultPrepared {
    pub id: CBytesShort,
}

impl BodyResResultPrepared {
    #[inline]
    pub fn new(id: CBytesShort) -> BodyResResultPrepared {
        BodyResResultPrepared { id }
    }
}

impl Serialize for BodyResResultPrepared {
    fn serialize(&self, cursor: &mut Cursor<&mut Vec<u8>>, version: Version) {
        RESULT_KIND_PREPARED.serialize(cursor, version);
        self.id.serialize(cursor, version);
    }
}

impl FromCursor for BodyResResultPrepared {
    fn from_cursor(cursor: &mut Cursor<&[u8]>, version: Version) -> error::Result<Self> {
        let mut kind = [0; INT_LEN];
        cursor.read_exact(&mut kind)?;

        let kind = CInt::from_be_bytes(kind);
        if kind != RESULT_KIND_PREPARED {
            return Err(error::Error::General(format!(
                "Unexpected result kind: {kind}"
            )));
        }

        CBytesShort::from_cursor(cursor, version).map(BodyResResultPrepared::new)
    }
}

impl Envelope {
    pub fn new_res_result_prepared(
        id: CBytesShort,
        flags: Flags,
        version: Version,
    ) -> Envelope {
        let body = BodyResResultPrepared::new(id);

        Envelope::new(
            version,
            Direction::Response,
            flags,
            Opcode::Result,
            body.serialize_to_vec(version),
            None,
        )
    }
}
