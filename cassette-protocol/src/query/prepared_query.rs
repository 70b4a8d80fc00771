use crate::types::CBytesShort;

/// A statement a node has acknowledged a `PREPARE` for. The id is opaque and
/// only valid on the node that produced it, until that node forgets it.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct PreparedStatement {
    /// Server-issued statement id, sent back verbatim in `EXECUTE` bodies.
    pub id: CBytesShort,
    /// The original statement text.
    pub query: String,
}

impl PreparedStatement {
    pub fn new(id: CBytesShort, query: String) -> Self {
        PreparedStatement { id, query }
    }
}
