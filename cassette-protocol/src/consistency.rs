//! Rust representation of Cassandra consistency levels.

use derive_more::Display;
use std::convert::TryFrom;
use std::io::Cursor;

use crate::error;
use crate::frame::{Serialize, Version};
use crate::types::CIntShort;

/// `Consistency` is an enum which represents Cassandra's consistency levels.
/// To find more details about each consistency level please refer to the
/// DataStax CQL documentation.
#[derive(Debug, PartialEq, Clone, Copy, Display, Ord, PartialOrd, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Consistency {
    /// A write is accepted as soon as any node (including a hinted handoff)
    /// has seen it. Writes only.
    Any,
    /// One replica must acknowledge.
    #[default]
    One,
    /// Two replicas must acknowledge.
    Two,
    /// Three replicas must acknowledge.
    Three,
    /// A quorum of replicas across all data centers.
    Quorum,
    /// Every replica must acknowledge.
    All,
    /// A quorum within the coordinator's data center.
    LocalQuorum,
    /// A quorum in each data center.
    EachQuorum,
    /// Linearizable consistency for lightweight transactions; only valid as a
    /// serial consistency.
    Serial,
    /// Same as `Serial`, confined to the local data center.
    LocalSerial,
    /// One replica in the local data center.
    LocalOne,
}

impl From<Consistency> for CIntShort {
    fn from(value: Consistency) -> Self {
        match value {
            Consistency::Any => 0x0000,
            Consistency::One => 0x0001,
            Consistency::Two => 0x0002,
            Consistency::Three => 0x0003,
            Consistency::Quorum => 0x0004,
            Consistency::All => 0x0005,
            Consistency::LocalQuorum => 0x0006,
            Consistency::EachQuorum => 0x0007,
            Consistency::Serial => 0x0008,
            Consistency::LocalSerial => 0x0009,
            Consistency::LocalOne => 0x000A,
        }
    }
}

impl TryFrom<CIntShort> for Consistency {
    type Error = error::Error;

    fn try_from(value: CIntShort) -> Result<Self, Self::Error> {
        match value {
            0x0000 => Ok(Consistency::Any),
            0x0001 => Ok(Consistency::One),
            0x0002 => Ok(Consistency::Two),
            0x0003 => Ok(Consistency::Three),
            0x0004 => Ok(Consistency::Quorum),
            0x0005 => Ok(Consistency::All),
            0x0006 => Ok(Consistency::LocalQuorum),
            0x0007 => Ok(Consistency::EachQuorum),
            0x0008 => Ok(Consistency::Serial),
            0x0009 => Ok(Consistency::LocalSerial),
            0x000A => Ok(Consistency::LocalOne),
            _ => Err(error::Error::General(format!(
                "Unknown consistency: {value}"
            ))),
        }
    }
}

impl Serialize for Consistency {
    #[inline]
    fn serialize(&self, cursor: &mut Cursor<&mut Vec<u8>>, version: Version) {
        let value: CIntShort = (*self).into();
        value.serialize(cursor, version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_roundtrip() {
        for consistency in [
            Consistency::Any,
            Consistency::One,
            Consistency::Quorum,
            Consistency::All,
            Consistency::LocalQuorum,
            Consistency::Serial,
            Consistency::LocalOne,
        ] {
            let value: CIntShort = consistency.into();
            assert_eq!(Consistency::try_from(value).unwrap(), consistency);
        }
    }

    #[test]
    fn unknown_value_is_rejected() {
        assert!(Consistency::try_from(0x0042).is_err());
    }

    #[test]
    fn serializes_as_short() {
        assert_eq!(
            Consistency::Quorum.serialize_to_vec(Version::V4),
            [0x00, 0x04]
        );
    }
}
