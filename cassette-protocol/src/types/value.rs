use std::io::Cursor;

use crate::frame::{Serialize, Version};
use crate::types::CInt;

/// A value bound to a query parameter: regular bytes, explicit null, or
/// "not set" (column left untouched by the server).
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum Value {
    Some(Vec<u8>),
    Null,
    NotSet,
}

impl Value {
    pub fn new(bytes: Vec<u8>) -> Value {
        Value::Some(bytes)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Value {
        Value::Some(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Value {
        Value::Some(bytes.to_vec())
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Value {
        Value::Some(text.as_bytes().to_vec())
    }
}

impl Serialize for Value {
    fn serialize(&self, cursor: &mut Cursor<&mut Vec<u8>>, version: Version) {
        match self {
            Value::Some(bytes) => {
                let len = bytes.len() as CInt;
                len.serialize(cursor, version);
                bytes.serialize(cursor, version);
            }
            Value::Null => (-1 as CInt).serialize(cursor, version),
            Value::NotSet => (-2 as CInt).serialize(cursor, version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn some_value_is_length_prefixed() {
        let value = Value::new(vec![0xca, 0xfe]);
        assert_eq!(value.serialize_to_vec(Version::V4), [0, 0, 0, 2, 0xca, 0xfe]);
    }

    #[test]
    fn null_and_not_set_markers() {
        assert_eq!(
            Value::Null.serialize_to_vec(Version::V4),
            [0xff, 0xff, 0xff, 0xff]
        );
        assert_eq!(
            Value::NotSet.serialize_to_vec(Version::V4),
            [0xff, 0xff, 0xff, 0xfe]
        );
    }
}
