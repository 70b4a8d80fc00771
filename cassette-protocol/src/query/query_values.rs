use std::collections::HashMap;
use std::io::Cursor;

use crate::frame::{Serialize, Version};
use crate::types::value::Value;
use crate::types::serialize_str;

/// Values bound to query parameters, either positional or named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValues {
    SimpleValues(Vec<Value>),
    NamedValues(HashMap<String, Value>),
}

impl QueryValues {
    /// Number of bound values.
    pub fn len(&self) -> usize {
        match self {
            QueryValues::SimpleValues(values) => values.len(),
            QueryValues::NamedValues(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if values were provided with names.
    pub fn has_names(&self) -> bool {
        matches!(self, QueryValues::NamedValues(_))
    }
}

impl<T: Into<Value>> From<Vec<T>> for QueryValues {
    fn from(values: Vec<T>) -> QueryValues {
        QueryValues::SimpleValues(values.into_iter().map(Into::into).collect())
    }
}

impl<S: ToString, T: Into<Value>> From<HashMap<S, T>> for QueryValues {
    fn from(values: HashMap<S, T>) -> QueryValues {
        QueryValues::NamedValues(
            values
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.into()))
                .collect(),
        )
    }
}

impl Serialize for QueryValues {
    fn serialize(&self, cursor: &mut Cursor<&mut Vec<u8>>, version: Version) {
        match self {
            QueryValues::SimpleValues(values) => {
                for value in values {
                    value.serialize(cursor, version);
                }
            }
            QueryValues::NamedValues(values) => {
                for (name, value) in values {
                    serialize_str(cursor, name, version);
                    value.serialize(cursor, version);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_values_serialize_in_order() {
        let values = QueryValues::from(vec![vec![1u8], vec![2u8]]);
        assert_eq!(values.len(), 2);
        assert_eq!(
            values.serialize_to_vec(Version::V4),
            [0, 0, 0, 1, 1, 0, 0, 0, 1, 2]
        );
    }

    #[test]
    fn named_values_carry_names() {
        let mut map = HashMap::new();
        map.insert("k", vec![7u8]);

        let values = QueryValues::from(map);
        assert!(values.has_names());
        assert_eq!(
            values.serialize_to_vec(Version::V4),
            [0, 1, b'k', 0, 0, 0, 1, 7]
        );
    }
}
