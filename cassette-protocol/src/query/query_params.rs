use std::io::Cursor;

use crate::consistency::Consistency;
use crate::frame::{Serialize, Version};
use crate::query::query_flags::QueryFlags;
use crate::query::query_values::QueryValues;
use crate::types::{CBytes, CInt, CIntShort, CLong};

/// Protocol-level parameters of a `QUERY` or `EXECUTE` body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    /// Cassandra consistency level.
    pub consistency: Consistency,
    /// Were values provided with names.
    pub with_names: bool,
    /// Bound values.
    pub values: Option<QueryValues>,
    /// Page size.
    pub page_size: Option<CInt>,
    /// Paging state from a previous result.
    pub paging_state: Option<CBytes>,
    /// Serial `Consistency` for lightweight transactions.
    pub serial_consistency: Option<Consistency>,
    /// Default timestamp in microseconds.
    pub timestamp: Option<CLong>,
}

impl QueryParams {
    fn flags(&self) -> QueryFlags {
        let mut flags = QueryFlags::empty();

        if self.values.is_some() {
            flags.insert(QueryFlags::VALUE);
        }

        if self.with_names {
            flags.insert(QueryFlags::WITH_NAMES_FOR_VALUES);
        }

        if self.page_size.is_some() {
            flags.insert(QueryFlags::PAGE_SIZE);
        }

        if self.paging_state.is_some() {
            flags.insert(QueryFlags::WITH_PAGING_STATE);
        }

        if self.serial_consistency.is_some() {
            flags.insert(QueryFlags::WITH_SERIAL_CONSISTENCY);
        }

        if self.timestamp.is_some() {
            flags.insert(QueryFlags::WITH_DEFAULT_TIMESTAMP);
        }

        flags
    }
}

impl Serialize for QueryParams {
    fn serialize(&self, cursor: &mut Cursor<&mut Vec<u8>>, version: Version) {
        self.consistency.serialize(cursor, version);

        self.flags().bits().serialize(cursor, version);

        if let Some(values) = &self.values {
            let len = values.len() as CIntShort;
            len.serialize(cursor, version);
            values.serialize(cursor, version);
        }

        if let Some(page_size) = self.page_size {
            page_size.serialize(cursor, version);
        }

        if let Some(paging_state) = &self.paging_state {
            paging_state.serialize(cursor, version);
        }

        if let Some(serial_consistency) = self.serial_consistency {
            serial_consistency.serialize(cursor, version);
        }

        if let Some(timestamp) = self.timestamp {
            timestamp.serialize(cursor, version);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_have_no_flags() {
        let params = QueryParams::default();
        // consistency short + one flag byte
        assert_eq!(params.serialize_to_vec(Version::V4), [0, 1, 0]);
    }

    #[test]
    fn values_set_the_value_flag() {
        let params = QueryParams {
            values: Some(QueryValues::from(vec![vec![1u8]])),
            ..Default::default()
        };

        let data = params.serialize_to_vec(Version::V4);
        assert_eq!(data[2], QueryFlags::VALUE.bits());
        // value count follows the flags
        assert_eq!(data[3..5], [0, 1]);
    }

    #[test]
    fn page_size_is_appended_after_values() {
        let params = QueryParams {
            page_size: Some(100),
            ..Default::default()
        };

        let data = params.serialize_to_vec(Version::V4);
        assert_eq!(data[2], QueryFlags::PAGE_SIZE.bits());
        assert_eq!(data[3..7], [0, 0, 0, 100]);
    }
}
