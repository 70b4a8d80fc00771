use cassette_protocol::consistency::Consistency;
use cassette_protocol::query::{QueryParams, QueryValues};
use cassette_protocol::types::{CBytes, CInt, CLong};

/// Parameters of a statement execution. Bound values are what flips the
/// session from the plain-query path into prepare-and-execute: a statement
/// with non-empty `values` is prepared on demand and executed via each
/// host's prepared-statement cache.
#[derive(Default, Clone, Debug)]
pub struct StatementParams {
    /// Protocol-level parameters.
    pub query_params: QueryParams,
    /// Is the statement idempotent. Consulted by idempotence-aware retry
    /// policies before replaying a statement on another connection.
    pub is_idempotent: bool,
}

/// Builder for [`StatementParams`].
#[derive(Debug, Default)]
pub struct StatementParamsBuilder {
    params: StatementParams,
}

impl StatementParamsBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    #[must_use]
    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.params.query_params.consistency = consistency;
        self
    }

    #[must_use]
    pub fn with_values(mut self, values: QueryValues) -> Self {
        self.params.query_params.with_names = values.has_names();
        self.params.query_params.values = Some(values);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: CInt) -> Self {
        self.params.query_params.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn with_paging_state(mut self, paging_state: CBytes) -> Self {
        self.params.query_params.paging_state = Some(paging_state);
        self
    }

    #[must_use]
    pub fn with_serial_consistency(mut self, serial_consistency: Consistency) -> Self {
        self.params.query_params.serial_consistency = Some(serial_consistency);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: CLong) -> Self {
        self.params.query_params.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn idempotent(mut self, is_idempotent: bool) -> Self {
        self.params.is_idempotent = is_idempotent;
        self
    }

    pub fn build(self) -> StatementParams {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_carries_values_and_names() {
        let params = StatementParamsBuilder::new()
            .with_consistency(Consistency::LocalQuorum)
            .with_values(QueryValues::from(vec![vec![1u8]]))
            .idempotent(true)
            .build();

        assert_eq!(params.query_params.consistency, Consistency::LocalQuorum);
        assert!(!params.query_params.with_names);
        assert!(params.is_idempotent);
        assert_eq!(params.query_params.values.unwrap().len(), 1);
    }
}
