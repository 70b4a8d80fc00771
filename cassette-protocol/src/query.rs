//! Query-side types: raw statements, parameters, bound values and prepared
//! statements.

mod prepared_query;
mod query_flags;
mod query_params;
mod query_values;

pub use crate::query::prepared_query::PreparedStatement;
pub use crate::query::query_flags::QueryFlags;
pub use crate::query::query_params::QueryParams;
pub use crate::query::query_values::QueryValues;

/// A raw CQL statement with its protocol-level parameters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Query {
    pub query: String,
    pub params: QueryParams,
}
