use derive_more::Constructor;

use cassette_protocol::consistency::Consistency;

/// Request properties a strategy may want to route on.
#[derive(Clone, Debug, Default, Constructor)]
pub struct Request {
    /// Consistency the request will be executed with, when known.
    pub consistency: Option<Consistency>,
}
