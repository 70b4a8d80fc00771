use derive_more::Display;

use cassette_protocol::error::Error;

/// What a worker should do with a failing request.
#[derive(Debug, PartialEq, Eq, Ord, PartialOrd, Hash, Copy, Clone, Display)]
pub enum RetryDecision {
    RetrySameNode,
    RetryNextNode,
    DontRetry,
}

/// Information about a failed request.
pub struct RequestInfo<'a> {
    pub error: &'a Error,
    pub is_idempotent: bool,
}

/// Request-scoped state of retrying. Runs inside the dispatching worker and
/// must not touch session state.
pub trait RetrySession {
    /// Decide what to do with the failing request.
    fn decide(&mut self, info: RequestInfo) -> RetryDecision;
}

/// Retry policy determines what to do in case of a communication error.
pub trait RetryPolicy {
    /// Called for each new request, starts a session of deciding about
    /// retries.
    fn new_session(&self) -> Box<dyn RetrySession + Send + Sync>;
}

/// Default policy: transient transport failures move on to the next
/// candidate, everything the server actually answered (including error
/// bodies) is surfaced to the caller.
#[derive(Default, Debug, Copy, Clone)]
pub struct DefaultRetryPolicy;

impl RetryPolicy for DefaultRetryPolicy {
    fn new_session(&self) -> Box<dyn RetrySession + Send + Sync> {
        Box::new(DefaultRetrySession)
    }
}

struct DefaultRetrySession;

impl RetrySession for DefaultRetrySession {
    fn decide(&mut self, info: RequestInfo) -> RetryDecision {
        match info.error {
            Error::Io(_) | Error::Timeout(_) => RetryDecision::RetryNextNode,
            _ => RetryDecision::DontRetry,
        }
    }
}

/// Forwards all errors directly to the user, never retries.
#[derive(Default, Debug, Copy, Clone)]
pub struct FallthroughRetryPolicy;

impl RetryPolicy for FallthroughRetryPolicy {
    fn new_session(&self) -> Box<dyn RetrySession + Send + Sync> {
        Box::new(FallthroughRetrySession)
    }
}

struct FallthroughRetrySession;

impl RetrySession for FallthroughRetrySession {
    fn decide(&mut self, _info: RequestInfo) -> RetryDecision {
        RetryDecision::DontRetry
    }
}

/// Production-grade variant of [`DefaultRetryPolicy`]: only statements
/// explicitly marked idempotent hop to the next candidate on a transport
/// failure. A non-idempotent write that timed out may have been applied, so
/// it is surfaced instead of replayed.
#[derive(Default, Debug, Copy, Clone)]
pub struct IdempotentRetryPolicy;

impl RetryPolicy for IdempotentRetryPolicy {
    fn new_session(&self) -> Box<dyn RetrySession + Send + Sync> {
        Box::new(IdempotentRetrySession)
    }
}

struct IdempotentRetrySession;

impl RetrySession for IdempotentRetrySession {
    fn decide(&mut self, info: RequestInfo) -> RetryDecision {
        match info.error {
            Error::Io(_) | Error::Timeout(_) if info.is_idempotent => RetryDecision::RetryNextNode,
            _ => RetryDecision::DontRetry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn io_error() -> Error {
        Error::Io(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
    }

    fn server_error() -> Error {
        Error::Server {
            code: 0x2200,
            message: "Invalid query".into(),
        }
    }

    fn decide(policy: &dyn RetryPolicy, error: &Error, is_idempotent: bool) -> RetryDecision {
        policy.new_session().decide(RequestInfo {
            error,
            is_idempotent,
        })
    }

    #[test]
    fn default_retries_transport_errors_on_next_node() {
        let policy = DefaultRetryPolicy;
        assert_eq!(
            decide(&policy, &io_error(), false),
            RetryDecision::RetryNextNode
        );
        assert_eq!(
            decide(&policy, &Error::Timeout("t".into()), false),
            RetryDecision::RetryNextNode
        );
    }

    #[test]
    fn default_surfaces_server_errors() {
        assert_eq!(
            decide(&DefaultRetryPolicy, &server_error(), true),
            RetryDecision::DontRetry
        );
    }

    #[test]
    fn fallthrough_never_retries() {
        assert_eq!(
            decide(&FallthroughRetryPolicy, &io_error(), true),
            RetryDecision::DontRetry
        );
    }

    #[test]
    fn idempotent_policy_honors_the_flag() {
        let policy = IdempotentRetryPolicy;
        assert_eq!(
            decide(&policy, &io_error(), true),
            RetryDecision::RetryNextNode
        );
        assert_eq!(
            decide(&policy, &io_error(), false),
            RetryDecision::DontRetry
        );
    }
}
