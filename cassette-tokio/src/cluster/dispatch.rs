use bytes::Bytes;
use tokio::sync::oneshot;
use tracing::*;

use crate::cluster::connection::ConnectionHandle;
use crate::retry::{RequestInfo, RetryDecision, RetrySession};
use cassette_protocol::error::{Error, Result};
use cassette_protocol::frame::Envelope;

/// One-shot channel a caller waits on for the outcome of a request.
pub(crate) type ReplyHandle = oneshot::Sender<Result<Envelope>>;

/// Walks an ordered candidate list for a single request: write the frame,
/// await the reply, and on failure let the retry session pick between the
/// same connection, the next one, or giving up. Runs as a fire-and-forget
/// task so the session event loop never waits on I/O.
///
/// Prepares are dispatched with no reply handle - their outcome reaches the
/// caller through the `prepared` event path instead - in which case results
/// are simply dropped here.
pub(crate) async fn dispatch_request(
    payload: Bytes,
    is_idempotent: bool,
    candidates: Vec<ConnectionHandle>,
    mut retry_session: Box<dyn RetrySession + Send + Sync>,
    reply: Option<ReplyHandle>,
) {
    let mut last_error = Error::General("No connections in query plan!".into());

    'next_connection: for connection in candidates {
        loop {
            match connection.send(payload.clone()).await {
                Ok(envelope) => {
                    deliver(reply, Ok(envelope));
                    return;
                }
                Err(error) => {
                    let info = RequestInfo {
                        error: &error,
                        is_idempotent,
                    };

                    match retry_session.decide(info) {
                        RetryDecision::RetrySameNode => {
                            debug!(%error, connection = %connection.id(), "Retrying on the same connection.");
                            last_error = error;
                        }
                        RetryDecision::RetryNextNode => {
                            debug!(%error, connection = %connection.id(), "Trying next connection.");
                            last_error = error;
                            continue 'next_connection;
                        }
                        RetryDecision::DontRetry => {
                            deliver(reply, Err(error));
                            return;
                        }
                    }
                }
            }
        }
    }

    warn!(%last_error, "Exhausted all candidate connections.");
    deliver(reply, Err(last_error));
}

fn deliver(reply: Option<ReplyHandle>, result: Result<Envelope>) {
    if let Some(reply) = reply {
        // the caller may have gone away; the reply is then discarded
        let _ = reply.send(result);
    }
}
