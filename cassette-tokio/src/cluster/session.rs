//! The session actor: a single-threaded event loop owning all host and
//! prepared-statement bookkeeping. Client calls and subsystem notifications
//! arrive through one inbox and are processed one at a time to completion,
//! which serializes every mutation without locks. The actor itself never
//! awaits anything but its inbox - all I/O happens on short-lived worker
//! tasks (see [`dispatch`](super::dispatch)).

use bytes::Bytes;
use derivative::Derivative;
use fxhash::FxHashMap;
use itertools::Itertools;
use std::collections::VecDeque;
use std::mem;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::*;

use crate::cluster::connection::{ConnectionHandle, ConnectionId};
use crate::cluster::connector::ClusterConnector;
use crate::cluster::dispatch::{dispatch_request, ReplyHandle};
use crate::cluster::fingerprint::Fingerprint;
use crate::cluster::host::{Host, HostId};
use crate::load_balancing::{
    LoadBalancingStrategy, QueryPlan, Request, RoundRobinLoadBalancingStrategy,
};
use crate::retry::{
    DefaultRetryPolicy, ExponentialReconnectionPolicy, ReconnectionPolicy, RetryPolicy,
};
use crate::statement::{StatementParams, StatementParamsBuilder};
use cassette_protocol::error::{Error, Result};
use cassette_protocol::frame::{Envelope, Flags, Version};
use cassette_protocol::query::{PreparedStatement, Query, QueryValues};

const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 128;

enum SessionEvent {
    Connect,
    Execute {
        query: String,
        params: StatementParams,
        reply: ReplyHandle,
    },
    Prepare {
        query: String,
        reply: oneshot::Sender<Result<String>>,
    },
    Send {
        envelope: Envelope,
        reply: ReplyHandle,
    },
    ConnectionOpened {
        host: HostId,
        connection: ConnectionHandle,
    },
    ConnectionClosed {
        host: HostId,
        connection: ConnectionId,
    },
    ConnectionStopped {
        host: HostId,
        connection: ConnectionId,
    },
    ConnectionProcessDown {
        connection: ConnectionId,
    },
    Prepared {
        host: HostId,
        fingerprint: Fingerprint,
        statement: PreparedStatement,
    },
    HostUp {
        host: HostId,
    },
    HostDown {
        host: HostId,
    },
    Shutdown,
}

struct PendingRequest {
    payload: Bytes,
    is_idempotent: bool,
    reply: Option<ReplyHandle>,
}

struct PendingPrepare {
    query: String,
    waiters: Vec<oneshot::Sender<Result<String>>>,
}

struct PendingExecute {
    encoded_prepare: Bytes,
    params: StatementParams,
    reply: ReplyHandle,
}

/// Channel the cluster and connection subsystems use to push notifications
/// into the session. Methods enqueue and return; events sent from a single
/// caller are processed in send order.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct SessionListener {
    #[derivative(Debug = "ignore")]
    sender: mpsc::Sender<SessionEvent>,
}

impl SessionListener {
    /// A connection to `host` is up and ready for requests. Also triggers a
    /// drain of any requests queued while no connection was open.
    pub async fn connection_opened(&self, host: HostId, connection: ConnectionHandle) {
        let _ = self
            .sender
            .send(SessionEvent::ConnectionOpened { host, connection })
            .await;
    }

    /// A connection went down but may come back; it stays tracked as closed.
    pub async fn connection_closed(&self, host: HostId, connection: ConnectionId) {
        let _ = self
            .sender
            .send(SessionEvent::ConnectionClosed { host, connection })
            .await;
    }

    /// A connection is gone for good.
    pub async fn connection_stopped(&self, host: HostId, connection: ConnectionId) {
        let _ = self
            .sender
            .send(SessionEvent::ConnectionStopped { host, connection })
            .await;
    }

    /// The process behind a connection died; the connection is removed from
    /// every host it was tracked under. Defensive companion to
    /// [`connection_stopped`](Self::connection_stopped), since the two can
    /// race.
    pub async fn connection_process_down(&self, connection: ConnectionId) {
        let _ = self
            .sender
            .send(SessionEvent::ConnectionProcessDown { connection })
            .await;
    }

    /// `host` acknowledged a `PREPARE`; the statement may now be executed
    /// there.
    pub async fn prepared(
        &self,
        host: HostId,
        fingerprint: Fingerprint,
        statement: PreparedStatement,
    ) {
        let _ = self
            .sender
            .send(SessionEvent::Prepared {
                host,
                fingerprint,
                statement,
            })
            .await;
    }

    pub async fn host_up(&self, host: HostId) {
        let _ = self.sender.send(SessionEvent::HostUp { host }).await;
    }

    pub async fn host_down(&self, host: HostId) {
        let _ = self.sender.send(SessionEvent::HostDown { host }).await;
    }
}

/// Cloneable client handle to a running session.
///
/// All three operations suspend the caller until a worker delivers the reply
/// or the session terminates. A caller that gives up on a pending operation
/// frees nothing: the dispatched worker still runs to completion and its
/// reply is discarded.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Session {
    #[derivative(Debug = "ignore")]
    sender: mpsc::Sender<SessionEvent>,
    #[derivative(Debug = "ignore")]
    reconnection_policy: Arc<dyn ReconnectionPolicy + Send + Sync>,
}

impl Session {
    /// Executes a statement. With non-empty bound values in
    /// `params.query_params.values`, the statement is transparently prepared
    /// on demand and executed against hosts known to hold it; otherwise it
    /// runs as a plain query.
    pub async fn execute<Q: ToString>(
        &self,
        query: Q,
        params: StatementParams,
    ) -> Result<Envelope> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(SessionEvent::Execute {
                query: query.to_string(),
                params,
                reply,
            })
            .await
            .map_err(|_| Error::ClusterGone)?;
        receiver.await.map_err(|_| Error::ClusterGone)?
    }

    /// Executes a query with default parameters.
    #[inline]
    pub async fn query<Q: ToString>(&self, query: Q) -> Result<Envelope> {
        self.execute(query, Default::default()).await
    }

    /// Executes a statement with bound values (either with or without
    /// names), preparing it on demand.
    #[inline]
    pub async fn execute_with_values<Q: ToString, V: Into<QueryValues>>(
        &self,
        query: Q,
        values: V,
    ) -> Result<Envelope> {
        self.execute(
            query,
            StatementParamsBuilder::new()
                .with_values(values.into())
                .build(),
        )
        .await
    }

    /// Prepares a statement on the cluster. Resolves once the first host
    /// acknowledges, with the statement text as the stable handle to pass to
    /// later [`execute`](Self::execute) calls.
    pub async fn prepare<Q: ToString>(&self, query: Q) -> Result<String> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(SessionEvent::Prepare {
                query: query.to_string(),
                reply,
            })
            .await
            .map_err(|_| Error::ClusterGone)?;
        receiver.await.map_err(|_| Error::ClusterGone)?
    }

    /// Escape hatch: sends an arbitrary pre-built request envelope.
    pub async fn send(&self, envelope: Envelope) -> Result<Envelope> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(SessionEvent::Send { envelope, reply })
            .await
            .map_err(|_| Error::ClusterGone)?;
        receiver.await.map_err(|_| Error::ClusterGone)?
    }

    /// Hands out a listener for pushing cluster and connection events into
    /// this session.
    pub fn listener(&self) -> SessionListener {
        SessionListener {
            sender: self.sender.clone(),
        }
    }

    /// The policy the connection subsystem must pace reconnection attempts
    /// with.
    pub fn reconnection_policy(&self) -> Arc<dyn ReconnectionPolicy + Send + Sync> {
        self.reconnection_policy.clone()
    }

    /// Hard shutdown: aborts in-flight workers and fails every pending
    /// caller with [`Error::ClusterGone`].
    pub async fn shutdown(&self) {
        let _ = self.sender.send(SessionEvent::Shutdown).await;
    }
}

/// Builder for [`Session`]. Defaults: round-robin load balancing, the
/// transport-error retry policy, exponential reconnection backoff, an
/// unbounded request queue and protocol V4.
pub struct SessionBuilder {
    cluster: Arc<dyn ClusterConnector>,
    load_balancing: Arc<dyn LoadBalancingStrategy>,
    retry_policy: Arc<dyn RetryPolicy + Send + Sync>,
    reconnection_policy: Arc<dyn ReconnectionPolicy + Send + Sync>,
    event_channel_capacity: usize,
    request_queue_limit: Option<usize>,
    version: Version,
}

impl SessionBuilder {
    pub fn new(cluster: Arc<dyn ClusterConnector>) -> Self {
        SessionBuilder {
            cluster,
            load_balancing: Arc::new(RoundRobinLoadBalancingStrategy::new()),
            retry_policy: Arc::new(DefaultRetryPolicy),
            reconnection_policy: Arc::new(ExponentialReconnectionPolicy::default()),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            request_queue_limit: None,
            version: Version::V4,
        }
    }

    #[must_use]
    pub fn with_load_balancing(mut self, load_balancing: Arc<dyn LoadBalancingStrategy>) -> Self {
        self.load_balancing = load_balancing;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: Arc<dyn RetryPolicy + Send + Sync>) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    #[must_use]
    pub fn with_reconnection_policy(
        mut self,
        reconnection_policy: Arc<dyn ReconnectionPolicy + Send + Sync>,
    ) -> Self {
        self.reconnection_policy = reconnection_policy;
        self
    }

    /// Sets inbox capacity. Senders briefly back-pressure when the session
    /// falls behind.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, event_channel_capacity: usize) -> Self {
        self.event_channel_capacity = event_channel_capacity;
        self
    }

    /// Bounds the queue of requests accepted while no connection is open.
    /// Beyond the limit callers get [`Error::NoConnectionsAvailable`]
    /// instead of queueing. Unbounded by default.
    #[must_use]
    pub fn with_request_queue_limit(mut self, request_queue_limit: usize) -> Self {
        self.request_queue_limit = Some(request_queue_limit);
        self
    }

    #[must_use]
    pub fn with_protocol_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Builds the session, registers it with the cluster and spawns its
    /// event loop. Must be called within a tokio runtime.
    pub fn build(self) -> Session {
        let (sender, inbox) = mpsc::channel(self.event_channel_capacity);

        self.cluster.register(SessionListener {
            sender: sender.clone(),
        });

        let actor = SessionActor {
            cluster: Arc::downgrade(&self.cluster),
            load_balancing: self.load_balancing,
            retry_policy: self.retry_policy,
            hosts: Default::default(),
            pending_requests: Default::default(),
            pending_prepares: Default::default(),
            pending_executes: Default::default(),
            request_queue_limit: self.request_queue_limit,
            version: self.version,
            workers: JoinSet::new(),
        };

        // initial connect is a self-scheduled event; the channel is fresh,
        // so this cannot fail
        let _ = sender.try_send(SessionEvent::Connect);

        tokio::spawn(actor.run(inbox));

        Session {
            sender,
            reconnection_policy: self.reconnection_policy,
        }
    }
}

struct SessionActor {
    cluster: Weak<dyn ClusterConnector>,
    load_balancing: Arc<dyn LoadBalancingStrategy>,
    retry_policy: Arc<dyn RetryPolicy + Send + Sync>,
    hosts: FxHashMap<HostId, Host>,
    pending_requests: VecDeque<PendingRequest>,
    pending_prepares: FxHashMap<Fingerprint, PendingPrepare>,
    pending_executes: FxHashMap<Fingerprint, Vec<PendingExecute>>,
    request_queue_limit: Option<usize>,
    version: Version,
    workers: JoinSet<()>,
}

impl SessionActor {
    async fn run(mut self, mut inbox: mpsc::Receiver<SessionEvent>) {
        while let Some(event) = inbox.recv().await {
            let proceed = match event {
                SessionEvent::Shutdown => {
                    debug!("Session shutting down.");
                    false
                }
                event => self.handle_event(event),
            };

            // reap finished workers so the set doesn't grow without bound
            while self.workers.try_join_next().is_some() {}

            if !proceed {
                break;
            }
        }

        self.fail_pending();
        // dropping the worker set aborts whatever is still in flight
    }

    /// Processes one event to completion. Returns `false` when the session
    /// must terminate.
    fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Connect => self.connect(),
            SessionEvent::Execute {
                query,
                params,
                reply,
            } => {
                self.execute(query, params, reply);
                true
            }
            SessionEvent::Prepare { query, reply } => {
                self.prepare(query, reply);
                true
            }
            SessionEvent::Send { envelope, reply } => {
                self.encode_and_dispatch(envelope, false, Some(reply));
                true
            }
            SessionEvent::ConnectionOpened { host, connection } => {
                self.connection_opened(host, connection);
                true
            }
            SessionEvent::ConnectionClosed { host, connection } => {
                if let Some(host) = self.hosts.get_mut(&host) {
                    host.set_closed(connection);
                }
                true
            }
            SessionEvent::ConnectionStopped { host, connection } => {
                if let Some(host) = self.hosts.get_mut(&host) {
                    host.remove_connection(connection);
                }
                true
            }
            SessionEvent::ConnectionProcessDown { connection } => {
                warn!(%connection, "Connection process down; removing it from all hosts.");
                for host in self.hosts.values_mut() {
                    host.remove_connection(connection);
                }
                true
            }
            SessionEvent::Prepared {
                host,
                fingerprint,
                statement,
            } => {
                self.prepared(host, fingerprint, statement);
                true
            }
            SessionEvent::HostUp { host } => self.host_up(host),
            SessionEvent::HostDown { host } => {
                self.host_down(host);
                true
            }
            SessionEvent::Shutdown => false,
        }
    }

    fn connect(&mut self) -> bool {
        let Some(cluster) = self.cluster.upgrade() else {
            error!("Cluster handle lost before initial connect!");
            return false;
        };

        for address in cluster.up_hosts() {
            let host = self
                .hosts
                .entry(address)
                .or_insert_with(|| Host::new(address));
            host.mark_up();

            let target = self.load_balancing.target_connection_count(host);
            debug!(%address, target, "Requesting initial connections.");
            cluster.request_connections(address, target);
        }

        true
    }

    fn execute(&mut self, query: String, params: StatementParams, reply: ReplyHandle) {
        let has_values = params
            .query_params
            .values
            .as_ref()
            .map(|values| !values.is_empty())
            .unwrap_or(false);

        if has_values {
            self.execute_prepared(query, params, reply);
        } else {
            let is_idempotent = params.is_idempotent;
            let envelope = Envelope::new_query(
                Query {
                    query,
                    params: params.query_params,
                },
                Flags::empty(),
                self.version,
            );
            self.encode_and_dispatch(envelope, is_idempotent, Some(reply));
        }
    }

    fn prepare(&mut self, query: String, reply: oneshot::Sender<Result<String>>) {
        let envelope = Envelope::new_req_prepare(query.clone(), Flags::empty(), self.version);
        let payload = match envelope.encode() {
            Ok(encoded) => Bytes::from(encoded),
            Err(error) => {
                let _ = reply.send(Err(error));
                return;
            }
        };

        let fingerprint = Fingerprint::of_prepare(&payload);

        // a live host already holding the statement answers immediately
        if self
            .hosts
            .values()
            .any(|host| !host.is_down() && host.has_prepared(&fingerprint))
        {
            let _ = reply.send(Ok(query));
            return;
        }

        debug!(%fingerprint, "Preparing statement.");
        self.pending_prepares
            .entry(fingerprint)
            .or_insert_with(|| PendingPrepare {
                query,
                waiters: vec![],
            })
            .waiters
            .push(reply);

        // the reply path is driven by the `prepared` event, not by worker
        // completion, hence no reply handle here
        self.dispatch_or_enqueue(payload, true, None);
    }

    fn execute_prepared(&mut self, query: String, params: StatementParams, reply: ReplyHandle) {
        let envelope = Envelope::new_req_prepare(query, Flags::empty(), self.version);
        let payload = match envelope.encode() {
            Ok(encoded) => Bytes::from(encoded),
            Err(error) => {
                let _ = reply.send(Err(error));
                return;
            }
        };

        let fingerprint = Fingerprint::of_prepare(&payload);
        self.drive_execute(fingerprint, payload, params, reply);
    }

    /// Routes an execute to hosts known to hold the statement. With no such
    /// host connected, the execute is parked and a `PREPARE` goes out first;
    /// the `prepared` event re-enters this function.
    fn drive_execute(
        &mut self,
        fingerprint: Fingerprint,
        encoded_prepare: Bytes,
        params: StatementParams,
        reply: ReplyHandle,
    ) {
        let routed = {
            let preferred = self
                .hosts
                .values()
                .filter(|host| {
                    !host.is_down() && host.has_prepared(&fingerprint) && host.open_count() > 0
                })
                .collect_vec();

            preferred
                .first()
                .and_then(|host| host.prepared(&fingerprint))
                .map(|statement| {
                    let envelope = Envelope::new_req_execute(
                        &statement.id,
                        &params.query_params,
                        Flags::empty(),
                        self.version,
                    );
                    let request = Request::new(Some(params.query_params.consistency));
                    (envelope, self.load_balancing.select(&preferred, &request))
                })
        };

        match routed {
            Some((envelope, plan)) => match envelope.encode() {
                Ok(encoded) => {
                    debug!(%fingerprint, "Executing prepared statement on preferred hosts.");
                    self.spawn_worker(
                        Bytes::from(encoded),
                        params.is_idempotent,
                        plan,
                        Some(reply),
                    );
                }
                Err(error) => {
                    let _ = reply.send(Err(error));
                }
            },
            None => {
                debug!(%fingerprint, "Statement not prepared on any connected host; issuing PREPARE.");
                self.pending_executes
                    .entry(fingerprint)
                    .or_default()
                    .push(PendingExecute {
                        encoded_prepare: encoded_prepare.clone(),
                        params,
                        reply,
                    });
                self.dispatch_or_enqueue(encoded_prepare, true, None);
            }
        }
    }

    fn connection_opened(&mut self, address: HostId, connection: ConnectionHandle) {
        debug!(%address, connection = %connection.id(), "Connection opened.");
        self.hosts
            .entry(address)
            .or_insert_with(|| Host::new(address))
            .add_connection(connection);

        if !self.pending_requests.is_empty() {
            // the queue must empty in one step: a second connection_opened
            // arriving mid-drain must not re-dispatch the same work
            let drained = mem::take(&mut self.pending_requests);
            debug!(count = drained.len(), "Draining queued requests.");

            for pending in drained {
                let plan = self.query_plan();
                self.spawn_worker(pending.payload, pending.is_idempotent, plan, pending.reply);
            }
        }
    }

    fn prepared(&mut self, address: HostId, fingerprint: Fingerprint, statement: PreparedStatement) {
        match self.hosts.get_mut(&address) {
            Some(host) => host.put_prepared(fingerprint, statement),
            None => {
                warn!(%address, %fingerprint, "Prepared notification from an unknown host.");
                return;
            }
        }

        if let Some(pending) = self.pending_prepares.remove(&fingerprint) {
            debug!(%fingerprint, waiters = pending.waiters.len(), "Statement prepared; answering waiters.");
            for waiter in pending.waiters {
                let _ = waiter.send(Ok(pending.query.clone()));
            }
        }

        if let Some(pending) = self.pending_executes.remove(&fingerprint) {
            for execute in pending {
                self.drive_execute(
                    fingerprint,
                    execute.encoded_prepare,
                    execute.params,
                    execute.reply,
                );
            }
        }
    }

    fn host_up(&mut self, address: HostId) -> bool {
        let Some(cluster) = self.cluster.upgrade() else {
            error!("Cluster handle lost!");
            return false;
        };

        let host = self
            .hosts
            .entry(address)
            .or_insert_with(|| Host::new(address));
        host.mark_up();

        let target = self.load_balancing.target_connection_count(host);
        let existing = host.connection_count();
        if existing < target {
            let needed = target - existing;
            debug!(%address, needed, "Host up; topping up connections.");
            cluster.request_connections(address, needed);
        }

        true
    }

    fn host_down(&mut self, address: HostId) {
        if let Some(host) = self.hosts.get_mut(&address) {
            // the server forgot its prepared statements along with everything
            // else; the host record itself stays
            warn!(%address, "Host down; dropping its prepared statements.");
            host.mark_down();
            host.clear_prepared();
        }
    }

    fn encode_and_dispatch(
        &mut self,
        envelope: Envelope,
        is_idempotent: bool,
        reply: Option<ReplyHandle>,
    ) {
        match envelope.encode() {
            Ok(encoded) => self.dispatch_or_enqueue(Bytes::from(encoded), is_idempotent, reply),
            Err(error) => {
                error!(%error, "Failed to encode request.");
                if let Some(reply) = reply {
                    let _ = reply.send(Err(error));
                }
            }
        }
    }

    fn dispatch_or_enqueue(
        &mut self,
        payload: Bytes,
        is_idempotent: bool,
        reply: Option<ReplyHandle>,
    ) {
        if self.open_connection_count() == 0 {
            if let Some(limit) = self.request_queue_limit {
                if self.pending_requests.len() >= limit {
                    warn!(limit, "Request queue full; rejecting request.");
                    if let Some(reply) = reply {
                        let _ = reply.send(Err(Error::NoConnectionsAvailable));
                    }
                    return;
                }
            }

            debug!("No open connections; queueing request.");
            self.pending_requests.push_back(PendingRequest {
                payload,
                is_idempotent,
                reply,
            });
            return;
        }

        let plan = self.query_plan();
        self.spawn_worker(payload, is_idempotent, plan, reply);
    }

    fn query_plan(&self) -> QueryPlan {
        let hosts = self.hosts.values().collect_vec();
        self.load_balancing.select(&hosts, &Request::default())
    }

    fn spawn_worker(
        &mut self,
        payload: Bytes,
        is_idempotent: bool,
        plan: QueryPlan,
        reply: Option<ReplyHandle>,
    ) {
        let retry_session = self.retry_policy.new_session();
        self.workers
            .spawn(dispatch_request(payload, is_idempotent, plan, retry_session, reply));
    }

    fn open_connection_count(&self) -> usize {
        self.hosts
            .values()
            .filter(|host| !host.is_down())
            .map(Host::open_count)
            .sum()
    }

    fn fail_pending(&mut self) {
        for pending in mem::take(&mut self.pending_requests) {
            if let Some(reply) = pending.reply {
                let _ = reply.send(Err(Error::ClusterGone));
            }
        }

        for (_, pending) in mem::take(&mut self.pending_prepares) {
            for waiter in pending.waiters {
                let _ = waiter.send(Err(Error::ClusterGone));
            }
        }

        for (_, pending) in mem::take(&mut self.pending_executes) {
            for execute in pending {
                let _ = execute.reply.send(Err(Error::ClusterGone));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::connection::MockCqlConnection;
    use crate::cluster::connector::MockClusterConnector;
    use cassette_protocol::types::CBytesShort;

    fn actor(cluster: &Arc<dyn ClusterConnector>) -> SessionActor {
        SessionActor {
            cluster: Arc::downgrade(cluster),
            load_balancing: Arc::new(RoundRobinLoadBalancingStrategy::new()),
            retry_policy: Arc::new(DefaultRetryPolicy),
            hosts: Default::default(),
            pending_requests: Default::default(),
            pending_prepares: Default::default(),
            pending_executes: Default::default(),
            request_queue_limit: None,
            version: Version::V4,
            workers: JoinSet::new(),
        }
    }

    fn connector() -> Arc<dyn ClusterConnector> {
        Arc::new(MockClusterConnector::new())
    }

    fn address() -> HostId {
        "127.0.0.1:9042".parse().unwrap()
    }

    fn open_connection(actor: &mut SessionActor, address: HostId) -> ConnectionHandle {
        let connection = ConnectionHandle::new(Arc::new(MockCqlConnection::new()));
        actor.handle_event(SessionEvent::ConnectionOpened {
            host: address,
            connection: connection.clone(),
        });
        connection
    }

    fn fingerprint(query: &str) -> Fingerprint {
        let encoded = Envelope::new_req_prepare(query.into(), Flags::empty(), Version::V4)
            .encode()
            .unwrap();
        Fingerprint::of_prepare(&encoded)
    }

    #[test]
    fn bounded_queue_rejects_overflow() {
        let cluster = connector();
        let mut actor = actor(&cluster);
        actor.request_queue_limit = Some(0);

        let (reply, mut receiver) = oneshot::channel();
        actor.handle_event(SessionEvent::Send {
            envelope: Envelope::new_query(Query::default(), Flags::empty(), Version::V4),
            reply,
        });

        assert!(matches!(
            receiver.try_recv(),
            Ok(Err(Error::NoConnectionsAvailable))
        ));
    }

    #[test]
    fn host_down_keeps_the_host_but_drops_prepared_state() {
        let cluster = connector();
        let mut actor = actor(&cluster);
        let address = address();
        open_connection(&mut actor, address);

        let fingerprint = fingerprint("SELECT * FROM t WHERE k = ?");
        actor.handle_event(SessionEvent::Prepared {
            host: address,
            fingerprint,
            statement: PreparedStatement::new(CBytesShort::new(vec![1]), "q".into()),
        });
        assert!(actor.hosts[&address].has_prepared(&fingerprint));

        actor.handle_event(SessionEvent::HostDown { host: address });

        let host = &actor.hosts[&address];
        assert!(host.is_down());
        assert!(!host.has_prepared(&fingerprint));
        // down hosts contribute no dispatchable connections
        assert_eq!(actor.open_connection_count(), 0);
    }

    #[test]
    fn prepared_from_unknown_host_is_ignored() {
        let cluster = connector();
        let mut actor = actor(&cluster);

        actor.handle_event(SessionEvent::Prepared {
            host: address(),
            fingerprint: fingerprint("SELECT 1"),
            statement: PreparedStatement::new(CBytesShort::new(vec![1]), "q".into()),
        });

        assert!(actor.hosts.is_empty());
    }

    #[test]
    fn connection_lifecycle_bookkeeping() {
        let cluster = connector();
        let mut actor = actor(&cluster);
        let address = address();

        let connection = open_connection(&mut actor, address);
        assert_eq!(actor.open_connection_count(), 1);

        actor.handle_event(SessionEvent::ConnectionClosed {
            host: address,
            connection: connection.id(),
        });
        assert_eq!(actor.open_connection_count(), 0);
        assert_eq!(actor.hosts[&address].connection_count(), 1);

        actor.handle_event(SessionEvent::ConnectionProcessDown {
            connection: connection.id(),
        });
        assert_eq!(actor.hosts[&address].connection_count(), 0);
    }

    #[test]
    fn losing_the_cluster_terminates_the_session() {
        let cluster = connector();
        let mut actor = actor(&cluster);
        drop(cluster);

        assert!(!actor.handle_event(SessionEvent::Connect));
    }
}
