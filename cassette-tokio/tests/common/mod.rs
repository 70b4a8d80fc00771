#![allow(dead_code)]

use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cassette_protocol::error::{Error, Result};
use cassette_protocol::frame::{Direction, Envelope, Flags, Opcode, Version};
use cassette_tokio::cluster::session::SessionListener;
use cassette_tokio::cluster::{ClusterConnector, ConnectionHandle, CqlConnection, Fingerprint, HostId};
use cassette_tokio::future::BoxFuture;

/// Connection double: records every payload synchronously at dispatch time
/// (so recorded order is dispatch order) and replies with scripted errors
/// first, then a canned `RESULT` envelope.
pub struct FakeConnection {
    payloads: Mutex<Vec<Bytes>>,
    errors: Mutex<VecDeque<Error>>,
}

impl FakeConnection {
    pub fn new() -> Arc<Self> {
        Self::with_errors(vec![])
    }

    /// Fails the first `errors.len()` sends with the given errors, in order.
    pub fn with_errors(errors: Vec<Error>) -> Arc<Self> {
        Arc::new(FakeConnection {
            payloads: Mutex::new(vec![]),
            errors: Mutex::new(errors.into()),
        })
    }

    pub fn payloads(&self) -> Vec<Bytes> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }
}

impl CqlConnection for FakeConnection {
    fn send(&self, payload: Bytes) -> BoxFuture<'static, Result<Envelope>> {
        self.payloads.lock().unwrap().push(payload);
        let scripted = self.errors.lock().unwrap().pop_front();

        Box::pin(async move {
            match scripted {
                Some(error) => Err(error),
                None => Ok(Envelope::new(
                    Version::V4,
                    Direction::Response,
                    Flags::empty(),
                    Opcode::Result,
                    vec![],
                    None,
                )),
            }
        })
    }
}

/// Connector double: hands out a static host list, records connection
/// requests and keeps the registered listener for the test to drive.
#[derive(Default)]
pub struct FakeCluster {
    hosts: Mutex<Vec<HostId>>,
    requests: Mutex<Vec<(HostId, usize)>>,
    listener: Mutex<Option<SessionListener>>,
}

impl FakeCluster {
    pub fn new(hosts: Vec<HostId>) -> Arc<Self> {
        Arc::new(FakeCluster {
            hosts: Mutex::new(hosts),
            ..Default::default()
        })
    }

    pub fn connection_requests(&self) -> Vec<(HostId, usize)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn listener(&self) -> SessionListener {
        self.listener
            .lock()
            .unwrap()
            .clone()
            .expect("session should have registered a listener")
    }
}

impl ClusterConnector for FakeCluster {
    fn up_hosts(&self) -> Vec<HostId> {
        self.hosts.lock().unwrap().clone()
    }

    fn request_connections(&self, host: HostId, count: usize) {
        self.requests.lock().unwrap().push((host, count));
    }

    fn register(&self, listener: SessionListener) {
        *self.listener.lock().unwrap() = Some(listener);
    }
}

pub fn host(n: u8) -> HostId {
    format!("127.0.0.{n}:9042").parse().unwrap()
}

pub fn handle(connection: &Arc<FakeConnection>) -> ConnectionHandle {
    ConnectionHandle::new(connection.clone())
}

/// Barrier for paused-clock tests: yields until every task is idle, then
/// advances time past the sleep.
pub async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

pub fn opcode_of(payload: &Bytes) -> u8 {
    payload[4]
}

pub fn payload_contains(payload: &[u8], needle: &[u8]) -> bool {
    payload.windows(needle.len()).any(|window| window == needle)
}

/// The fingerprint the session derives for a statement text.
pub fn fingerprint_of(query: &str) -> Fingerprint {
    let encoded = Envelope::new_req_prepare(query.into(), Flags::empty(), Version::V4)
        .encode()
        .unwrap();
    Fingerprint::of_prepare(&encoded)
}
