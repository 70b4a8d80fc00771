//! Envelope framing. An [`Envelope`] is the unit both requests and replies
//! travel in; the session only ever encodes requests and treats reply bodies
//! as opaque.

use bitflags::bitflags;
use derive_more::Display;
use std::convert::TryFrom;
use std::sync::atomic::{AtomicI16, Ordering};
use uuid::Uuid;

pub mod message_execute;
pub mod message_prepare;
pub mod message_query;
pub mod message_result;
pub mod traits;

pub use crate::frame::traits::*;

use crate::error;
use crate::types::CInt;

/// Number of stream bytes in accordance to protocol.
pub const STREAM_LEN: usize = 2;
/// Number of body length bytes in accordance to protocol.
pub const LENGTH_LEN: usize = 4;
/// Total header size of an encoded envelope. Everything past this offset is
/// the body, which is a stable function of the request (headers carry a
/// per-envelope stream id and are not).
pub const HEADER_LEN: usize = 1 + Flags::BYTE_LENGTH + STREAM_LEN + Opcode::BYTE_LENGTH + LENGTH_LEN;

const INITIAL_STREAM_ID: i16 = 1;
/// Stream id reserved for server-pushed events.
pub const EVENT_STREAM_ID: i16 = -1;

static STREAM_ID: AtomicI16 = AtomicI16::new(INITIAL_STREAM_ID);

pub type StreamId = i16;

fn next_stream_id() -> StreamId {
    loop {
        let stream = STREAM_ID.fetch_add(1, Ordering::SeqCst);
        if stream < 0 {
            match STREAM_ID.compare_exchange_weak(
                stream,
                INITIAL_STREAM_ID,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return INITIAL_STREAM_ID,
                Err(_) => continue,
            }
        }

        return stream;
    }
}

/// A single protocol envelope: header plus an already-serialized body.
#[derive(Debug, Clone, PartialEq, Ord, PartialOrd, Eq, Hash)]
pub struct Envelope {
    pub version: Version,
    pub direction: Direction,
    pub flags: Flags,
    pub opcode: Opcode,
    pub stream: StreamId,
    pub body: Vec<u8>,
    pub tracing_id: Option<Uuid>,
}

impl Envelope {
    /// Creates a new envelope with a freshly allocated stream id.
    pub fn new(
        version: Version,
        direction: Direction,
        flags: Flags,
        opcode: Opcode,
        body: Vec<u8>,
        tracing_id: Option<Uuid>,
    ) -> Self {
        Envelope {
            version,
            direction,
            flags,
            opcode,
            stream: next_stream_id(),
            body,
            tracing_id,
        }
    }

    /// Encodes the whole envelope (header and body) into wire bytes.
    pub fn encode(&self) -> error::Result<Vec<u8>> {
        let body_len = CInt::try_from(self.body.len()).map_err(|_| {
            error::Error::Encode(format!(
                "Envelope body of {} bytes exceeds the maximum frame size!",
                self.body.len()
            ))
        })?;

        let combined_version_byte = u8::from(self.version) | u8::from(self.direction);

        let mut v = Vec::with_capacity(
            Version::BYTE_LENGTH
                + Flags::BYTE_LENGTH
                + STREAM_LEN
                + Opcode::BYTE_LENGTH
                + LENGTH_LEN
                + self.body.len(),
        );

        v.push(combined_version_byte);
        v.push(self.flags.bits());
        v.extend_from_slice(&self.stream.to_be_bytes());
        v.push(u8::from(self.opcode));
        v.extend_from_slice(&body_len.to_be_bytes());
        v.extend_from_slice(&self.body);

        Ok(v)
    }
}

#[derive(Debug, PartialEq, Copy, Clone, Ord, PartialOrd, Eq, Hash, Display, Default)]
pub enum Version {
    V3,
    #[default]
    V4,
}

impl From<Version> for u8 {
    fn from(value: Version) -> Self {
        match value {
            Version::V3 => 3,
            Version::V4 => 4,
        }
    }
}

impl TryFrom<u8> for Version {
    type Error = error::Error;

    fn try_from(version: u8) -> Result<Self, Self::Error> {
        match version & 0x7F {
            3 => Ok(Version::V3),
            4 => Ok(Version::V4),
            v => Err(error::Error::General(format!(
                "Unknown protocol version: {v}"
            ))),
        }
    }
}

impl Version {
    /// Number of version bytes in accordance to protocol.
    pub const BYTE_LENGTH: usize = 1;
}

#[derive(Debug, PartialEq, Copy, Clone, Ord, PartialOrd, Eq, Hash, Display)]
pub enum Direction {
    Request,
    Response,
}

impl From<Direction> for u8 {
    fn from(value: Direction) -> u8 {
        match value {
            Direction::Request => 0x00,
            Direction::Response => 0x80,
        }
    }
}

impl From<u8> for Direction {
    fn from(value: u8) -> Self {
        match value & 0x80 {
            0 => Direction::Request,
            _ => Direction::Response,
        }
    }
}

bitflags! {
    /// Envelope header flags.
    #[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
    pub struct Flags: u8 {
        const COMPRESSION = 0x01;
        const TRACING = 0x02;
        const CUSTOM_PAYLOAD = 0x04;
        const WARNING = 0x08;
    }
}

impl Default for Flags {
    #[inline]
    fn default() -> Self {
        Flags::empty()
    }
}

impl Flags {
    /// Number of flag bytes in accordance to protocol.
    pub const BYTE_LENGTH: usize = 1;
}

#[derive(Debug, PartialEq, Copy, Clone, Ord, PartialOrd, Eq, Hash, Display)]
pub enum Opcode {
    Error,
    Startup,
    Ready,
    Query,
    Result,
    Prepare,
    Execute,
    Event,
}

impl Opcode {
    /// Number of opcode bytes in accordance to protocol.
    pub const BYTE_LENGTH: usize = 1;
}

impl From<Opcode> for u8 {
    fn from(value: Opcode) -> Self {
        match value {
            Opcode::Error => 0x00,
            Opcode::Startup => 0x01,
            Opcode::Ready => 0x02,
            Opcode::Query => 0x07,
            Opcode::Result => 0x08,
            Opcode::Prepare => 0x09,
            Opcode::Execute => 0x0A,
            Opcode::Event => 0x0C,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = error::Error;

    fn try_from(value: u8) -> Result<Self, error::Error> {
        match value {
            0x00 => Ok(Opcode::Error),
            0x01 => Ok(Opcode::Startup),
            0x02 => Ok(Opcode::Ready),
            0x07 => Ok(Opcode::Query),
            0x08 => Ok(Opcode::Result),
            0x09 => Ok(Opcode::Prepare),
            0x0A => Ok(Opcode::Execute),
            0x0C => Ok(Opcode::Event),
            opcode => Err(error::Error::General(format!("Unknown opcode: {opcode}"))),
        }
    }
}
