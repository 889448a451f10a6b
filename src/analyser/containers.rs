use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;

use super::patterns::PatternId;
use super::MAX_SIZE;

/// Wall-clock instant of a received byte.
pub type Timestamp = DateTime<Local>;

/// Which side of the bus a packet was captured on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamId {
    /// The controller issuing commands.
    Master,
    /// The camera answering them.
    Slave,
}

impl StreamId {
    /// 3-character label used in every record.
    pub fn label(self) -> &'static str {
        match self {
            StreamId::Master => "CTL",
            StreamId::Slave => "CAM",
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Reply type carried in the high nibble of byte 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyClass {
    Address,
    Ack,
    Completion,
    Error,
    NotApplicable,
}

impl ReplyClass {
    /// Maps `byte & 0xF0`. The clear reply shares code 0x40 with Ack and is
    /// reported as Ack.
    pub fn from_type_byte(byte: u8) -> Self {
        match byte & 0xF0 {
            0x30 => ReplyClass::Address,
            0x40 => ReplyClass::Ack,
            0x50 => ReplyClass::Completion,
            0x60 => ReplyClass::Error,
            _ => ReplyClass::NotApplicable,
        }
    }
}

/// A terminator-delimited packet captured from one stream.
#[derive(Clone, Debug)]
pub struct Packet {
    pub bytes: Vec<u8>,
    pub source: StreamId,
    /// Time the header byte was accepted.
    pub received_at: Timestamp,
    pub reply_class: ReplyClass,
}

impl Packet {
    pub fn new(bytes: Vec<u8>, source: StreamId, received_at: Timestamp) -> Self {
        debug_assert!(bytes.len() <= MAX_SIZE);
        let reply_class = bytes
            .get(1)
            .map(|b| ReplyClass::from_type_byte(*b))
            .unwrap_or(ReplyClass::NotApplicable);

        Self {
            bytes,
            source,
            received_at,
            reply_class,
        }
    }
}

/// Running counters for one observed interface.
#[derive(Clone, Debug, Default, Serialize)]
pub struct StreamState {
    /// Successfully framed packets.
    pub valid: u64,
    /// Framed packets matching no known signature.
    pub unknown: u64,
    /// Framing errors seen after the first valid packet.
    pub errors: u64,
}

impl StreamState {
    pub fn record_valid(&mut self) {
        self.valid += 1;
    }

    /// Noise before the link carries real traffic is not counted.
    pub fn record_error(&mut self) {
        if self.valid > 0 {
            self.errors += 1;
        }
    }

    pub fn record_classification(&mut self, pattern: Option<PatternId>) {
        if pattern.is_none() {
            self.unknown += 1;
        }
    }
}

/// The two reply phases with their own latency statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LatencyClass {
    Ack,
    Completion,
}

impl LatencyClass {
    pub fn tag(self) -> char {
        match self {
            LatencyClass::Ack => 'A',
            LatencyClass::Completion => 'D',
        }
    }
}

/// Timing attached to a traced slave packet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub elapsed_ms: i64,
    /// Running mean of `class` after this sample was offered.
    pub mean_ms: f64,
    pub class: LatencyClass,
}
