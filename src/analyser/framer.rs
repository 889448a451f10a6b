//! Reassembly of terminator-delimited packets from a byte stream.
//!
//! A packet starts with a header byte that has its top bit set and ends with
//! [TERMINATOR]. Anything else read while waiting for a header is line noise.
use std::io;
use thiserror::Error;

use super::containers::{Packet, StreamId, Timestamp};
use super::source::ByteSource;
use super::utils::Clock;
use super::{MAX_SIZE, MIN_SIZE, TERMINATOR};

/// Bytes read before framing gave up.
#[derive(Clone, Debug, PartialEq)]
pub struct Capture {
    pub bytes: Vec<u8>,
    pub started_at: Timestamp,
}

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("bad header 0x{0:02X}")]
    BadHeader(u8),

    #[error("overflow, no terminator within {} bytes", MAX_SIZE)]
    Overflow(Capture),

    #[error("timeout waiting for data")]
    Timeout(Option<Capture>),

    #[error("packet too short ({} bytes)", .0.bytes.len())]
    TooShort(Capture),

    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

impl FrameError {
    pub fn capture(&self) -> Option<&Capture> {
        match self {
            FrameError::Overflow(c) | FrameError::TooShort(c) => Some(c),
            FrameError::Timeout(c) => c.as_ref(),
            FrameError::BadHeader(_) | FrameError::Io(_) => None,
        }
    }

    /// Errors that are counted but never shown as a diagnostic record.
    pub fn is_noise(&self) -> bool {
        matches!(self, FrameError::BadHeader(_) | FrameError::Timeout(_))
    }
}

/// Reads one packet from `source`.
///
/// The timestamp is taken when the header byte is accepted, not when the
/// terminator arrives.
pub fn read_packet<S, C>(source: &mut S, clock: &C, stream: StreamId) -> Result<Packet, FrameError>
where
    S: ByteSource + ?Sized,
    C: Clock + ?Sized,
{
    let header = source.read_byte()?.ok_or(FrameError::Timeout(None))?;
    if header & 0x80 == 0 {
        return Err(FrameError::BadHeader(header));
    }

    let started_at = clock.now();
    let mut bytes = Vec::with_capacity(MAX_SIZE);
    bytes.push(header);

    while bytes.last() != Some(&TERMINATOR) {
        if bytes.len() >= MAX_SIZE {
            return Err(FrameError::Overflow(Capture { bytes, started_at }));
        }
        match source.read_byte()? {
            Some(byte) => bytes.push(byte),
            None => return Err(FrameError::Timeout(Some(Capture { bytes, started_at }))),
        }
    }

    if bytes.len() < MIN_SIZE {
        return Err(FrameError::TooShort(Capture { bytes, started_at }));
    }

    Ok(Packet::new(bytes, stream, started_at))
}
