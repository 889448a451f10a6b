//! Multiplexes the master and slave lines into one ordered event stream.
use std::io;

use super::containers::{Packet, StreamId, StreamState};
use super::framer::{self, FrameError};
use super::source::ByteSource;
use super::utils::Clock;

/// A byte source together with the counters of its stream.
pub struct Interface<S> {
    pub id: StreamId,
    pub source: S,
    pub state: StreamState,
}

impl<S: ByteSource> Interface<S> {
    pub fn new(id: StreamId, source: S) -> Self {
        Self {
            id,
            source,
            state: StreamState::default(),
        }
    }

    /// Frames one packet and updates the counters.
    pub fn frame<C: Clock + ?Sized>(&mut self, clock: &C) -> Result<Packet, FrameError> {
        let result = framer::read_packet(&mut self.source, clock, self.id);
        match &result {
            Ok(packet) => {
                self.state.record_valid();
                log::debug!("{}: {}", self.id, hex::encode_upper(&packet.bytes));
            }
            Err(FrameError::Io(_)) => {}
            Err(err @ FrameError::BadHeader(_)) => {
                self.state.record_error();
                log::debug!("{}: {err}", self.id);
            }
            Err(err) => {
                self.state.record_error();
                log::warn!("{}: {err}", self.id);
            }
        }
        result
    }
}

/// Framing outcome for one stream.
#[derive(Debug)]
pub struct StreamEvent {
    pub stream: StreamId,
    pub result: Result<Packet, FrameError>,
}

pub struct StreamPair<S> {
    pub master: Interface<S>,
    pub slave: Interface<S>,
}

impl<S: ByteSource> StreamPair<S> {
    pub fn new(master: S, slave: S) -> Self {
        Self {
            master: Interface::new(StreamId::Master, master),
            slave: Interface::new(StreamId::Slave, slave),
        }
    }

    pub fn state(&self, stream: StreamId) -> &StreamState {
        match stream {
            StreamId::Master => &self.master.state,
            StreamId::Slave => &self.slave.state,
        }
    }

    pub fn state_mut(&mut self, stream: StreamId) -> &mut StreamState {
        match stream {
            StreamId::Master => &mut self.master.state,
            StreamId::Slave => &mut self.slave.state,
        }
    }

    /// Frames at most one packet per stream, master first.
    ///
    /// An empty result means neither line had data. Failing `has_data` checks
    /// are returned as errors; read failures come back inside the event.
    pub fn poll<C: Clock + ?Sized>(&mut self, clock: &C) -> io::Result<Vec<StreamEvent>> {
        let mut events = Vec::with_capacity(2);
        for interface in [&mut self.master, &mut self.slave] {
            if interface.source.has_data()? {
                events.push(StreamEvent {
                    stream: interface.id,
                    result: interface.frame(clock),
                });
            }
        }
        Ok(events)
    }
}
