use serde::Serialize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use super::containers::{LatencyClass, Packet, StreamId, StreamState};
use super::correlator::{Correlator, LatencySummary};
use super::framer::FrameError;
use super::mux::{StreamEvent, StreamPair};
use super::patterns::PatternKind;
use super::scan;
use super::source::ByteSource;
use super::utils::Clock;
use crate::ui::output;

/// An aggregate record is written after this many traced camera packets.
pub const SUMMARY_INTERVAL: u64 = 100;

/// Pause between polls while both lines are silent.
const IDLE_WAIT: Duration = Duration::from_millis(1);

/// Statistics of one capture session.
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub master: StreamState,
    pub slave: StreamState,
    pub ack: LatencySummary,
    pub completion: LatencySummary,
}

/// Owns both streams and the correlation state, and writes records to `out`.
pub struct Sniffer<S, C, W> {
    streams: StreamPair<S>,
    correlator: Correlator,
    clock: C,
    out: W,
    traced_replies: u64,
}

impl<S, C, W> Sniffer<S, C, W>
where
    S: ByteSource,
    C: Clock,
    W: Write,
{
    pub fn new(streams: StreamPair<S>, clock: C, out: W) -> Self {
        Self {
            streams,
            correlator: Correlator::default(),
            clock,
            out,
            traced_replies: 0,
        }
    }

    /// Traces both lines until `shutdown` is raised or a line fails.
    pub fn run(&mut self, shutdown: &AtomicBool) -> io::Result<()> {
        log::info!("Starting capture.");
        while !shutdown.load(Ordering::SeqCst) {
            if !self.poll_once()? {
                thread::sleep(IDLE_WAIT);
            }
        }
        log::info!("Shutdown requested, stopping capture.");
        Ok(())
    }

    /// One multiplexing cycle. Returns whether any line had data.
    pub fn poll_once(&mut self) -> io::Result<bool> {
        let events = self.streams.poll(&self.clock)?;
        let active = !events.is_empty();
        for event in events {
            self.dispatch(event)?;
        }
        Ok(active)
    }

    fn dispatch(&mut self, event: StreamEvent) -> io::Result<()> {
        match event.result {
            Ok(packet) => self.trace(packet),
            Err(FrameError::Io(err)) => Err(err),
            Err(err) if err.is_noise() => Ok(()),
            Err(err) => match err.capture() {
                Some(capture) => {
                    writeln!(self.out, "{}", output::diagnostic_line(event.stream, capture))
                }
                None => Ok(()),
            },
        }
    }

    fn trace(&mut self, packet: Packet) -> io::Result<()> {
        let pattern = scan::classify(&packet.bytes);
        self.streams.state_mut(packet.source).record_classification(pattern);

        let timing = match packet.source {
            StreamId::Master => {
                if pattern.map(|p| p.kind()) == Some(PatternKind::Command) {
                    if let Err(err) = self.correlator.on_command(&packet) {
                        log::warn!("{}: {err}", packet.source);
                    }
                }
                None
            }
            StreamId::Slave => {
                if !self.correlator.awaiting_reply() {
                    log::debug!("{}: no command pending, reply not timed", packet.source);
                }
                self.correlator.on_reply(&packet)
            }
        };

        writeln!(self.out, "{}", output::trace_line(&packet, timing.as_ref(), pattern))?;

        if packet.source == StreamId::Slave {
            self.traced_replies += 1;
            if self.traced_replies % SUMMARY_INTERVAL == 0 {
                writeln!(self.out, "{}", output::aggregate_line(&self.summary()))?;
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn awaiting_reply(&self) -> bool {
        self.correlator.awaiting_reply()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            master: self.streams.state(StreamId::Master).clone(),
            slave: self.streams.state(StreamId::Slave).clone(),
            ack: self.correlator.summary(LatencyClass::Ack),
            completion: self.correlator.summary(LatencyClass::Completion),
        }
    }
}
