//! Pairs controller commands with camera replies.
//!
//! VISCA carries no transaction id, so pairing is purely ordinal: at most one
//! command is outstanding, its Ack (if any) comes first and a completion or
//! error reply closes it. All latencies are measured from the command.
use serde::Serialize;
use thiserror::Error;

use super::containers::{LatencyClass, Packet, ReplyClass, Timestamp, Timing};
use super::latency::{elapsed_ms, LatencyAccumulator, Observation};

#[derive(Error, Debug, PartialEq)]
pub enum CorrelationError {
    #[error("command sent while the reply to the command at {pending} is still outstanding")]
    CommandInFlight { pending: Timestamp },
}

#[derive(Debug, Default)]
pub struct Correlator {
    /// Timestamp of the command awaiting a reply.
    pending: Option<Timestamp>,
    ack: LatencyAccumulator,
    completion: LatencyAccumulator,
}

impl Correlator {
    pub fn awaiting_reply(&self) -> bool {
        self.pending.is_some()
    }

    pub fn accumulator(&self, class: LatencyClass) -> &LatencyAccumulator {
        match class {
            LatencyClass::Ack => &self.ack,
            LatencyClass::Completion => &self.completion,
        }
    }

    fn accumulator_mut(&mut self, class: LatencyClass) -> &mut LatencyAccumulator {
        match class {
            LatencyClass::Ack => &mut self.ack,
            LatencyClass::Completion => &mut self.completion,
        }
    }

    /// Starts waiting for the reply to `command`.
    ///
    /// A command arriving while another one is outstanding breaks the
    /// single-command assumption; it is reported and replaces the old one.
    pub fn on_command(&mut self, command: &Packet) -> Result<(), CorrelationError> {
        match self.pending.replace(command.received_at) {
            Some(pending) => Err(CorrelationError::CommandInFlight { pending }),
            None => Ok(()),
        }
    }

    /// Feeds a camera packet, returning its latency if a command was pending.
    pub fn on_reply(&mut self, reply: &Packet) -> Option<Timing> {
        let command_at = self.pending?;

        let class = if reply.reply_class == ReplyClass::Ack {
            LatencyClass::Ack
        } else {
            self.pending = None;
            LatencyClass::Completion
        };

        let elapsed = match elapsed_ms(&command_at, &reply.received_at) {
            Ok(elapsed) => elapsed,
            Err(err) => {
                log::error!("{}: {err}", reply.source);
                return None;
            }
        };

        let accumulator = self.accumulator_mut(class);
        if accumulator.observe(elapsed) == Observation::Outlier {
            log::warn!("{}: skipping outlier of {elapsed} ms", reply.source);
        }

        Some(Timing {
            elapsed_ms: elapsed,
            mean_ms: accumulator.mean(),
            class,
        })
    }

    pub fn summary(&self, class: LatencyClass) -> LatencySummary {
        let accumulator = self.accumulator(class);
        LatencySummary {
            mean_ms: accumulator.mean(),
            samples: accumulator.count(),
            outliers: accumulator.rejected(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LatencySummary {
    pub mean_ms: f64,
    pub samples: u64,
    pub outliers: u64,
}
