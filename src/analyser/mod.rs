//! The core of VISCA traffic analysis.
//! Reassemble packets from both lines, name them, and time the camera's replies.
pub mod containers;
pub mod core;
pub mod correlator;
pub mod framer;
pub mod latency;
pub mod mux;
pub mod patterns;
pub mod scan;
pub mod source;
#[cfg(test)]
pub mod testing;
pub mod utils;

/// Last byte of every packet.
pub const TERMINATOR: u8 = 0xFF;
/// Smallest valid packet: header, one byte, terminator.
pub const MIN_SIZE: usize = 3;
pub const MAX_SIZE: usize = 16;

/// Latencies at or above this are left out of the averages.
pub const OUTLIER_THRESHOLD_MS: i64 = 1000;
