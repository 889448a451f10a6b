//! Rendering of trace records and session results.
pub mod output;
