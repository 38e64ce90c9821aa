//! Data processing for sensor readings.
//!
//! This crate turns a loaded dataset into the pieces a render pass needs:
//! the rows inside the current window, their anomaly annotations and the
//! anomaly ratios, plus the column statistics used to sanity-check the
//! standardized channels.

pub mod annotate;
pub mod filter;
pub mod stats;

#[cfg(test)]
pub(crate) mod fixtures;
