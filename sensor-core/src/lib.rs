//! Core types for the sensor trend viewer.
//!
//! - `reading`: sensor samples, the loaded dataset and anomaly annotations
//! - `timestamp`: accepted `record Time` formats
//! - `window`: the navigable time window and step sizes
//! - `error`: the error taxonomy shared by every crate in the workspace

pub mod error;
pub mod reading;
pub mod timestamp;
pub mod window;
