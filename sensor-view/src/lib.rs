//! Presentation logic for the sensor trend viewer.
//!
//! This crate provides:
//! - `selection`: which charts are active, where anomalies are overlaid, and
//!   whether the export control is shown
//! - `hover`: tooltip text for chart points
//! - `chart`: serializable chart descriptions handed to the charting front end
//! - `export`: the flagged-rows CSV download
//! - `session`: explicit session state and the per-interaction render pass

pub mod chart;
pub mod export;
pub mod hover;
pub mod selection;
pub mod session;
