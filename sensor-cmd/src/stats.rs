//! Summary statistics of the primary dataset.

use crate::config::DashboardConfig;
use sensor_core::reading::{AnomalyDataset, Dataset, Metric};
use sensor_data::annotate::annotate;
use sensor_data::stats::{has_outlier, summarize, OUTLIER_THRESHOLD};
use sensor_source::cache::DatasetCache;
use std::fmt::Write;

/// The statistics report as printed by `stats`.
pub fn stats_report(dataset: &Dataset, anomalies: Option<&AnomalyDataset>) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "{}: {} rows", dataset.source_name, dataset.len())?;
    for summary in summarize(&dataset.readings) {
        writeln!(out, "{}", summary)?;
    }
    let outliers = has_outlier(dataset, Metric::Temperature, OUTLIER_THRESHOLD);
    writeln!(
        out,
        "Has outliers (|{}| > {}): {}",
        Metric::Temperature.scaled_column(),
        OUTLIER_THRESHOLD,
        outliers
    )?;
    if let Some(anomalies) = anomalies {
        let annotated = annotate(dataset, anomalies)?;
        writeln!(out, "Anomalies: {}", annotated.overall_ratio())?;
    }
    Ok(out)
}

pub fn run_stats(config: &DashboardConfig) -> anyhow::Result<()> {
    let cache = DatasetCache::new();
    let sources = config.data_sources()?;
    let dataset = cache.primary(&sources.primary, &sources.options)?;
    let anomalies = match &sources.anomalies {
        Some(source) => cache.anomalies_or_none(source, &sources.options).0,
        None => None,
    };
    print!("{}", stats_report(&dataset, anomalies.as_deref())?);
    Ok(())
}
