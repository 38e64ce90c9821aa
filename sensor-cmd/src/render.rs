//! One-shot render and export commands.

use crate::config::{DashboardConfig, Nav};
use anyhow::Context;
use log::info;
use sensor_source::cache::DatasetCache;
use sensor_view::session::{handle, DataSources, Interaction, RenderPass, SessionState};
use std::path::Path;

/// Apply `nav` to `state` and render the resulting window.
///
/// Every step is a full pass, the way a dashboard operator would click
/// through; a pass that fails stops the walk.
pub fn render_pass(
    state: SessionState,
    nav: &[Nav],
    cache: &DatasetCache,
    sources: &DataSources,
) -> anyhow::Result<(SessionState, RenderPass)> {
    let mut state = state;
    for step in nav {
        let interaction = match step {
            Nav::Prev => Interaction::Retreat,
            Nav::Next => Interaction::Advance,
        };
        let (next, pass) = handle(state, interaction, cache, sources);
        pass?;
        state = next;
    }
    let (state, pass) = handle(state, Interaction::Refresh, cache, sources);
    Ok((state, pass?))
}

/// Print (or write) one render pass as JSON.
pub fn run_render(config: &DashboardConfig, nav: &[Nav], output: Option<&Path>) -> anyhow::Result<()> {
    let cache = DatasetCache::new();
    let sources = config.data_sources()?;
    let (_, pass) = render_pass(config.initial_state()?, nav, &cache, &sources)?;
    for notice in &pass.notices {
        info!("{}", notice);
    }
    let json = serde_json::to_string_pretty(&pass)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Render pass written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Write the flagged rows of the window to CSV.
///
/// Highlighting is forced on; the export is refused when no chart is active
/// or the anomaly dataset is unavailable, with the pass notices as the reason.
pub fn run_export(config: &DashboardConfig, nav: &[Nav], output: Option<&Path>) -> anyhow::Result<()> {
    let config = DashboardConfig {
        highlight_anomalies: true,
        ..config.clone()
    };
    let cache = DatasetCache::new();
    let sources = config.data_sources()?;
    let (state, pass) = render_pass(config.initial_state()?, nav, &cache, &sources)?;

    let Some(file) = pass.export else {
        let reasons: Vec<String> = pass.notices.iter().map(ToString::to_string).collect();
        if !state.selection.any_chart_active() {
            anyhow::bail!("Nothing to export: no chart is selected");
        }
        anyhow::bail!("Nothing to export for {}: {}", pass.window, reasons.join("; "));
    };

    let target = output.map_or_else(|| Path::new(&file.file_name).to_path_buf(), Path::to_path_buf);
    std::fs::write(&target, &file.bytes)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    info!(
        "Exported flagged rows of {} to {} ({})",
        pass.window,
        target.display(),
        file.mime
    );
    println!("{}", target.display());
    Ok(())
}
