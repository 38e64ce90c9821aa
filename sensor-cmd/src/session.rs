//! Interactive session: one command per input line, one render pass each.

use crate::config::parse_metric_list;
use anyhow::Context;
use log::{info, warn};
use sensor_source::cache::DatasetCache;
use sensor_view::session::{handle, DataSources, Interaction, RenderPass, SessionState};
use std::io::{BufRead, Write};
use std::path::Path;

const HELP: &str = "\
commands:
  prev | next                     move the window by one step
  step <15|30|60>                 set the step in minutes
  window <start> | <end>          fill in the manual window fields
  go                              apply the manual window fields
  scaled <metric,...|->           metrics for the scaled chart
  raw <metric|none>               metric for the raw chart
  highlight <on|off>              resistance anomaly highlighting
  show                            print the last render pass as JSON
  export                          write the flagged rows of the window
  reload                          re-read the data files
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Apply(Interaction),
    Show,
    Export,
    Reload,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let command = match word {
        "prev" => SessionCommand::Apply(Interaction::Retreat),
        "next" => SessionCommand::Apply(Interaction::Advance),
        "step" => SessionCommand::Apply(Interaction::SetStep(rest.parse()?)),
        "window" => {
            let (start, end) = rest
                .split_once('|')
                .ok_or_else(|| "usage: window <start> | <end>".to_string())?;
            SessionCommand::Apply(Interaction::SetManualText {
                start: start.trim().to_string(),
                end: end.trim().to_string(),
            })
        }
        "go" => SessionCommand::Apply(Interaction::Submit),
        "scaled" => SessionCommand::Apply(Interaction::SelectScaled(parse_metric_list(rest)?)),
        "raw" => SessionCommand::Apply(Interaction::SelectRaw(rest.parse()?)),
        "highlight" => match rest {
            "on" => SessionCommand::Apply(Interaction::ToggleAnomalies(true)),
            "off" => SessionCommand::Apply(Interaction::ToggleAnomalies(false)),
            _ => return Err("usage: highlight <on|off>".to_string()),
        },
        "show" => SessionCommand::Show,
        "export" => SessionCommand::Export,
        "reload" => SessionCommand::Reload,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(Some(command))
}

/// Short text shown after each pass.
pub fn describe(state: &SessionState, pass: &RenderPass) -> String {
    let mut lines = vec![format!(
        "window {} (step {}m): {} of {} rows",
        pass.window, pass.step_minutes, pass.rows_in_window, pass.rows_total
    )];
    if let Some(chart) = &pass.scaled_chart {
        let names: Vec<&str> = chart.traces.iter().map(|t| t.name.as_str()).collect();
        lines.push(format!("{}: {}", chart.title, names.join(", ")));
    }
    if let Some(chart) = &pass.raw_chart {
        let names: Vec<&str> = chart.traces.iter().map(|t| t.name.as_str()).collect();
        lines.push(format!("{}: {}", chart.title, names.join(", ")));
    }
    if !state.selection.any_chart_active() {
        lines.push("no chart selected".to_string());
    }
    lines.extend(pass.notices.iter().map(ToString::to_string));
    if pass.export_visible {
        lines.push("export available".to_string());
    }
    lines.join("\n")
}

/// Drive a session from `input` until `quit` or end of input. Datasets are
/// read through `cache`, so anything the caller already loaded is reused.
pub fn run_session<R, W>(
    input: R,
    out: &mut W,
    state: SessionState,
    cache: &DatasetCache,
    sources: &DataSources,
    export_dir: &Path,
) -> anyhow::Result<SessionState>
where
    R: BufRead,
    W: Write,
{
    let (mut state, pass) = handle(state, Interaction::Refresh, cache, sources);
    let mut last = report(out, &state, pass)?;

    for line in input.lines() {
        let line = line?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };
        match command {
            SessionCommand::Apply(interaction) => {
                let (next, pass) = handle(state, interaction, cache, sources);
                state = next;
                if let Some(pass) = report(out, &state, pass)? {
                    last = Some(pass);
                }
            }
            SessionCommand::Show => match &last {
                Some(pass) => writeln!(out, "{}", serde_json::to_string_pretty(pass)?)?,
                None => writeln!(out, "nothing rendered yet")?,
            },
            SessionCommand::Export => {
                let file = last.as_ref().and_then(|pass| pass.export.as_ref());
                match file {
                    Some(file) => {
                        let target = export_dir.join(&file.file_name);
                        std::fs::write(&target, &file.bytes)
                            .with_context(|| format!("Failed to write {}", target.display()))?;
                        info!("session: exported {} bytes to {}", file.bytes.len(), target.display());
                        writeln!(out, "wrote {}", target.display())?;
                    }
                    None => writeln!(
                        out,
                        "export unavailable: select a chart and turn highlight on"
                    )?,
                }
            }
            SessionCommand::Reload => {
                cache.invalidate(&sources.primary.key());
                if let Some(anomalies) = &sources.anomalies {
                    cache.invalidate(&anomalies.key());
                }
                let (next, pass) = handle(state, Interaction::Refresh, cache, sources);
                state = next;
                if let Some(pass) = report(out, &state, pass)? {
                    last = Some(pass);
                }
            }
            SessionCommand::Help => writeln!(out, "{}", HELP)?,
            SessionCommand::Quit => break,
        }
    }
    Ok(state)
}

fn report<W: Write>(
    out: &mut W,
    state: &SessionState,
    pass: Result<RenderPass, sensor_core::error::DashboardError>,
) -> anyhow::Result<Option<RenderPass>> {
    match pass {
        Ok(pass) => {
            writeln!(out, "{}", describe(state, &pass))?;
            Ok(Some(pass))
        }
        Err(e) => {
            warn!("session: pass aborted: {}", e);
            writeln!(out, "[error] {}", e)?;
            Ok(None)
        }
    }
}
