use crate::error::{NavigationError, ParseError};
use crate::timestamp::{format_instant, parse_manual};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The selected `[start, end]` range. `start <= end` is expected but not
/// enforced; an inverted window simply selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Slide backward: the old start becomes the end, and the window
    /// shrinks or grows to exactly one step. `None` past the earliest
    /// representable instant.
    pub fn retreat(&self, step: TimeDelta) -> Option<Window> {
        Some(Window {
            start: self.start.checked_sub_signed(step)?,
            end: self.start,
        })
    }

    /// Slide forward: the old end becomes the start, and the window
    /// shrinks or grows to exactly one step. `None` past the latest
    /// representable instant.
    pub fn advance(&self, step: TimeDelta) -> Option<Window> {
        Some(Window {
            start: self.end,
            end: self.end.checked_add_signed(step)?,
        })
    }

    /// Inclusive on both ends.
    pub fn contains(&self, instant: &NaiveDateTime) -> bool {
        self.start <= *instant && *instant <= self.end
    }

    pub fn width(&self) -> TimeDelta {
        self.end - self.start
    }
}

impl Default for Window {
    /// 2025-02-06 02:00:00 .. 2025-02-06 02:50:00
    fn default() -> Self {
        let day = NaiveDate::from_ymd_opt(2025, 2, 6).unwrap_or_default();
        Self {
            start: day.and_hms_opt(2, 0, 0).unwrap_or_default(),
            end: day.and_hms_opt(2, 50, 0).unwrap_or_default(),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {}",
            format_instant(&self.start),
            format_instant(&self.end)
        )
    }
}

/// Navigation step choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum StepSize {
    Minutes15,
    #[default]
    Minutes30,
    Minutes60,
}

impl StepSize {
    pub const ALL: [StepSize; 3] = [StepSize::Minutes15, StepSize::Minutes30, StepSize::Minutes60];

    pub fn minutes(&self) -> u32 {
        match self {
            StepSize::Minutes15 => 15,
            StepSize::Minutes30 => 30,
            StepSize::Minutes60 => 60,
        }
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.minutes()))
    }
}

impl TryFrom<u32> for StepSize {
    type Error = String;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        StepSize::ALL
            .into_iter()
            .find(|step| step.minutes() == minutes)
            .ok_or_else(|| {
                let choices: Vec<String> = StepSize::ALL.iter().map(|s| s.minutes().to_string()).collect();
                format!(
                    "unsupported step of {} minutes, expected one of {}",
                    minutes,
                    choices.join(", ")
                )
            })
    }
}

impl From<StepSize> for u32 {
    fn from(step: StepSize) -> u32 {
        step.minutes()
    }
}

impl FromStr for StepSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let minutes: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("step must be a number of minutes, got '{}'", s))?;
        StepSize::try_from(minutes)
    }
}

/// The window together with its navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowState {
    pub window: Window,
    pub step: StepSize,
}

impl WindowState {
    /// Establish the window the first time; later calls keep whatever is there.
    pub fn initialize(
        slot: &mut Option<WindowState>,
        default_window: Window,
        default_step: StepSize,
    ) -> &mut WindowState {
        slot.get_or_insert_with(|| {
            log::debug!("window: initialized to {} (step {}m)", default_window, default_step.minutes());
            WindowState {
                window: default_window,
                step: default_step,
            }
        })
    }

    /// Move back one step. On overflow the window is left as it was.
    pub fn retreat(&mut self) -> Result<Window, NavigationError> {
        self.window = self
            .window
            .retreat(self.step.duration())
            .ok_or_else(|| self.out_of_range())?;
        Ok(self.window)
    }

    /// Move forward one step. On overflow the window is left as it was.
    pub fn advance(&mut self) -> Result<Window, NavigationError> {
        self.window = self
            .window
            .advance(self.step.duration())
            .ok_or_else(|| self.out_of_range())?;
        Ok(self.window)
    }

    fn out_of_range(&self) -> NavigationError {
        NavigationError {
            window: self.window.to_string(),
            step_minutes: self.step.minutes(),
        }
    }

    /// Replace both bounds from "YYYY-MM-DD HH:MM:SS" strings. Nothing changes
    /// unless both parse.
    pub fn set_manual(&mut self, start: &str, end: &str) -> Result<Window, ParseError> {
        let start = parse_manual(start)?;
        let end = parse_manual(end)?;
        self.window = Window { start, end };
        Ok(self.window)
    }
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            window: Window::default(),
            step: StepSize::default(),
        }
    }
}
