use crate::navigation::cursor::Cursor;
use crate::navigation::partition::{partition, Partition};
use crate::navigation::viewport::Viewport;
use crate::prelude::{Direction, GeoPoint, NavResult, NavigatorConfig};
use crate::records::raw::parse_date;
use crate::records::{VisitSequence, VisitSource};
use crate::telemetry::log::LogManager;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// "Point K of N" readout, K counted from one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionReadout {
    pub position: usize,
    pub total: usize,
}

impl fmt::Display for PositionReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point {} of {}", self.position, self.total)
    }
}

/// Navigation state for one (agent, date) selection, owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailState {
    sequence: VisitSequence,
    cursor: Cursor,
    viewport: Viewport,
}

impl TrailState {
    fn start(sequence: VisitSequence, zoom: f64, revision: u64) -> Self {
        let viewport = Viewport::new(sequence.centroid(), zoom, revision);
        let cursor = Cursor::at_start(&sequence);
        Self {
            sequence,
            cursor,
            viewport,
        }
    }

    pub fn sequence(&self) -> &VisitSequence {
        &self.sequence
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Moves the cursor. The viewport is never touched.
    pub fn step(&mut self, direction: Direction) -> bool {
        self.cursor.step(direction)
    }

    pub fn partition(&self) -> Partition<'_> {
        partition(&self.sequence, &self.cursor)
    }

    /// Records a user pan/zoom. The cursor is never touched.
    pub fn apply_viewport_interaction(&mut self, center: GeoPoint, zoom: f64) -> NavResult<()> {
        self.viewport.apply_interaction(center, zoom)
    }

    pub fn readout(&self) -> PositionReadout {
        PositionReadout {
            position: self.cursor.index() + 1,
            total: self.sequence.len(),
        }
    }
}

/// Result of selecting an (agent, date) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// No visits matched; nothing should be plotted.
    Empty { agent: String, date: String },
    Active(TrailState),
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty { .. })
    }

    pub fn active(&self) -> Option<&TrailState> {
        match self {
            Selection::Active(state) => Some(state),
            Selection::Empty { .. } => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut TrailState> {
        match self {
            Selection::Active(state) => Some(state),
            Selection::Empty { .. } => None,
        }
    }
}

/// Builds fresh navigation state for each selection.
pub struct VisitNavigator {
    config: NavigatorConfig,
    revision: u64,
    logger: LogManager,
}

impl VisitNavigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self {
            config,
            revision: 0,
            logger: LogManager::new(),
        }
    }

    /// Selects by date text. Text that is not a date matches no visits.
    pub fn select<S>(&mut self, source: &S, agent: &str, date: &str) -> Selection
    where
        S: VisitSource + ?Sized,
    {
        match parse_date(date) {
            Ok(day) => self.select_date(source, agent, day),
            Err(err) => {
                self.logger
                    .trace(&format!("Selection {}/{} unparseable: {}", agent, date, err));
                Selection::Empty {
                    agent: agent.to_string(),
                    date: date.to_string(),
                }
            }
        }
    }

    /// Filters and sorts the pair's visits. Every call resets cursor and
    /// viewport, including re-selecting the current pair.
    pub fn select_date<S>(&mut self, source: &S, agent: &str, date: NaiveDate) -> Selection
    where
        S: VisitSource + ?Sized,
    {
        match VisitSequence::new(source.visits_for(agent, date)) {
            Some(sequence) => {
                self.revision += 1;
                self.logger.record(&format!(
                    "Selected {} on {}: {} visits (viewport revision {})",
                    agent,
                    date,
                    sequence.len(),
                    self.revision
                ));
                Selection::Active(TrailState::start(
                    sequence,
                    self.config.default_zoom,
                    self.revision,
                ))
            }
            None => {
                self.logger
                    .record(&format!("Selected {} on {}: no visits", agent, date));
                Selection::Empty {
                    agent: agent.to_string(),
                    date: date.format("%Y-%m-%d").to_string(),
                }
            }
        }
    }
}

impl Default for VisitNavigator {
    fn default() -> Self {
        Self::new(NavigatorConfig::default())
    }
}
