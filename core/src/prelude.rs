use serde::{Deserialize, Serialize};

/// Zoom applied to a fresh selection.
pub const DEFAULT_ZOOM: f64 = 12.0;
/// Zoom bounds accepted from user interaction.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Step direction for the visit cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Previous,
    Next,
}

/// Shared configuration for the navigator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigatorConfig {
    pub default_zoom: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            default_zoom: DEFAULT_ZOOM,
        }
    }
}

/// Common error type for record construction and navigator operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NavigatorError {
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),
}

pub type NavResult<T> = Result<T, NavigatorError>;
