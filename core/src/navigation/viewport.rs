use crate::prelude::{GeoPoint, NavResult, NavigatorError, MAX_ZOOM, MIN_ZOOM};
use serde::{Deserialize, Serialize};

/// Map camera state.
///
/// `revision` identifies the camera a renderer was last told to adopt.
/// It only changes when a selection resets the viewport, so a renderer
/// that sees the same revision again keeps whatever the user has panned
/// or zoomed to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: f64,
    pub revision: u64,
}

impl Viewport {
    pub fn new(center: GeoPoint, zoom: f64, revision: u64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            revision,
        }
    }

    /// Overwrites center and zoom with values reported by the renderer.
    /// The revision is kept; invalid input leaves the viewport untouched.
    pub fn apply_interaction(&mut self, center: GeoPoint, zoom: f64) -> NavResult<()> {
        if !center.is_finite() || !zoom.is_finite() {
            return Err(NavigatorError::InvalidViewport(format!(
                "non-finite center ({}, {}) or zoom {}",
                center.lat, center.lon, zoom
            )));
        }
        if !(-90.0..=90.0).contains(&center.lat) || !(-180.0..=180.0).contains(&center.lon) {
            return Err(NavigatorError::InvalidViewport(format!(
                "center out of range ({}, {})",
                center.lat, center.lon
            )));
        }
        self.center = center;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_keeps_revision() {
        let mut viewport = Viewport::new(GeoPoint::new(-12.0, -77.0), 12.0, 4);
        viewport
            .apply_interaction(GeoPoint::new(10.0, 20.0), 14.0)
            .unwrap();
        assert_eq!(viewport, Viewport::new(GeoPoint::new(10.0, 20.0), 14.0, 4));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut viewport = Viewport::new(GeoPoint::new(-12.0, -77.0), 40.0, 1);
        assert_eq!(viewport.zoom, MAX_ZOOM);
        viewport
            .apply_interaction(GeoPoint::new(-12.0, -77.0), -3.0)
            .unwrap();
        assert_eq!(viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn invalid_interaction_is_rejected_without_change() {
        let original = Viewport::new(GeoPoint::new(-12.0, -77.0), 12.0, 1);
        let mut viewport = original;
        assert!(viewport
            .apply_interaction(GeoPoint::new(f64::NAN, 0.0), 12.0)
            .is_err());
        assert!(viewport
            .apply_interaction(GeoPoint::new(95.0, 0.0), 12.0)
            .is_err());
        assert!(viewport
            .apply_interaction(GeoPoint::new(1.0, 1.0), f64::INFINITY)
            .is_err());
        assert_eq!(viewport, original);
    }
}
