//! Spherical Web Mercator with 256 pixel tiles, the projection used by
//! OpenStreetMap raster tiles.

use crate::prelude::GeoPoint;
use std::f64::consts::PI;

pub const TILE_SIZE: f64 = 256.0;
/// Latitude limit where the projection becomes square.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

pub struct WebMercator;

impl WebMercator {
    /// Width and height of the whole world in pixels at `zoom`.
    pub fn world_size(zoom: f64) -> f64 {
        TILE_SIZE * 2f64.powf(zoom)
    }

    /// Projects a coordinate to world pixel space, origin at the north-west corner.
    pub fn project(point: GeoPoint, zoom: f64) -> (f64, f64) {
        let size = Self::world_size(zoom);
        let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (point.lon + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
        (x, y)
    }

    pub fn unproject(x: f64, y: f64, zoom: f64) -> GeoPoint {
        let size = Self::world_size(zoom);
        let lon = x / size * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * y / size);
        let lat = n.sinh().atan().to_degrees();
        GeoPoint::new(lat, lon)
    }
}
