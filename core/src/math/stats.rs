use crate::prelude::GeoPoint;

pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean of latitudes and longitudes.
    pub fn centroid<I>(points: I) -> Option<GeoPoint>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let (count, lat_sum, lon_sum) = points
            .into_iter()
            .fold((0usize, 0.0, 0.0), |(count, lat, lon), point| {
                (count + 1, lat + point.lat, lon + point.lon)
            });
        if count == 0 {
            return None;
        }
        Some(GeoPoint::new(lat_sum / count as f64, lon_sum / count as f64))
    }
}
