pub mod projection;
pub mod stats;

pub use projection::WebMercator;
pub use stats::StatsHelper;
