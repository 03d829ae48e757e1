//! Visit navigation core for the field visit trail dashboard.
//!
//! The modules model an agent's day as an ordered sequence of geotagged
//! visits, a saturating cursor over that sequence, and a map viewport that
//! only changes on selection or explicit user interaction.

pub mod math;
pub mod navigation;
pub mod prelude;
pub mod records;
pub mod render;
pub mod telemetry;

pub use navigation::{Selection, TrailState, VisitNavigator};
pub use prelude::{Direction, GeoPoint, NavResult, NavigatorError};
pub use records::{Dataset, VisitRecord, VisitSequence, VisitSource};
