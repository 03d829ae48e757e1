pub mod cursor;
pub mod navigator;
pub mod partition;
pub mod viewport;

pub use cursor::Cursor;
pub use navigator::{PositionReadout, Selection, TrailState, VisitNavigator};
pub use partition::{partition, Partition};
pub use viewport::Viewport;
