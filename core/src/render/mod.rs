pub mod plan;
pub mod tooltip;
pub mod view;

pub use plan::{DrawMode, Layer, LayerKind, LayerStyle, MarkerLabel, RenderPlan, DEFAULT_MAP_STYLE};
pub use tooltip::hover_text;
pub use view::{DashboardView, EMPTY_MESSAGE};
