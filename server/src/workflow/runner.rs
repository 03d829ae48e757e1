use crate::workflow::config::DashboardConfig;
use visitcore::navigation::VisitNavigator;
use visitcore::prelude::Direction;
use visitcore::records::VisitSource;
use visitcore::render::DashboardView;

/// Offline walk through one selection, used by the CLI without the bridge.
pub struct Runner {
    config: DashboardConfig,
}

impl Runner {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    /// Selects the pair and steps forward `steps` times (saturating).
    pub fn execute<S>(&self, source: &S, agent: &str, date: &str, steps: usize) -> DashboardView
    where
        S: VisitSource + ?Sized,
    {
        let mut navigator = VisitNavigator::new(self.config.to_navigator_config());
        let mut selection = navigator.select(source, agent, date);
        if let Some(state) = selection.active_mut() {
            for _ in 0..steps {
                if !state.step(Direction::Next) {
                    break;
                }
            }
        }
        DashboardView::from_selection(&selection, &self.config.map_style)
    }
}
