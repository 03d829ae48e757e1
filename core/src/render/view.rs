use crate::navigation::Selection;
use crate::render::plan::RenderPlan;
use serde::{Deserialize, Serialize};

pub const EMPTY_MESSAGE: &str = "No data to display.";

/// What the dashboard shows for a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardView {
    Empty {
        agent: String,
        date: String,
        message: String,
    },
    Trail(RenderPlan),
}

impl DashboardView {
    pub fn from_selection(selection: &Selection, map_style: &str) -> Self {
        match selection {
            Selection::Empty { agent, date } => DashboardView::Empty {
                agent: agent.clone(),
                date: date.clone(),
                message: EMPTY_MESSAGE.to_string(),
            },
            Selection::Active(state) => DashboardView::Trail(RenderPlan::build(state, map_style)),
        }
    }

    pub fn plan(&self) -> Option<&RenderPlan> {
        match self {
            DashboardView::Trail(plan) => Some(plan),
            DashboardView::Empty { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::plan::DEFAULT_MAP_STYLE;

    #[test]
    fn empty_selection_suppresses_plot() {
        let selection = Selection::Empty {
            agent: "X".into(),
            date: "2024-01-01".into(),
        };
        let view = DashboardView::from_selection(&selection, DEFAULT_MAP_STYLE);
        assert!(view.plan().is_none());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["state"], "empty");
        assert_eq!(json["message"], EMPTY_MESSAGE);
    }
}
