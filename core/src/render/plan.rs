//! Draw instructions handed to the map renderer.
//!
//! Layers are listed in paint order. The renderer owns the camera between
//! viewport revisions: redrawing a plan whose `viewport.revision` it has
//! already applied must not move the map.

use crate::navigation::{PositionReadout, TrailState, Viewport};
use crate::prelude::GeoPoint;
use crate::render::tooltip::hover_text;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAP_STYLE: &str = "open-street-map";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    BasePoints,
    BaseRoute,
    VisitedPoints,
    TravelledRoute,
    CurrentPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    Markers,
    Line,
}

/// `size` is the marker diameter for markers and the stroke width for lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub color: String,
    pub size: f32,
    pub opacity: f32,
}

impl LayerStyle {
    fn new(color: &str, size: f32, opacity: f32) -> Self {
        Self {
            color: color.to_string(),
            size,
            opacity,
        }
    }
}

/// Text drawn centered above a marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerLabel {
    pub text: String,
    pub color: String,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub kind: LayerKind,
    pub mode: DrawMode,
    pub points: Vec<GeoPoint>,
    /// One entry per point, or empty when the layer has no hover.
    #[serde(default)]
    pub hover: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<MarkerLabel>,
    pub style: LayerStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub agent: String,
    pub date: String,
    pub layers: Vec<Layer>,
    pub viewport: Viewport,
    pub map_style: String,
    pub readout: PositionReadout,
}

impl RenderPlan {
    pub fn build(state: &TrailState, map_style: &str) -> Self {
        let sequence = state.sequence();
        let split = state.partition();
        let all_points: Vec<GeoPoint> = sequence.locations().collect();
        let index = split.current_index();

        let mut layers = vec![
            Layer {
                kind: LayerKind::BasePoints,
                mode: DrawMode::Markers,
                points: all_points.clone(),
                hover: Vec::new(),
                label: None,
                style: LayerStyle::new("#d3d3d3", 10.0, 0.4),
            },
            Layer {
                kind: LayerKind::BaseRoute,
                mode: DrawMode::Line,
                points: all_points,
                hover: Vec::new(),
                label: None,
                style: LayerStyle::new("#808080", 1.0, 1.0),
            },
        ];

        if !split.visited.is_empty() {
            layers.push(Layer {
                kind: LayerKind::VisitedPoints,
                mode: DrawMode::Markers,
                points: split.visited.iter().map(|r| r.location()).collect(),
                hover: split
                    .visited
                    .iter()
                    .enumerate()
                    .map(|(i, r)| hover_text(r, i))
                    .collect(),
                label: None,
                style: LayerStyle::new("#0000ff", 12.0, 1.0),
            });
            layers.push(Layer {
                kind: LayerKind::TravelledRoute,
                mode: DrawMode::Line,
                points: split.travelled().iter().map(|r| r.location()).collect(),
                hover: Vec::new(),
                label: None,
                style: LayerStyle::new("#0000ff", 2.0, 1.0),
            });
        }

        layers.push(Layer {
            kind: LayerKind::CurrentPoint,
            mode: DrawMode::Markers,
            points: vec![split.current.location()],
            hover: vec![hover_text(split.current, index)],
            label: Some(MarkerLabel {
                text: (index + 1).to_string(),
                color: "#000000".into(),
                size: 14.0,
            }),
            style: LayerStyle::new("#800080", 14.0, 1.0),
        });

        Self {
            agent: sequence.agent_id().to_string(),
            date: sequence.date().format("%Y-%m-%d").to_string(),
            layers,
            viewport: state.viewport(),
            map_style: map_style.to_string(),
            readout: state.readout(),
        }
    }

    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.kind == kind)
    }
}
