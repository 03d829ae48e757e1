//! Canvas renderer for a trail render plan.
//!
//! The canvas owns the live camera. It adopts the plan's viewport only when
//! the plan carries a revision it has not applied yet, so cursor steps and
//! echoes of its own pan/zoom reports never move the map.

use crate::Message;
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Pixels, Point, Rectangle, Renderer, Theme, Vector,
};
use visitcore::math::WebMercator;
use visitcore::prelude::{GeoPoint, MAX_ZOOM, MIN_ZOOM};
use visitcore::render::{DrawMode, Layer, RenderPlan};

const HOVER_RADIUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: GeoPoint,
    pub zoom: f64,
}

impl Camera {
    fn to_screen(&self, point: GeoPoint, bounds: Rectangle) -> Point {
        let (cx, cy) = WebMercator::project(self.center, self.zoom);
        let (px, py) = WebMercator::project(point, self.zoom);
        Point::new(
            bounds.width / 2.0 + (px - cx) as f32,
            bounds.height / 2.0 + (py - cy) as f32,
        )
    }

    fn panned(&self, delta: Vector) -> Camera {
        let (cx, cy) = WebMercator::project(self.center, self.zoom);
        let center = WebMercator::unproject(cx - delta.x as f64, cy - delta.y as f64, self.zoom);
        Camera {
            center: GeoPoint::new(center.lat, center.lon.clamp(-180.0, 180.0)),
            zoom: self.zoom,
        }
    }
}

#[derive(Debug, Default)]
pub struct MapState {
    applied_revision: Option<u64>,
    camera: Option<Camera>,
    drag_from: Option<Point>,
    dragged: bool,
    hovered: Option<(Point, String)>,
}

impl MapState {
    fn camera(&self, plan: &RenderPlan) -> Camera {
        match (self.applied_revision, self.camera) {
            (Some(revision), Some(camera)) if revision == plan.viewport.revision => camera,
            _ => plan_camera(plan),
        }
    }

    fn sync(&mut self, plan: &RenderPlan) {
        if self.applied_revision != Some(plan.viewport.revision) {
            self.applied_revision = Some(plan.viewport.revision);
            self.camera = Some(plan_camera(plan));
        }
    }
}

fn plan_camera(plan: &RenderPlan) -> Camera {
    Camera {
        center: plan.viewport.center,
        zoom: plan.viewport.zoom,
    }
}

/// Parses `#rrggbb` with an opacity; unknown input falls back to grey.
pub fn parse_color(hex: &str, opacity: f32) -> Color {
    let digits = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|part| u8::from_str_radix(part, 16).ok())
            .map(|value| value as f32 / 255.0)
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) if digits.len() == 6 => Color::from_rgba(r, g, b, opacity),
        _ => Color::from_rgba(0.5, 0.5, 0.5, opacity),
    }
}

pub struct TrailMap {
    plan: RenderPlan,
}

impl TrailMap {
    pub fn new(plan: RenderPlan) -> Self {
        Self { plan }
    }

    fn hover_at(&self, camera: &Camera, bounds: Rectangle, cursor: Point) -> Option<String> {
        self.plan
            .layers
            .iter()
            .rev()
            .filter(|layer| !layer.hover.is_empty())
            .find_map(|layer| {
                layer
                    .points
                    .iter()
                    .zip(&layer.hover)
                    .find(|(point, _)| camera.to_screen(**point, bounds).distance(cursor) <= HOVER_RADIUS)
                    .map(|(_, text)| text.clone())
            })
    }

    fn draw_layer(&self, frame: &mut Frame, layer: &Layer, camera: &Camera, bounds: Rectangle) {
        let color = parse_color(&layer.style.color, layer.style.opacity);
        let screen: Vec<Point> = layer
            .points
            .iter()
            .map(|point| camera.to_screen(*point, bounds))
            .collect();

        match layer.mode {
            DrawMode::Line if screen.len() > 1 => {
                let path = Path::new(|builder| {
                    builder.move_to(screen[0]);
                    for point in &screen[1..] {
                        builder.line_to(*point);
                    }
                });
                frame.stroke(
                    &path,
                    Stroke::default()
                        .with_width(layer.style.size)
                        .with_color(color),
                );
            }
            DrawMode::Line => {}
            DrawMode::Markers => {
                for point in &screen {
                    frame.fill(&Path::circle(*point, layer.style.size / 2.0), color);
                }
            }
        }

        if let (Some(label), Some(anchor)) = (&layer.label, screen.first()) {
            let width = label.text.len() as f32 * label.size * 0.6;
            frame.fill_text(canvas::Text {
                content: label.text.clone(),
                position: Point::new(
                    anchor.x - width / 2.0,
                    anchor.y - layer.style.size - label.size,
                ),
                color: parse_color(&label.color, 1.0),
                size: Pixels(label.size),
                ..canvas::Text::default()
            });
        }
    }
}

impl canvas::Program<Message> for TrailMap {
    type State = MapState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        state.sync(&self.plan);
        let camera = state.camera(&self.plan);

        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                state.drag_from = Some(position);
                state.dragged = false;
                Some(canvas::Action::capture())
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                let position = cursor.position_in(bounds);
                match (state.drag_from, position) {
                    (Some(from), Some(to)) => {
                        state.camera = Some(camera.panned(to - from));
                        state.drag_from = Some(to);
                        state.dragged = true;
                        state.hovered = None;
                        Some(canvas::Action::request_redraw().and_capture())
                    }
                    (None, Some(at)) => {
                        let hovered = self.hover_at(&camera, bounds, at).map(|text| (at, text));
                        let changed = hovered.as_ref().map(|(_, t)| t)
                            != state.hovered.as_ref().map(|(_, t)| t);
                        state.hovered = hovered;
                        changed.then(canvas::Action::request_redraw)
                    }
                    (_, None) => {
                        let had_hover = state.hovered.take().is_some();
                        had_hover.then(canvas::Action::request_redraw)
                    }
                }
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.drag_from.take()?;
                if !std::mem::take(&mut state.dragged) {
                    return Some(canvas::Action::capture());
                }
                let camera = state.camera(&self.plan);
                Some(
                    canvas::Action::publish(Message::ViewportChanged(camera.center, camera.zoom))
                        .and_capture(),
                )
            }
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                cursor.position_in(bounds)?;
                let lines = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => *y as f64,
                    mouse::ScrollDelta::Pixels { y, .. } => *y as f64 / 60.0,
                };
                let zoom = (camera.zoom + lines * 0.5).clamp(MIN_ZOOM, MAX_ZOOM);
                if zoom == camera.zoom {
                    return None;
                }
                let zoomed = Camera {
                    center: camera.center,
                    zoom,
                };
                state.camera = Some(zoomed);
                Some(
                    canvas::Action::publish(Message::ViewportChanged(zoomed.center, zoomed.zoom))
                        .and_capture(),
                )
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.93, 0.92, 0.89),
        );

        let camera = state.camera(&self.plan);
        for layer in &self.plan.layers {
            self.draw_layer(&mut frame, layer, &camera, bounds);
        }

        if let Some((at, text)) = &state.hovered {
            frame.fill_text(canvas::Text {
                content: text.clone(),
                position: Point::new(at.x + 12.0, at.y + 12.0),
                color: Color::BLACK,
                size: Pixels(13.0),
                ..canvas::Text::default()
            });
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.drag_from.is_some() {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visitcore::navigation::{PositionReadout, Viewport};

    #[test]
    fn parse_color_reads_hex() {
        let color = parse_color("#0000ff", 0.4);
        assert_eq!(color, Color::from_rgba(0.0, 0.0, 1.0, 0.4));
        assert_eq!(parse_color("blue", 1.0), Color::from_rgba(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn camera_center_maps_to_bounds_center() {
        let camera = Camera {
            center: GeoPoint::new(-12.0, -77.0),
            zoom: 12.0,
        };
        let bounds = Rectangle::new(Point::ORIGIN, iced::Size::new(400.0, 300.0));
        let point = camera.to_screen(camera.center, bounds);
        assert_eq!(point, Point::new(200.0, 150.0));
    }

    #[test]
    fn panning_moves_center_opposite_to_drag() {
        let camera = Camera {
            center: GeoPoint::new(-12.0, -77.0),
            zoom: 12.0,
        };
        let panned = camera.panned(Vector::new(100.0, 0.0));
        assert!(panned.center.lon < camera.center.lon);
        assert!((panned.center.lat - camera.center.lat).abs() < 1e-9);
    }

    fn plan_at(revision: u64) -> RenderPlan {
        RenderPlan {
            agent: "G01".into(),
            date: "2024-03-05".into(),
            layers: Vec::new(),
            viewport: Viewport {
                center: GeoPoint::new(-12.0, -77.0),
                zoom: 14.0,
                revision,
            },
            map_style: "open-street-map".into(),
            readout: PositionReadout { position: 1, total: 3 },
        }
    }

    #[test]
    fn fresh_state_uses_plan_camera() {
        let plan = plan_at(1);
        let state = MapState::default();
        assert_eq!(state.camera(&plan), plan_camera(&plan));
    }

    #[test]
    fn pan_survives_same_revision() {
        let plan = plan_at(1);
        let mut state = MapState::default();
        state.sync(&plan);
        let panned = state.camera(&plan).panned(Vector::new(50.0, -20.0));
        state.camera = Some(panned);

        state.sync(&plan);
        assert_eq!(state.camera(&plan), panned);
    }

    #[test]
    fn new_revision_resets_to_plan_camera() {
        let mut state = MapState::default();
        state.sync(&plan_at(1));
        let panned = state.camera(&plan_at(1)).panned(Vector::new(50.0, -20.0));
        state.camera = Some(panned);

        let reset = plan_at(2);
        assert_eq!(state.camera(&reset), plan_camera(&reset));
        state.sync(&reset);
        assert_eq!(state.camera(&reset), plan_camera(&reset));
        assert_eq!(state.applied_revision, Some(2));
    }
}
