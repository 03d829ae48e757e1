use iced::{
    widget::{button, column, container, pick_list, row, text, Canvas, Container},
    Alignment, Element, Length, Task, Theme,
};
use map::TrailMap;
use visitcore::prelude::{Direction, GeoPoint};
use visitcore::render::DashboardView;

mod client;
mod map;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Visit Trail".into()
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Light
}

#[derive(Debug)]
struct Visualizer {
    session: Option<u64>,
    agents: Vec<String>,
    dates: Vec<String>,
    agent: Option<String>,
    date: Option<String>,
    view: Option<DashboardView>,
    status: String,
}

#[derive(Debug, Clone)]
pub enum Message {
    SessionOpened(Result<u64, String>),
    AgentsLoaded(Result<Vec<String>, String>),
    AgentSelected(String),
    DatesLoaded(String, Result<Vec<String>, String>),
    DateSelected(String),
    ViewLoaded(Result<DashboardView, String>),
    Step(Direction),
    ViewportChanged(GeoPoint, f64),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                session: None,
                agents: Vec::new(),
                dates: Vec::new(),
                agent: None,
                date: None,
                view: None,
                status: "Connecting to bridge...".into(),
            },
            Task::batch([
                Task::perform(client::open_session(), Message::SessionOpened),
                Task::perform(client::fetch_agents(), Message::AgentsLoaded),
            ]),
        )
    }

    fn select_task(&self) -> Task<Message> {
        match (self.session, self.agent.clone(), self.date.clone()) {
            (Some(session), Some(agent), Some(date)) => Task::perform(
                client::select(session, agent, date),
                Message::ViewLoaded,
            ),
            _ => Task::none(),
        }
    }

    /// Whether a view from the bridge belongs to the current agent and date.
    fn shows(&self, view: &DashboardView) -> bool {
        let (agent, date) = view_subject(view);
        self.agent.as_deref() == Some(agent) && self.date.as_deref() == Some(date)
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::SessionOpened(Ok(session)) => {
                state.session = Some(session);
                state.status = format!("Session {} ready", session);
                state.select_task()
            }
            Message::AgentsLoaded(Ok(agents)) => {
                state.agents = agents;
                match state.agents.first().cloned() {
                    Some(agent) => Task::done(Message::AgentSelected(agent)),
                    None => {
                        state.status = "Bridge has no agents".into();
                        Task::none()
                    }
                }
            }
            Message::AgentSelected(agent) => {
                state.agent = Some(agent.clone());
                state.date = None;
                state.dates.clear();
                Task::perform(client::fetch_dates(agent.clone()), move |dates| {
                    Message::DatesLoaded(agent, dates)
                })
            }
            Message::DatesLoaded(agent, _) if state.agent.as_deref() != Some(agent.as_str()) => {
                log::debug!("dropping stale dates for {}", agent);
                Task::none()
            }
            Message::DatesLoaded(_, Ok(dates)) => {
                state.dates = dates;
                match state.dates.first().cloned() {
                    Some(date) => Task::done(Message::DateSelected(date)),
                    None => {
                        state.view = None;
                        Task::none()
                    }
                }
            }
            Message::DateSelected(date) => {
                state.date = Some(date);
                state.select_task()
            }
            Message::ViewLoaded(Ok(view)) if !state.shows(&view) => {
                let (agent, date) = view_subject(&view);
                log::debug!("dropping stale view for {} on {}", agent, date);
                Task::none()
            }
            Message::ViewLoaded(Ok(view)) => {
                state.status = match &view {
                    DashboardView::Trail(plan) => format!("{} on {}", plan.agent, plan.date),
                    DashboardView::Empty { message, .. } => message.clone(),
                };
                state.view = Some(view);
                Task::none()
            }
            Message::Step(direction) => match state.session {
                Some(session) => {
                    Task::perform(client::step(session, direction), Message::ViewLoaded)
                }
                None => Task::none(),
            },
            Message::ViewportChanged(center, zoom) => match state.session {
                Some(session) => Task::perform(
                    client::report_viewport(session, center, zoom),
                    Message::ViewLoaded,
                ),
                None => Task::none(),
            },
            Message::SessionOpened(Err(err))
            | Message::AgentsLoaded(Err(err))
            | Message::DatesLoaded(_, Err(err))
            | Message::ViewLoaded(Err(err)) => {
                log::warn!("bridge error: {}", err);
                state.status = format!("Bridge error: {err}");
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let plan = state.view.as_ref().and_then(DashboardView::plan);
        let (at_first, at_last) = plan
            .map(|plan| {
                (
                    plan.readout.position <= 1,
                    plan.readout.position >= plan.readout.total,
                )
            })
            .unwrap_or((true, true));

        let selectors = row![
            text("Agent").size(16),
            pick_list(
                state.agents.clone(),
                state.agent.clone(),
                Message::AgentSelected
            )
            .width(Length::Fixed(220.0)),
            text("Date").size(16),
            pick_list(state.dates.clone(), state.date.clone(), Message::DateSelected)
                .width(Length::Fixed(160.0)),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let readout = plan
            .map(|plan| plan.readout.to_string())
            .unwrap_or_default();
        let controls = row![
            button("Previous")
                .on_press_maybe((!at_first).then_some(Message::Step(Direction::Previous)))
                .padding(8),
            button("Next")
                .on_press_maybe((!at_last).then_some(Message::Step(Direction::Next)))
                .padding(8),
            text(readout).size(18),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let body: Element<'_, Message> = match &state.view {
            Some(DashboardView::Trail(plan)) => Canvas::new(TrailMap::new(plan.clone()))
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            Some(DashboardView::Empty { message, .. }) => container(text(message.clone()).size(18))
                .center(Length::Fill)
                .into(),
            None => container(text("Select an agent and a date").size(16))
                .center(Length::Fill)
                .into(),
        };

        let layout = column![
            text("Field Visit Trail").size(26),
            selectors,
            controls,
            body,
            text(&state.status).size(13),
        ]
        .spacing(12)
        .padding(16);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn view_subject(view: &DashboardView) -> (&str, &str) {
    match view {
        DashboardView::Trail(plan) => (&plan.agent, &plan.date),
        DashboardView::Empty { agent, date, .. } => (agent, date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn showing(agent: &str, date: Option<&str>) -> Visualizer {
        Visualizer {
            session: Some(1),
            agents: vec!["A".into(), "B".into()],
            dates: Vec::new(),
            agent: Some(agent.into()),
            date: date.map(String::from),
            view: None,
            status: String::new(),
        }
    }

    fn empty_view(agent: &str, date: &str) -> DashboardView {
        DashboardView::Empty {
            agent: agent.into(),
            date: date.into(),
            message: "No data to display.".into(),
        }
    }

    #[test]
    fn dates_for_previous_agent_are_dropped() {
        let mut state = showing("B", None);
        let _ = Visualizer::update(
            &mut state,
            Message::DatesLoaded("A".into(), Ok(vec!["2024-01-01".into()])),
        );
        assert!(state.dates.is_empty());

        let _ = Visualizer::update(
            &mut state,
            Message::DatesLoaded("B".into(), Ok(vec!["2024-02-02".into()])),
        );
        assert_eq!(state.dates, vec!["2024-02-02".to_string()]);
    }

    #[test]
    fn view_for_previous_selection_is_dropped() {
        let mut state = showing("B", Some("2024-02-02"));
        let _ = Visualizer::update(
            &mut state,
            Message::ViewLoaded(Ok(empty_view("A", "2024-01-01"))),
        );
        assert!(state.view.is_none());

        let _ = Visualizer::update(
            &mut state,
            Message::ViewLoaded(Ok(empty_view("B", "2024-01-01"))),
        );
        assert!(state.view.is_none());

        let current = empty_view("B", "2024-02-02");
        let _ = Visualizer::update(&mut state, Message::ViewLoaded(Ok(current.clone())));
        assert_eq!(state.view, Some(current));
        assert_eq!(state.status, "No data to display.");
    }
}
