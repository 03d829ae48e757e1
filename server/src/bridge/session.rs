use log::info;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use visitcore::navigation::{Selection, VisitNavigator};
use visitcore::prelude::{Direction, GeoPoint, NavigatorConfig, NavigatorError};
use visitcore::records::VisitSource;
use visitcore::telemetry::MetricsRecorder;
use warp::http::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("unknown session {0}")]
    UnknownSession(u64),
    #[error("session {0} has no visits selected")]
    NoSelection(u64),
    #[error(transparent)]
    Navigator(#[from] NavigatorError),
    #[error("session store unavailable")]
    Unavailable,
}

impl SessionError {
    pub fn status(&self) -> StatusCode {
        match self {
            SessionError::UnknownSession(_) => StatusCode::NOT_FOUND,
            SessionError::NoSelection(_) => StatusCode::CONFLICT,
            SessionError::Navigator(_) => StatusCode::BAD_REQUEST,
            SessionError::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// One dashboard user. Sessions share nothing but the read-only dataset.
pub struct Session {
    navigator: VisitNavigator,
    selection: Option<Selection>,
    last_used: Instant,
}

impl Session {
    fn new(config: NavigatorConfig, now: Instant) -> Self {
        Self {
            navigator: VisitNavigator::new(config),
            selection: None,
            last_used: now,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }
}

/// Sessions unused for longer than `idle_limit` are dropped when the next
/// session is created.
pub struct SessionRegistry {
    config: NavigatorConfig,
    idle_limit: Duration,
    next_id: u64,
    sessions: HashMap<u64, Session>,
}

impl SessionRegistry {
    pub fn new(config: NavigatorConfig, idle_limit: Duration) -> Self {
        Self {
            config,
            idle_limit,
            next_id: 1,
            sessions: HashMap::new(),
        }
    }

    pub fn create(&mut self) -> u64 {
        let now = Instant::now();
        self.prune_idle(now);
        let id = self.next_id;
        self.next_id += 1;
        self.sessions
            .insert(id, Session::new(self.config.clone(), now));
        id
    }

    pub fn close(&mut self, id: u64) -> Result<(), SessionError> {
        self.sessions
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::UnknownSession(id))
    }

    /// Removes sessions idle for longer than the limit; returns how many.
    pub fn prune_idle(&mut self, now: Instant) -> usize {
        let limit = self.idle_limit;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| now.saturating_duration_since(session.last_used) <= limit);
        let pruned = before - self.sessions.len();
        if pruned > 0 {
            info!("Expired {} idle session(s)", pruned);
        }
        pruned
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn get(&self, id: u64) -> Result<&Session, SessionError> {
        self.sessions
            .get(&id)
            .ok_or(SessionError::UnknownSession(id))
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut Session, SessionError> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::UnknownSession(id))?;
        session.last_used = Instant::now();
        Ok(session)
    }

    pub fn select<S>(
        &mut self,
        id: u64,
        source: &S,
        agent: &str,
        date: &str,
        metrics: &MetricsRecorder,
    ) -> Result<&Selection, SessionError>
    where
        S: VisitSource + ?Sized,
    {
        let session = self.get_mut(id)?;
        let selection = session.navigator.select(source, agent, date);
        metrics.record_selection(selection.is_empty());
        Ok(session.selection.insert(selection))
    }

    pub fn step(
        &mut self,
        id: u64,
        direction: Direction,
        metrics: &MetricsRecorder,
    ) -> Result<&Selection, SessionError> {
        let session = self.get_mut(id)?;
        let selection = session
            .selection
            .as_mut()
            .ok_or(SessionError::NoSelection(id))?;
        let state = selection
            .active_mut()
            .ok_or(SessionError::NoSelection(id))?;
        metrics.record_step(state.step(direction));
        Ok(selection)
    }

    pub fn apply_viewport(
        &mut self,
        id: u64,
        center: GeoPoint,
        zoom: f64,
        metrics: &MetricsRecorder,
    ) -> Result<&Selection, SessionError> {
        let session = self.get_mut(id)?;
        let selection = session
            .selection
            .as_mut()
            .ok_or(SessionError::NoSelection(id))?;
        selection
            .active_mut()
            .ok_or(SessionError::NoSelection(id))?
            .apply_viewport_interaction(center, zoom)?;
        metrics.record_viewport_update();
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visitcore::records::{ClassificationRules, Dataset, RawVisit};

    const IDLE: Duration = Duration::from_secs(60);

    fn dataset() -> Dataset {
        let rows = (0..3).map(|i| RawVisit {
            agent: "G01".into(),
            client: format!("C{}", i),
            date: "2024-03-05".into(),
            time: format!("{:02}:00:00", 8 + i),
            latitude: -12.0 - i as f64 * 0.1,
            longitude: -77.0,
            result: "PAGO".into(),
            action: None,
        });
        Dataset::from_raw(rows, &ClassificationRules::default()).0
    }

    #[test]
    fn sessions_are_independent() {
        let data = dataset();
        let metrics = MetricsRecorder::new();
        let mut registry = SessionRegistry::new(NavigatorConfig::default(), IDLE);
        let a = registry.create();
        let b = registry.create();
        registry.select(a, &data, "G01", "2024-03-05", &metrics).unwrap();
        registry.select(b, &data, "G01", "2024-03-05", &metrics).unwrap();
        registry.step(a, Direction::Next, &metrics).unwrap();

        let cursor = |id| {
            registry.get(id).unwrap().selection().unwrap().active().unwrap().cursor().index()
        };
        assert_eq!(cursor(a), 1);
        assert_eq!(cursor(b), 0);
    }

    #[test]
    fn step_without_selection_conflicts() {
        let data = dataset();
        let metrics = MetricsRecorder::new();
        let mut registry = SessionRegistry::new(NavigatorConfig::default(), IDLE);
        let id = registry.create();
        let err = registry.step(id, Direction::Next, &metrics).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        registry.select(id, &data, "X", "2024-01-01", &metrics).unwrap();
        let err = registry
            .apply_viewport(id, GeoPoint::new(1.0, 1.0), 10.0, &metrics)
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_viewport_is_bad_request() {
        let data = dataset();
        let metrics = MetricsRecorder::new();
        let mut registry = SessionRegistry::new(NavigatorConfig::default(), IDLE);
        let id = registry.create();
        registry.select(id, &data, "G01", "2024-03-05", &metrics).unwrap();
        let err = registry
            .apply_viewport(id, GeoPoint::new(f64::NAN, 1.0), 10.0, &metrics)
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            registry.step(99, Direction::Next, &metrics).unwrap_err().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn closed_session_is_unknown() {
        let metrics = MetricsRecorder::new();
        let mut registry = SessionRegistry::new(NavigatorConfig::default(), IDLE);
        let id = registry.create();
        registry.close(id).unwrap();
        assert_eq!(registry.len(), 0);
        assert_eq!(
            registry.step(id, Direction::Next, &metrics).unwrap_err().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(registry.close(id).unwrap_err().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn idle_sessions_expire() {
        let mut registry = SessionRegistry::new(NavigatorConfig::default(), IDLE);
        registry.create();
        registry.create();
        assert_eq!(registry.prune_idle(Instant::now() + Duration::from_secs(30)), 0);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.prune_idle(Instant::now() + Duration::from_secs(120)), 2);
        assert_eq!(registry.len(), 0);
    }
}
