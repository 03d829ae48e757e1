use crate::bridge::model::{
    AgentQuery, ErrorBody, SelectRequest, SessionClosed, SessionCreated, StepRequest,
    ViewportRequest,
};
use crate::bridge::session::{SessionError, SessionRegistry};
use crate::workflow::config::DashboardConfig;
use anyhow::Context;
use log::{error, info, warn};
use serde::Serialize;
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{mpsc, Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use visitcore::navigation::Selection;
use visitcore::records::{Dataset, VisitSource};
use visitcore::render::DashboardView;
use visitcore::telemetry::MetricsRecorder;
use warp::{http::StatusCode, reply::Response, Filter, Rejection, Reply};

/// Shared by all routes. Only `sessions` is mutable, one entry per user.
pub struct BridgeState {
    dataset: Dataset,
    config: DashboardConfig,
    sessions: RwLock<SessionRegistry>,
    metrics: MetricsRecorder,
}

impl BridgeState {
    fn view(&self, selection: &Selection) -> DashboardView {
        DashboardView::from_selection(selection, &self.config.map_style)
    }

    fn create_session(&self) -> Result<SessionCreated, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        let session_id = sessions.create();
        info!("Opened session {} ({} active)", session_id, sessions.len());
        Ok(SessionCreated { session_id })
    }

    fn close_session(&self, id: u64) -> Result<SessionClosed, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        sessions.close(id)?;
        info!("Closed session {} ({} active)", id, sessions.len());
        Ok(SessionClosed { session_id: id })
    }

    fn select(&self, id: u64, request: &SelectRequest) -> Result<DashboardView, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        let selection = sessions.select(
            id,
            &self.dataset,
            &request.agent,
            &request.date,
            &self.metrics,
        )?;
        Ok(self.view(selection))
    }

    fn step(&self, id: u64, request: &StepRequest) -> Result<DashboardView, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        let selection = sessions.step(id, request.direction, &self.metrics)?;
        Ok(self.view(selection))
    }

    fn apply_viewport(
        &self,
        id: u64,
        request: &ViewportRequest,
    ) -> Result<DashboardView, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        let selection =
            sessions.apply_viewport(id, request.center, request.zoom, &self.metrics)?;
        Ok(self.view(selection))
    }

    fn current_view(&self, id: u64) -> Result<DashboardView, SessionError> {
        let sessions = self.sessions.read().map_err(|_| SessionError::Unavailable)?;
        let selection = sessions
            .get(id)?
            .selection()
            .ok_or(SessionError::NoSelection(id))?;
        Ok(self.view(selection))
    }
}

fn respond<T: Serialize>(result: Result<T, SessionError>) -> Response {
    match result {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(err) => {
            warn!("bridge request failed: {}", err);
            error_reply(&err.to_string(), err.status())
        }
    }
}

fn error_reply(message: &str, status: StatusCode) -> Response {
    warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            error: message.to_string(),
        }),
        status,
    )
    .into_response()
}

async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    if rejection.is_not_found() {
        return Ok(error_reply("not found", StatusCode::NOT_FOUND));
    }
    if let Some(err) = rejection.find::<warp::body::BodyDeserializeError>() {
        return Ok(error_reply(&err.to_string(), StatusCode::BAD_REQUEST));
    }
    if let Some(err) = rejection.find::<warp::reject::InvalidQuery>() {
        return Ok(error_reply(&err.to_string(), StatusCode::BAD_REQUEST));
    }
    if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(
            "method not allowed",
            StatusCode::METHOD_NOT_ALLOWED,
        ));
    }
    error!("unhandled rejection: {:?}", rejection);
    Ok(error_reply(
        "internal error",
        StatusCode::INTERNAL_SERVER_ERROR,
    ))
}

fn with_state(
    state: Arc<BridgeState>,
) -> impl Filter<Extract = (Arc<BridgeState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// All dashboard routes, with rejections turned into JSON errors.
pub fn routes(
    state: Arc<BridgeState>,
) -> impl Filter<Extract = (Response,), Error = Infallible> + Clone {
    let agents_route = warp::path!("agents")
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(|state: Arc<BridgeState>| warp::reply::json(&state.dataset.agents()).into_response());

    let dates_route = warp::path!("dates")
        .and(warp::get())
        .and(warp::query::<AgentQuery>())
        .and(with_state(state.clone()))
        .map(|query: AgentQuery, state: Arc<BridgeState>| {
            let dates: Vec<String> = state
                .dataset
                .dates_for(&query.agent)
                .iter()
                .map(|date| date.format("%Y-%m-%d").to_string())
                .collect();
            warp::reply::json(&dates).into_response()
        });

    let create_route = warp::path!("sessions")
        .and(warp::post())
        .and(with_state(state.clone()))
        .map(|state: Arc<BridgeState>| respond(state.create_session()));

    let close_route = warp::path!("sessions" / u64)
        .and(warp::delete())
        .and(with_state(state.clone()))
        .map(|id: u64, state: Arc<BridgeState>| respond(state.close_session(id)));

    let select_route = warp::path!("sessions" / u64 / "select")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .map(|id: u64, request: SelectRequest, state: Arc<BridgeState>| {
            respond(state.select(id, &request))
        });

    let step_route = warp::path!("sessions" / u64 / "step")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .map(|id: u64, request: StepRequest, state: Arc<BridgeState>| {
            respond(state.step(id, &request))
        });

    let viewport_route = warp::path!("sessions" / u64 / "viewport")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .map(|id: u64, request: ViewportRequest, state: Arc<BridgeState>| {
            respond(state.apply_viewport(id, &request))
        });

    let view_route = warp::path!("sessions" / u64 / "view")
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(|id: u64, state: Arc<BridgeState>| respond(state.current_view(id)));

    let metrics_route = warp::path!("metrics")
        .and(warp::get())
        .and(with_state(state))
        .map(|state: Arc<BridgeState>| warp::reply::json(&state.metrics.snapshot()).into_response());

    agents_route
        .or(dates_route)
        .unify()
        .or(create_route)
        .unify()
        .or(close_route)
        .unify()
        .or(select_route)
        .unify()
        .or(step_route)
        .unify()
        .or(viewport_route)
        .unify()
        .or(view_route)
        .unify()
        .or(metrics_route)
        .unify()
        .recover(handle_rejection)
        .unify()
}

/// Bridge that hosts the dashboard HTTP endpoint.
pub struct DashboardBridge {
    state: Arc<BridgeState>,
}

impl DashboardBridge {
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Self {
        let sessions = RwLock::new(SessionRegistry::new(
            config.to_navigator_config(),
            config.session_idle_limit(),
        ));
        Self {
            state: Arc::new(BridgeState {
                dataset,
                config,
                sessions,
                metrics: MetricsRecorder::new(),
            }),
        }
    }

    pub fn routes(&self) -> impl Filter<Extract = (Response,), Error = Infallible> + Clone {
        routes(self.state.clone())
    }

    /// Serves on a background thread with its own runtime. Returns once the
    /// listener is bound, with the bound address, or with the bind error.
    pub fn spawn(
        &self,
        address: SocketAddr,
    ) -> anyhow::Result<(SocketAddr, thread::JoinHandle<()>)> {
        let routes = self.routes();
        let (bound_tx, bound_rx) = mpsc::channel::<Result<SocketAddr, String>>();
        let handle = thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    let _ = bound_tx.send(Err(format!("building bridge runtime: {}", err)));
                    return;
                }
            };
            runtime.block_on(async move {
                match warp::serve(routes).try_bind_ephemeral(address) {
                    Ok((bound, server)) => {
                        let _ = bound_tx.send(Ok(bound));
                        server.await;
                    }
                    Err(err) => {
                        let _ = bound_tx.send(Err(err.to_string()));
                    }
                }
            });
        });

        let bound = bound_rx
            .recv()
            .context("bridge thread exited before binding")?
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("binding bridge to {}", address))?;
        Ok((bound, handle))
    }

    pub fn publish_status(&self, message: &str) {
        info!("[bridge] {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::demo::{build_demo_rows, DemoConfig};
    use serde_json::{json, Value};
    use visitcore::records::ClassificationRules;

    fn bridge() -> DashboardBridge {
        let rows = build_demo_rows(&DemoConfig::default()).unwrap();
        let (dataset, _) = Dataset::from_raw(rows, &ClassificationRules::default());
        DashboardBridge::new(dataset, DashboardConfig::default())
    }

    async fn post(
        routes: &(impl Filter<Extract = (Response,), Error = Infallible> + Clone + 'static),
        path: &str,
        body: Value,
    ) -> (StatusCode, Value) {
        let response = warp::test::request()
            .method("POST")
            .path(path)
            .json(&body)
            .reply(routes)
            .await;
        let value = serde_json::from_slice(response.body()).unwrap_or(Value::Null);
        (response.status(), value)
    }

    async fn open_session(
        routes: &(impl Filter<Extract = (Response,), Error = Infallible> + Clone + 'static),
    ) -> u64 {
        let (status, body) = post(routes, "/sessions", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        body["session_id"].as_u64().unwrap()
    }

    #[test]
    fn spawn_reports_occupied_address() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        let err = bridge().spawn(address).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains(&format!("binding bridge to {}", address)));
    }

    #[test]
    fn spawn_returns_bound_address() {
        let (bound, _handle) = bridge()
            .spawn(SocketAddr::from(([127, 0, 0, 1], 0)))
            .unwrap();
        assert_ne!(bound.port(), 0);
        assert!(std::net::TcpStream::connect(bound).is_ok());
    }

    #[tokio::test]
    async fn lists_agents_and_dates() {
        let routes = bridge().routes();
        let response = warp::test::request().path("/agents").reply(&routes).await;
        let agents: Vec<String> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(agents, vec!["GESTOR 01", "GESTOR 02", "GESTOR 03"]);

        let response = warp::test::request()
            .path("/dates?agent=GESTOR%2001")
            .reply(&routes)
            .await;
        let dates: Vec<String> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(dates, vec!["2024-03-04", "2024-03-05"]);
    }

    #[tokio::test]
    async fn select_step_and_pan_flow() {
        let routes = bridge().routes();
        let id = open_session(&routes).await;

        let (status, view) = post(
            &routes,
            &format!("/sessions/{}/select", id),
            json!({"agent": "GESTOR 01", "date": "2024-03-04"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["state"], "trail");
        assert_eq!(view["readout"]["position"], 1);
        let revision = view["viewport"]["revision"].clone();

        let (_, view) = post(
            &routes,
            &format!("/sessions/{}/step", id),
            json!({"direction": "next"}),
        )
        .await;
        assert_eq!(view["readout"]["position"], 2);

        let (status, view) = post(
            &routes,
            &format!("/sessions/{}/viewport", id),
            json!({"center": {"lat": 10.0, "lon": 20.0}, "zoom": 14.0}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["readout"]["position"], 2);
        assert_eq!(view["viewport"]["zoom"], 14.0);
        assert_eq!(view["viewport"]["revision"], revision);

        let (_, view) = post(
            &routes,
            &format!("/sessions/{}/step", id),
            json!({"direction": "previous"}),
        )
        .await;
        assert_eq!(view["viewport"]["center"]["lat"], 10.0);

        let response = warp::test::request()
            .path(&format!("/sessions/{}/view", id))
            .reply(&routes)
            .await;
        let view: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(view["readout"]["position"], 1);

        let response = warp::test::request().path("/metrics").reply(&routes).await;
        let metrics: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(metrics["selections"], 1);
        assert_eq!(metrics["steps"], 2);
        assert_eq!(metrics["viewport_updates"], 1);
    }

    #[tokio::test]
    async fn empty_selection_reports_message() {
        let routes = bridge().routes();
        let id = open_session(&routes).await;
        let (status, view) = post(
            &routes,
            &format!("/sessions/{}/select", id),
            json!({"agent": "X", "date": "2024-01-01"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["state"], "empty");
        assert_eq!(view["message"], "No data to display.");

        let (status, _) = post(
            &routes,
            &format!("/sessions/{}/step", id),
            json!({"direction": "next"}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn deleted_session_is_gone() {
        let routes = bridge().routes();
        let id = open_session(&routes).await;
        let response = warp::test::request()
            .method("DELETE")
            .path(&format!("/sessions/{}", id))
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = warp::test::request()
            .path(&format!("/sessions/{}/view", id))
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let routes = bridge().routes();
        let (status, body) = post(
            &routes,
            "/sessions/42/step",
            json!({"direction": "next"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("42"));

        let id = open_session(&routes).await;
        let (status, _) = post(
            &routes,
            &format!("/sessions/{}/step", id),
            json!({"direction": "sideways"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let response = warp::test::request().path("/nowhere").reply(&routes).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
