use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use visitcore::prelude::{Direction, GeoPoint};
use visitcore::render::DashboardView;

const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:9000";

fn bridge_url(path: &str) -> String {
    let base = std::env::var("TRAIL_BRIDGE_URL").unwrap_or_else(|_| DEFAULT_BRIDGE_URL.into());
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[derive(Debug, Deserialize)]
struct SessionCreated {
    session_id: u64,
}

#[derive(Debug, Serialize)]
struct SelectBody<'a> {
    agent: &'a str,
    date: &'a str,
}

#[derive(Debug, Serialize)]
struct StepBody {
    direction: Direction,
}

#[derive(Debug, Serialize)]
struct ViewportBody {
    center: GeoPoint,
    zoom: f64,
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, String> {
    if response.status().is_success() {
        response.json::<T>().await.map_err(|e| e.to_string())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(format!("{}: {}", status, text))
    }
}

async fn get<T: DeserializeOwned>(path: &str, query: &[(&str, &str)]) -> Result<T, String> {
    let response = reqwest::Client::new()
        .get(bridge_url(path))
        .query(query)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    read_json(response).await
}

async fn post<B: Serialize, T: DeserializeOwned>(path: &str, body: &B) -> Result<T, String> {
    let response = reqwest::Client::new()
        .post(bridge_url(path))
        .json(body)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    read_json(response).await
}

pub async fn open_session() -> Result<u64, String> {
    post::<_, SessionCreated>("/sessions", &serde_json::Value::Null)
        .await
        .map(|created| created.session_id)
}

pub async fn fetch_agents() -> Result<Vec<String>, String> {
    get("/agents", &[]).await
}

pub async fn fetch_dates(agent: String) -> Result<Vec<String>, String> {
    get("/dates", &[("agent", agent.as_str())]).await
}

pub async fn select(session: u64, agent: String, date: String) -> Result<DashboardView, String> {
    post(
        &format!("/sessions/{}/select", session),
        &SelectBody {
            agent: &agent,
            date: &date,
        },
    )
    .await
}

pub async fn step(session: u64, direction: Direction) -> Result<DashboardView, String> {
    post(
        &format!("/sessions/{}/step", session),
        &StepBody { direction },
    )
    .await
}

pub async fn report_viewport(
    session: u64,
    center: GeoPoint,
    zoom: f64,
) -> Result<DashboardView, String> {
    post(
        &format!("/sessions/{}/viewport", session),
        &ViewportBody { center, zoom },
    )
    .await
}
