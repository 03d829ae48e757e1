use serde::{Deserialize, Serialize};
use visitcore::prelude::{Direction, GeoPoint};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentQuery {
    pub agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectRequest {
    pub agent: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRequest {
    pub direction: Direction,
}

/// Camera reported by the renderer after a user pan or zoom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportRequest {
    pub center: GeoPoint,
    pub zoom: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClosed {
    pub session_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
