use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use visitcore::prelude::{NavigatorConfig, DEFAULT_ZOOM};
use visitcore::records::ClassificationRules;
use visitcore::render::DEFAULT_MAP_STYLE;

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub bind: SocketAddr,
    pub default_zoom: f64,
    pub map_style: String,
    pub dataset: Option<PathBuf>,
    pub classification: ClassificationRules,
    /// Sessions unused for this many seconds are expired.
    pub session_idle_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            default_zoom: DEFAULT_ZOOM,
            map_style: DEFAULT_MAP_STYLE.to_string(),
            dataset: None,
            classification: ClassificationRules::default(),
            session_idle_secs: 3600,
        }
    }
}

impl DashboardConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading dashboard config {}", path_ref.display()))?;
        let config: DashboardConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing dashboard config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn session_idle_limit(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    pub fn to_navigator_config(&self) -> NavigatorConfig {
        NavigatorConfig {
            default_zoom: self.default_zoom,
        }
    }
}
