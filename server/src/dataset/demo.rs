use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveTime};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use visitcore::records::RawVisit;

const RESULTS: [&str; 5] = [
    "PAGO",
    "PROMESA DE PAGO",
    "NO CONTESTA",
    "CLIENTE AUSENTE",
    "SE DEJO MENSAJE",
];
const ACTIONS: [&str; 4] = [
    "VISITA A CASA",
    "VISITA REFERENCIA",
    "LLAMADA",
    "MENSAJE",
];

/// Configuration for a synthetic visit dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub agents: usize,
    pub days: usize,
    pub visits_per_day: usize,
    pub seed: u64,
    pub start_date: NaiveDate,
    pub base_lat: f64,
    pub base_lon: f64,
    /// Maximum offset from the base coordinate, in degrees.
    pub spread: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            agents: 3,
            days: 2,
            visits_per_day: 8,
            seed: 0,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap_or(NaiveDate::MIN),
            base_lat: -12.0464,
            base_lon: -77.0428,
            spread: 0.05,
        }
    }
}

/// Builds one row per visit, agents named `GESTOR 01`, `GESTOR 02`, ...
pub fn build_demo_rows(config: &DemoConfig) -> anyhow::Result<Vec<RawVisit>> {
    let total = config
        .agents
        .checked_mul(config.days)
        .and_then(|n| n.checked_mul(config.visits_per_day))
        .context("overflow computing demo visit count")?;
    let spread = config.spread.abs().max(1e-4);
    let start_of_day = NaiveTime::from_hms_opt(8, 0, 0).context("building start of day")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut rows = Vec::with_capacity(total);

    for agent_index in 0..config.agents {
        let agent = format!("GESTOR {:02}", agent_index + 1);
        for day in 0..config.days {
            let date = config.start_date + Duration::days(day as i64);
            let mut time = start_of_day;
            let mut lat = config.base_lat + rng.gen_range(-spread..spread);
            let mut lon = config.base_lon + rng.gen_range(-spread..spread);
            for visit in 0..config.visits_per_day {
                time += Duration::minutes(rng.gen_range(10..50));
                lat = (lat + rng.gen_range(-spread..spread) / 4.0)
                    .clamp(config.base_lat - spread, config.base_lat + spread);
                lon = (lon + rng.gen_range(-spread..spread) / 4.0)
                    .clamp(config.base_lon - spread, config.base_lon + spread);
                rows.push(RawVisit {
                    agent: agent.clone(),
                    client: format!("CL-{:02}{:02}{:03}", agent_index + 1, day + 1, visit + 1),
                    date: date.format("%Y-%m-%d").to_string(),
                    time: time.format("%H:%M:%S").to_string(),
                    latitude: lat,
                    longitude: lon,
                    result: RESULTS.choose(&mut rng).copied().unwrap_or("PAGO").into(),
                    action: ACTIONS.choose(&mut rng).map(|a| a.to_string()),
                });
            }
        }
    }

    // Shuffled so the navigator's time ordering is actually exercised.
    rows.shuffle(&mut rng);
    Ok(rows)
}
