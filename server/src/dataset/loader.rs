use anyhow::{bail, Context};
use log::{info, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use visitcore::records::{ClassificationRules, Dataset, LoadReport, RawVisit};

/// Accepted header names per field, matched case-insensitively.
const AGENT: &[&str] = &["GESTOR", "agent"];
const CLIENT: &[&str] = &["ID_CLIENTE", "client"];
const DATE: &[&str] = &["FECHA_GESTION", "date"];
const TIME: &[&str] = &["HORA_GESTION", "time"];
const LATITUDE: &[&str] = &["LATITUD", "latitude", "lat"];
const LONGITUDE: &[&str] = &["LONGITUD", "longitude", "lon"];
const RESULT: &[&str] = &["RESULTADO", "result"];
const ACTION: &[&str] = &["ACCION", "action"];

struct ColumnMap {
    agent: usize,
    client: usize,
    date: usize,
    time: usize,
    latitude: usize,
    longitude: usize,
    result: usize,
    action: Option<usize>,
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|name| h.trim().eq_ignore_ascii_case(name)))
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> anyhow::Result<Self> {
        let required = |names: &[&str]| {
            find_column(headers, names)
                .with_context(|| format!("missing required column {}", names.join(" / ")))
        };
        Ok(Self {
            agent: required(AGENT)?,
            client: required(CLIENT)?,
            date: required(DATE)?,
            time: required(TIME)?,
            latitude: required(LATITUDE)?,
            longitude: required(LONGITUDE)?,
            result: required(RESULT)?,
            action: find_column(headers, ACTION),
        })
    }

    fn row(&self, record: &csv::StringRecord) -> Option<RawVisit> {
        let text = |idx: usize| record.get(idx).map(str::trim).unwrap_or_default();
        let agent = text(self.agent);
        if agent.is_empty() {
            return None;
        }
        Some(RawVisit {
            agent: agent.to_string(),
            client: text(self.client).to_string(),
            date: text(self.date).to_string(),
            time: text(self.time).to_string(),
            latitude: parse_coordinate(text(self.latitude))?,
            longitude: parse_coordinate(text(self.longitude))?,
            result: text(self.result).to_string(),
            action: self
                .action
                .map(|idx| text(idx).to_string())
                .filter(|a| !a.is_empty()),
        })
    }
}

/// Accepts a decimal comma as well as a decimal point.
fn parse_coordinate(text: &str) -> Option<f64> {
    text.replace(',', ".").parse().ok()
}

/// Reads raw rows, returning them with the count of rows that could not be read.
pub fn read_rows<R: Read>(reader: R) -> anyhow::Result<(Vec<RawVisit>, usize)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers().context("reading CSV headers")?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    let mut unreadable = 0;
    for (idx, result) in csv_reader.records().enumerate() {
        match result.ok().and_then(|record| columns.row(&record)) {
            Some(row) => rows.push(row),
            None => {
                warn!("skipping unreadable CSV row {}", idx + 2);
                unreadable += 1;
            }
        }
    }
    Ok((rows, unreadable))
}

pub fn load_reader<R: Read>(
    reader: R,
    rules: &ClassificationRules,
) -> anyhow::Result<(Dataset, LoadReport)> {
    let (rows, unreadable) = read_rows(reader)?;
    let (dataset, mut report) = Dataset::from_raw(rows, rules);
    report.skipped += unreadable;
    Ok((dataset, report))
}

pub fn load_csv<P: AsRef<Path>>(
    path: P,
    rules: &ClassificationRules,
) -> anyhow::Result<(Dataset, LoadReport)> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref)
        .with_context(|| format!("opening visit dataset {}", path_ref.display()))?;
    let (dataset, report) = load_reader(file, rules)
        .with_context(|| format!("loading visit dataset {}", path_ref.display()))?;
    if dataset.is_empty() {
        bail!("visit dataset {} has no usable rows", path_ref.display());
    }
    info!(
        "Loaded {} visits from {} ({} skipped)",
        report.accepted,
        path_ref.display(),
        report.skipped
    );
    Ok((dataset, report))
}
