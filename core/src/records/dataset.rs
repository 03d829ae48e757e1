use crate::records::raw::RawVisit;
use crate::records::visit::{ClassificationRules, VisitRecord};
use chrono::NaiveDate;
use log::warn;
use serde::Serialize;
use std::collections::BTreeSet;

/// Read access to the prepared visit dataset.
pub trait VisitSource {
    fn records(&self) -> &[VisitRecord];

    /// Distinct agents, sorted.
    fn agents(&self) -> Vec<String> {
        self.records()
            .iter()
            .map(|r| r.agent_id().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct dates with at least one visit by `agent`, sorted.
    fn dates_for(&self, agent: &str) -> Vec<NaiveDate> {
        self.records()
            .iter()
            .filter(|r| r.agent_id() == agent)
            .map(VisitRecord::date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Visits matching the pair, in dataset order.
    fn visits_for(&self, agent: &str, date: NaiveDate) -> Vec<VisitRecord> {
        self.records()
            .iter()
            .filter(|r| r.agent_id() == agent && r.date() == date)
            .cloned()
            .collect()
    }
}

/// Outcome of converting raw rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub accepted: usize,
    pub skipped: usize,
}

/// In-memory dataset of validated visits.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<VisitRecord>,
}

impl Dataset {
    pub fn new(records: Vec<VisitRecord>) -> Self {
        Self { records }
    }

    /// Converts raw rows, dropping the malformed ones.
    pub fn from_raw<I>(rows: I, rules: &ClassificationRules) -> (Self, LoadReport)
    where
        I: IntoIterator<Item = RawVisit>,
    {
        let mut report = LoadReport::default();
        let records = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match VisitRecord::from_raw(row, rules) {
                Ok(record) => {
                    report.accepted += 1;
                    Some(record)
                }
                Err(err) => {
                    warn!("skipping row {}: {}", index + 1, err);
                    report.skipped += 1;
                    None
                }
            })
            .collect();
        (Self { records }, report)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl VisitSource for Dataset {
    fn records(&self) -> &[VisitRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures::{raw, visit};

    #[test]
    fn from_raw_skips_malformed_rows() {
        let mut bad = raw("G01", "2024-03-05", "08:00:00", -12.0, -77.0);
        bad.time = "later".into();
        let rows = vec![raw("G01", "2024-03-05", "08:00:00", -12.0, -77.0), bad];
        let (dataset, report) = Dataset::from_raw(rows, &ClassificationRules::default());
        assert_eq!(dataset.len(), 1);
        assert_eq!(
            report,
            LoadReport {
                accepted: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn agents_and_dates_are_sorted_and_distinct() {
        let dataset = Dataset::new(vec![
            visit("G02", "2024-03-06", "08:00:00", -12.0, -77.0),
            visit("G01", "2024-03-06", "08:00:00", -12.0, -77.0),
            visit("G01", "2024-03-05", "09:00:00", -12.0, -77.0),
            visit("G01", "2024-03-06", "10:00:00", -12.0, -77.0),
        ]);
        assert_eq!(dataset.agents(), vec!["G01", "G02"]);
        let dates: Vec<String> = dataset
            .dates_for("G01")
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(dates, vec!["2024-03-05", "2024-03-06"]);
        assert!(dataset.dates_for("X").is_empty());
    }

    #[test]
    fn visits_for_filters_on_both_keys() {
        let dataset = Dataset::new(vec![
            visit("G01", "2024-03-05", "08:00:00", -12.0, -77.0),
            visit("G01", "2024-03-06", "08:00:00", -12.0, -77.0),
            visit("G02", "2024-03-05", "08:00:00", -12.0, -77.0),
        ]);
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(dataset.visits_for("G01", date).len(), 1);
    }
}
