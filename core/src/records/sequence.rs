use crate::math::stats::StatsHelper;
use crate::prelude::GeoPoint;
use crate::records::visit::VisitRecord;
use chrono::NaiveDate;
use serde::Serialize;

/// Visits of one (agent, date) pair ordered by time of day. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VisitSequence {
    records: Vec<VisitRecord>,
}

impl VisitSequence {
    /// Sorts by time of day, keeping input order for equal times.
    /// Returns `None` for an empty input.
    pub fn new(mut records: Vec<VisitRecord>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        records.sort_by_key(|record| record.time());
        Some(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[VisitRecord] {
        &self.records
    }

    pub fn first(&self) -> &VisitRecord {
        &self.records[0]
    }

    pub fn agent_id(&self) -> &str {
        self.first().agent_id()
    }

    pub fn date(&self) -> NaiveDate {
        self.first().date()
    }

    pub fn locations(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.records.iter().map(VisitRecord::location)
    }

    /// Mean latitude and longitude of every visit.
    pub fn centroid(&self) -> GeoPoint {
        StatsHelper::centroid(self.locations()).unwrap_or_else(|| self.first().location())
    }
}
