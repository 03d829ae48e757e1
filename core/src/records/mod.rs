pub mod dataset;
pub mod raw;
pub mod sequence;
pub mod visit;

pub use dataset::{Dataset, LoadReport, VisitSource};
pub use raw::RawVisit;
pub use sequence::VisitSequence;
pub use visit::{Channel, ClassificationRules, VisitRecord};

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{ClassificationRules, RawVisit, VisitRecord};

    pub fn raw(agent: &str, date: &str, time: &str, lat: f64, lon: f64) -> RawVisit {
        RawVisit {
            agent: agent.into(),
            client: format!("C-{}", time),
            date: date.into(),
            time: time.into(),
            latitude: lat,
            longitude: lon,
            result: "PAGO".into(),
            action: Some("VISITA A CASA".into()),
        }
    }

    pub fn visit(agent: &str, date: &str, time: &str, lat: f64, lon: f64) -> VisitRecord {
        VisitRecord::from_raw(
            raw(agent, date, time, lat, lon),
            &ClassificationRules::default(),
        )
        .unwrap()
    }
}
