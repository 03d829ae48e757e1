use crate::prelude::{GeoPoint, NavResult, NavigatorError};
use crate::records::raw::{parse_date, parse_time, RawVisit};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// How the agent reached the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    InPerson,
    Remote,
}

impl Channel {
    pub fn label(&self) -> &'static str {
        match self {
            Channel::InPerson => "In person",
            Channel::Remote => "Remote",
        }
    }
}

/// Fixed label sets used to derive `effective` and `channel`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassificationRules {
    pub positive_results: Vec<String>,
    pub in_person_actions: Vec<String>,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self {
            positive_results: vec![
                "PAGO".into(),
                "PROMESA DE PAGO".into(),
                "COMPROMISO DE PAGO".into(),
            ],
            in_person_actions: vec!["VISITA A CASA".into(), "VISITA REFERENCIA".into()],
        }
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_uppercase()
}

impl ClassificationRules {
    pub fn is_effective(&self, result: &str) -> bool {
        let result = normalize(result);
        self.positive_results
            .iter()
            .any(|code| normalize(code) == result)
    }

    pub fn channel_for(&self, action: Option<&str>) -> Channel {
        let Some(action) = action.map(normalize) else {
            return Channel::Remote;
        };
        if self
            .in_person_actions
            .iter()
            .any(|label| normalize(label) == action)
        {
            Channel::InPerson
        } else {
            Channel::Remote
        }
    }
}

/// One validated field visit. Fields are read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitRecord {
    agent_id: String,
    client_id: String,
    date: NaiveDate,
    time: NaiveTime,
    location: GeoPoint,
    result: String,
    action: Option<String>,
    effective: bool,
    channel: Channel,
}

impl VisitRecord {
    pub fn from_raw(raw: RawVisit, rules: &ClassificationRules) -> NavResult<Self> {
        let date = parse_date(&raw.date)?;
        let time = parse_time(&raw.time)?;
        let location = validate_location(raw.latitude, raw.longitude)?;
        let action = raw
            .action
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        Ok(Self {
            effective: rules.is_effective(&raw.result),
            channel: rules.channel_for(action.as_deref()),
            agent_id: raw.agent.trim().to_string(),
            client_id: raw.client.trim().to_string(),
            date,
            time,
            location,
            result: raw.result.trim().to_string(),
            action,
        })
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn location(&self) -> GeoPoint {
        self.location
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn is_effective(&self) -> bool {
        self.effective
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }
}

fn validate_location(lat: f64, lon: f64) -> NavResult<GeoPoint> {
    let point = GeoPoint::new(lat, lon);
    if !point.is_finite() {
        return Err(NavigatorError::InvalidRecord(format!(
            "non-finite coordinate ({}, {})",
            lat, lon
        )));
    }
    if lat == 0.0 || lon == 0.0 {
        return Err(NavigatorError::InvalidRecord(format!(
            "zero coordinate ({}, {})",
            lat, lon
        )));
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(NavigatorError::InvalidRecord(format!(
            "coordinate out of range ({}, {})",
            lat, lon
        )));
    }
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(result: &str, action: Option<&str>) -> RawVisit {
        RawVisit {
            agent: " G01 ".into(),
            client: "C-100".into(),
            date: "2024-03-05".into(),
            time: "09:30:00".into(),
            latitude: -12.05,
            longitude: -77.04,
            result: result.into(),
            action: action.map(Into::into),
        }
    }

    #[test]
    fn record_derives_effective_and_channel() {
        let rules = ClassificationRules::default();
        let record = VisitRecord::from_raw(raw("promesa de pago", Some(" visita a casa ")), &rules)
            .unwrap();
        assert_eq!(record.agent_id(), "G01");
        assert!(record.is_effective());
        assert_eq!(record.channel(), Channel::InPerson);

        let record = VisitRecord::from_raw(raw("NO CONTESTA", Some("LLAMADA")), &rules).unwrap();
        assert!(!record.is_effective());
        assert_eq!(record.channel(), Channel::Remote);
    }

    #[test]
    fn missing_action_is_remote() {
        let rules = ClassificationRules::default();
        let record = VisitRecord::from_raw(raw("PAGO", Some("  ")), &rules).unwrap();
        assert_eq!(record.action(), None);
        assert_eq!(record.channel(), Channel::Remote);
    }

    #[test]
    fn zero_or_out_of_range_coordinates_are_rejected() {
        let rules = ClassificationRules::default();
        let mut zero = raw("PAGO", None);
        zero.latitude = 0.0;
        assert!(matches!(
            VisitRecord::from_raw(zero, &rules),
            Err(NavigatorError::InvalidRecord(_))
        ));

        let mut far = raw("PAGO", None);
        far.longitude = 200.0;
        assert!(VisitRecord::from_raw(far, &rules).is_err());

        let mut nan = raw("PAGO", None);
        nan.latitude = f64::NAN;
        assert!(VisitRecord::from_raw(nan, &rules).is_err());
    }
}
