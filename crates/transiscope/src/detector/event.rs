use std::collections::BTreeMap;

use crate::roi::RoiId;

/// Which detector produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Threshold,
    #[serde(rename = "dog")]
    DoG,
    ChangePoint,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Threshold => "Threshold",
            Self::DoG => "DoG",
            Self::ChangePoint => "ChangePoint",
        };
        f.write_str(name)
    }
}

/// Detector-specific event attribute.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A detected time interval within one ROI trace.
///
/// Times are in seconds; instantaneous events have `start_time == end_time`.
/// Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Event {
    roi_id: RoiId,
    event_type: EventKind,
    start_time: f64,
    end_time: f64,
    duration: f64,
    properties: BTreeMap<String, PropertyValue>,
}

impl Event {
    /// Build an event. `end_time` is raised to `start_time` if it precedes it.
    pub fn new(roi_id: RoiId, event_type: EventKind, start_time: f64, end_time: f64) -> Self {
        let end_time = end_time.max(start_time);
        Self {
            roi_id,
            event_type,
            start_time,
            end_time,
            duration: end_time - start_time,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.to_owned(), value.into());
        self
    }

    pub fn roi_id(&self) -> RoiId {
        self.roi_id
    }

    pub fn event_type(&self) -> EventKind {
        self.event_type
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}
