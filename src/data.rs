//! Trial records, per-trial traces, and the configuration-form boundary.
//!
//! The submitted form payload is the only wire contract the crate consumes;
//! its field names (`df1`, `df2`, `df1_data`, `df2_data`, `label1`, `label2`,
//! `groupExploration`, and per-sample `time`/`col`) are fixed and must be
//! preserved byte-for-byte.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// One of the two comparison cohorts.
///
/// Group 2 exists only while dual-group exploration is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// First cohort (`df1`).
    One,
    /// Second cohort (`df2`).
    Two,
}

impl Group {
    /// Both groups, in drawing order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Zero-based index used by active-flag vectors.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

/// Build the composite key identifying one trial across all views.
#[must_use]
pub fn composite_key(sid: &str, trial: &str) -> String {
    format!("{sid}_{trial}")
}

/// One gait trial: a subject/trial identity plus opaque numeric attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    sid: String,
    trial: String,
    values: BTreeMap<String, f64>,
}

impl TrialRecord {
    /// Create a record with no attributes yet.
    #[must_use]
    pub fn new(sid: impl Into<String>, trial: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            trial: trial.into(),
            values: BTreeMap::new(),
        }
    }

    /// Add a numeric attribute.
    #[must_use]
    pub fn with_value(mut self, attribute: impl Into<String>, value: f64) -> Self {
        self.values.insert(attribute.into(), value);
        self
    }

    /// Subject identifier.
    #[must_use]
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Trial identifier within the subject.
    #[must_use]
    pub fn trial(&self) -> &str {
        &self.trial
    }

    /// The `"{sid}_{trial}"` composite key.
    #[must_use]
    pub fn key(&self) -> String {
        composite_key(&self.sid, &self.trial)
    }

    /// Look up one attribute value.
    #[must_use]
    pub fn value(&self, attribute: &str) -> Option<f64> {
        self.values.get(attribute).copied()
    }

    /// All numeric attributes of this record.
    #[must_use]
    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    /// Parse a record from one payload row.
    ///
    /// Returns `None` when `sid` or `trial` is missing or non-string — such
    /// rows are dropped upstream rather than aborting the whole load. Numeric
    /// fields become attributes; any other extra field is ignored.
    fn from_row(row: &Value) -> Option<Self> {
        let obj = row.as_object()?;
        let sid = obj.get("sid")?.as_str()?;
        let trial = obj.get("trial")?.as_str()?;

        let mut record = Self::new(sid, trial);
        for (name, value) in obj {
            if name == "sid" || name == "trial" {
                continue;
            }
            if let Some(v) = value.as_f64() {
                record.values.insert(name.clone(), v);
            }
        }
        Some(record)
    }
}

/// One per-timepoint sample of a trial trace.
///
/// The boundary names are `time` (gait-cycle percentage, 0-100) and `col`
/// (the measured value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// Gait-cycle percentage, 0-100.
    pub time: f64,
    /// Measured value at that point of the cycle.
    pub value: f64,
}

impl SamplePoint {
    /// Create a sample point.
    #[must_use]
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }

    fn from_row(row: &Value) -> Option<Self> {
        let obj = row.as_object()?;
        Some(Self::new(obj.get("time")?.as_f64()?, obj.get("col")?.as_f64()?))
    }
}

/// Raw form payload. Field names are the boundary contract.
#[derive(Debug, Deserialize)]
struct RawPayload {
    df1: Vec<Value>,
    #[serde(default)]
    df2: Option<Vec<Value>>,
    #[serde(default)]
    df1_data: BTreeMap<String, Vec<Value>>,
    #[serde(default)]
    df2_data: Option<BTreeMap<String, Vec<Value>>>,
    #[serde(default)]
    label1: String,
    #[serde(default)]
    label2: String,
    #[serde(rename = "groupExploration", default)]
    group_exploration: bool,
}

/// The two named cohorts plus their aggregate-by-trial trace maps.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    group1: Vec<TrialRecord>,
    group2: Vec<TrialRecord>,
    traces1: BTreeMap<String, Vec<SamplePoint>>,
    traces2: BTreeMap<String, Vec<SamplePoint>>,
    label1: String,
    label2: String,
    group_exploration: bool,
}

impl Dataset {
    /// Build a single-group dataset directly (used by tests and embedders).
    #[must_use]
    pub fn single_group(
        records: Vec<TrialRecord>,
        traces: BTreeMap<String, Vec<SamplePoint>>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            group1: records,
            traces1: traces,
            label1: label.into(),
            ..Self::default()
        }
    }

    /// Add the second cohort and enable dual-group exploration.
    #[must_use]
    pub fn with_group2(
        mut self,
        records: Vec<TrialRecord>,
        traces: BTreeMap<String, Vec<SamplePoint>>,
        label: impl Into<String>,
    ) -> Self {
        self.group2 = records;
        self.traces2 = traces;
        self.label2 = label.into();
        self.group_exploration = true;
        self
    }

    /// Parse a form payload from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload is not valid JSON or is missing the
    /// `df1` collection. Individually malformed rows are dropped with a
    /// warning instead.
    pub fn from_json(payload: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(payload)?)
    }

    /// Parse a form payload from an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error when the value does not match the payload shape.
    pub fn from_value(payload: Value) -> Result<Self> {
        let raw: RawPayload = serde_json::from_value(payload)?;

        let group1 = parse_records(&raw.df1, "df1");
        let group2 = raw
            .df2
            .as_deref()
            .map(|rows| parse_records(rows, "df2"))
            .unwrap_or_default();
        let traces1 = parse_traces(&raw.df1_data);
        let traces2 = raw.df2_data.as_ref().map(parse_traces).unwrap_or_default();

        log::info!(
            "dataset loaded: {} + {} records, {} + {} traces, exploration={}",
            group1.len(),
            group2.len(),
            traces1.len(),
            traces2.len(),
            raw.group_exploration
        );

        Ok(Self {
            group1,
            group2,
            traces1,
            traces2,
            label1: raw.label1,
            label2: raw.label2,
            group_exploration: raw.group_exploration,
        })
    }

    /// Whether dual-group exploration is enabled.
    #[must_use]
    pub fn group_exploration(&self) -> bool {
        self.group_exploration
    }

    /// Records for one group. `None` for group 2 while exploration is off.
    #[must_use]
    pub fn records(&self, group: Group) -> Option<&[TrialRecord]> {
        match group {
            Group::One => Some(&self.group1),
            Group::Two if self.group_exploration => Some(&self.group2),
            Group::Two => None,
        }
    }

    /// Aggregate-by-trial trace map for one group.
    #[must_use]
    pub fn traces(&self, group: Group) -> Option<&BTreeMap<String, Vec<SamplePoint>>> {
        match group {
            Group::One => Some(&self.traces1),
            Group::Two if self.group_exploration => Some(&self.traces2),
            Group::Two => None,
        }
    }

    /// Display label for one group.
    #[must_use]
    pub fn label(&self, group: Group) -> &str {
        match group {
            Group::One => &self.label1,
            Group::Two => &self.label2,
        }
    }

    /// All composite keys known to one group (records and traces).
    #[must_use]
    pub fn key_set(&self, group: Group) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        if let Some(records) = self.records(group) {
            keys.extend(records.iter().map(TrialRecord::key));
        }
        if let Some(traces) = self.traces(group) {
            keys.extend(traces.keys().cloned());
        }
        keys
    }

    /// Whether a composite key exists in one group.
    #[must_use]
    pub fn contains_key(&self, group: Group, key: &str) -> bool {
        self.records(group)
            .is_some_and(|records| records.iter().any(|r| r.key() == key))
            || self.traces(group).is_some_and(|traces| traces.contains_key(key))
    }
}

fn parse_records(rows: &[Value], which: &str) -> Vec<TrialRecord> {
    let records: Vec<TrialRecord> = rows.iter().filter_map(TrialRecord::from_row).collect();
    let dropped = rows.len() - records.len();
    if dropped > 0 {
        log::warn!("{which}: dropped {dropped} rows without sid/trial identity");
    }
    records
}

fn parse_traces(raw: &BTreeMap<String, Vec<Value>>) -> BTreeMap<String, Vec<SamplePoint>> {
    raw.iter()
        .map(|(key, rows)| {
            (key.clone(), rows.iter().filter_map(SamplePoint::from_row).collect())
        })
        .collect()
}
