//! Statistics feeding the chart views.
//!
//! Pure functions over trial records and trace maps: five-number summaries
//! for box plots, per-attribute means for the radar chart, and per-timepoint
//! ensemble bands for the line chart.
//!
//! Non-finite values are skipped in every aggregate. This is the one policy
//! applied crate-wide; callers never see a `NaN` leak out of a summary.

use std::collections::BTreeMap;

use crate::data::{SamplePoint, TrialRecord};

/// Five-number summary of one attribute's distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileSummary {
    /// Smallest finite value.
    pub min: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Median (50th percentile).
    pub median: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
    /// Largest finite value.
    pub max: f64,
}

impl QuantileSummary {
    /// Compute the summary of a value sequence.
    ///
    /// Quantiles interpolate linearly between order statistics at rank
    /// `p * (n - 1)`. Returns `None` on an empty or all-non-finite input —
    /// the "insufficient data" signal callers must handle by skipping the box.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }

    /// Tooltip form: all five numbers to two decimals.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "Min: {:.2}\nQ1: {:.2}\nMedian: {:.2}\nQ3: {:.2}\nMax: {:.2}",
            self.min, self.q1, self.median, self.q3, self.max
        )
    }
}

/// Compute the five-number summary of one attribute over a record set.
#[must_use]
pub fn quantile_summary(records: &[TrialRecord], attribute: &str) -> Option<QuantileSummary> {
    QuantileSummary::from_values(&attribute_values(records, attribute))
}

/// Calculate a quantile using linear interpolation between order statistics.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;

    if lo == hi || hi >= sorted.len() {
        sorted[lo.min(sorted.len() - 1)]
    } else {
        let d = rank - lo as f64;
        sorted[lo] * (1.0 - d) + sorted[hi] * d
    }
}

/// Finite values of one attribute across a record set.
#[must_use]
pub fn attribute_values(records: &[TrialRecord], attribute: &str) -> Vec<f64> {
    records
        .iter()
        .filter_map(|r| r.value(attribute))
        .filter(|v| v.is_finite())
        .collect()
}

/// Mean of every numeric attribute across a record set.
///
/// Attributes are discovered by type, not by an allow-list: any field that is
/// numeric on at least one record contributes. The identity fields never
/// appear because they are not numeric. An attribute whose values are all
/// non-finite is absent from the result.
#[must_use]
pub fn attribute_means(records: &[TrialRecord]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in records {
        for (attribute, value) in record.values() {
            if value.is_finite() {
                let entry = sums.entry(attribute.clone()).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
    }

    sums.into_iter().map(|(attribute, (sum, count))| (attribute, sum / count as f64)).collect()
}

/// One per-timepoint row of a group's ensemble: mean with a one-sigma band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanBand {
    /// Gait-cycle percentage, 0-100.
    pub time: f64,
    /// Mean across trials at this timepoint.
    pub mean: f64,
    /// Mean minus one population standard deviation.
    pub lower: f64,
    /// Mean plus one population standard deviation.
    pub upper: f64,
}

/// Ensemble a group's traces into a per-timepoint mean and spread band.
///
/// Traces are truncated to the shortest non-empty trace. Timepoints where no
/// trace has a finite value are skipped.
#[must_use]
pub fn ensemble(traces: &BTreeMap<String, Vec<SamplePoint>>) -> Vec<MeanBand> {
    let series: Vec<&Vec<SamplePoint>> = traces.values().filter(|t| !t.is_empty()).collect();
    let Some(len) = series.iter().map(|t| t.len()).min() else {
        return Vec::new();
    };

    let mut bands = Vec::with_capacity(len);
    for i in 0..len {
        let values: Vec<f64> =
            series.iter().map(|t| t[i].value).filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            continue;
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
        let sd = variance.sqrt();

        bands.push(MeanBand {
            time: series[0][i].time,
            mean,
            lower: mean - sd,
            upper: mean + sd,
        });
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TrialRecord;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn records() -> Vec<TrialRecord> {
        vec![
            TrialRecord::new("A", "1").with_value("Gait", 1.0),
            TrialRecord::new("A", "2").with_value("Gait", 2.0),
            TrialRecord::new("B", "1").with_value("Gait", 3.0),
        ]
    }

    #[test]
    fn test_quantile_summary_three_values() {
        let s = QuantileSummary::from_values(&[1.0, 2.0, 3.0]).unwrap();
        assert_relative_eq!(s.min, 1.0);
        assert_relative_eq!(s.q1, 1.5);
        assert_relative_eq!(s.median, 2.0);
        assert_relative_eq!(s.q3, 2.5);
        assert_relative_eq!(s.max, 3.0);
    }

    #[test]
    fn test_quantile_summary_unsorted_input() {
        let s = QuantileSummary::from_values(&[3.0, 1.0, 2.0]).unwrap();
        assert!((s.median - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_quantile_summary_empty() {
        assert!(QuantileSummary::from_values(&[]).is_none());
    }

    #[test]
    fn test_quantile_summary_all_non_finite() {
        assert!(QuantileSummary::from_values(&[f64::NAN, f64::INFINITY]).is_none());
    }

    #[test]
    fn test_quantile_summary_skips_nan() {
        let s = QuantileSummary::from_values(&[1.0, f64::NAN, 3.0]).unwrap();
        assert!((s.median - 2.0).abs() < 1e-9);
        assert!((s.max - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_quantile_summary_single_value() {
        let s = QuantileSummary::from_values(&[42.0]).unwrap();
        assert!((s.min - 42.0).abs() < 1e-9);
        assert!((s.max - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_quantile_summary_over_records() {
        let s = quantile_summary(&records(), "Gait").unwrap();
        assert!((s.q1 - 1.5).abs() < 1e-9);
        assert!(quantile_summary(&records(), "Missing").is_none());
    }

    #[test]
    fn test_describe_two_decimals() {
        let s = QuantileSummary::from_values(&[1.0, 2.0, 3.0]).unwrap();
        assert!(s.describe().contains("Q1: 1.50"));
        assert!(s.describe().contains("Max: 3.00"));
    }

    #[test]
    fn test_attribute_means() {
        let means = attribute_means(&records());
        assert!((means["Gait"] - 2.0).abs() < 1e-9);
        // Identity fields are not numeric and never show up
        assert!(!means.contains_key("sid"));
        assert!(!means.contains_key("trial"));
    }

    #[test]
    fn test_attribute_means_skips_non_finite() {
        let recs = vec![
            TrialRecord::new("A", "1").with_value("Gait", 1.0),
            TrialRecord::new("A", "2").with_value("Gait", f64::NAN),
        ];
        let means = attribute_means(&recs);
        assert!((means["Gait"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_attribute_means_empty() {
        assert!(attribute_means(&[]).is_empty());
    }

    #[test]
    fn test_ensemble_mean_and_band() {
        let mut traces = BTreeMap::new();
        traces.insert(
            "A_1".to_string(),
            vec![SamplePoint::new(0.0, 1.0), SamplePoint::new(50.0, 3.0)],
        );
        traces.insert(
            "A_2".to_string(),
            vec![SamplePoint::new(0.0, 3.0), SamplePoint::new(50.0, 5.0)],
        );

        let bands = ensemble(&traces);
        assert_eq!(bands.len(), 2);
        assert_relative_eq!(bands[0].mean, 2.0);
        // Population sigma of {1, 3} is 1
        assert_relative_eq!(bands[0].lower, 1.0);
        assert_relative_eq!(bands[0].upper, 3.0);
        assert_relative_eq!(bands[1].time, 50.0);
    }

    #[test]
    fn test_ensemble_truncates_to_shortest() {
        let mut traces = BTreeMap::new();
        traces.insert("A_1".to_string(), vec![SamplePoint::new(0.0, 1.0)]);
        traces.insert(
            "A_2".to_string(),
            vec![SamplePoint::new(0.0, 3.0), SamplePoint::new(50.0, 5.0)],
        );
        assert_eq!(ensemble(&traces).len(), 1);
    }

    #[test]
    fn test_ensemble_empty() {
        assert!(ensemble(&BTreeMap::new()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_quantiles_are_ordered(values in proptest::collection::vec(-1e6f64..1e6, 1..200)) {
            let s = QuantileSummary::from_values(&values).expect("non-empty finite input");
            prop_assert!(s.min <= s.q1);
            prop_assert!(s.q1 <= s.median);
            prop_assert!(s.median <= s.q3);
            prop_assert!(s.q3 <= s.max);
        }
    }
}
