use serde::{Deserialize, Serialize};

/// Uniformly sampled channel data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSeries {
    /// Sampling frequency in Hz
    pub fs: f64,
    /// Samples
    pub data: Vec<f64>,
}

impl SampleSeries {
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn duration(&self) -> f64 {
        self.data.len() as f64 / self.fs
    }
    /// Timestamp of each sample in seconds.
    pub fn timestamps(&self) -> Vec<f64> {
        (0..self.data.len()).map(|i| i as f64 / self.fs).collect()
    }
}

/// Ascending sample indices of detected peaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakSet {
    pub indices: Vec<usize>,
}

impl PeakSet {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
    /// Peak timestamps in seconds for the given sampling rate.
    pub fn times(&self, fs: f64) -> Vec<f64> {
        self.indices.iter().map(|&i| i as f64 / fs).collect()
    }
}

/// Windowed values keyed by window end (or start) timestamps.
///
/// Timestamps are strictly increasing; `times` and `values` always have the
/// same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSeries {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl RateSeries {
    pub fn push(&mut self, t: f64, value: f64) {
        debug_assert!(self.times.last().map_or(true, |&last| t > last));
        self.times.push(t);
        self.values.push(value);
    }
    pub fn len(&self) -> usize {
        self.times.len()
    }
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }
    /// The single-point placeholder emitted when a computation cannot produce
    /// any window at all.
    pub fn degenerate() -> Self {
        Self {
            times: vec![0.0],
            values: vec![0.0],
        }
    }
    pub fn shift_times(&mut self, dt: f64) {
        for t in &mut self.times {
            *t += dt;
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }
}

/// Uniform chart payload returned by every series-producing operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesEnvelope {
    pub x_label: String,
    pub y_label: String,
    pub x_values: Vec<f64>,
    pub y_values: Vec<f64>,
}

impl SeriesEnvelope {
    pub fn from_rates(
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        series: RateSeries,
    ) -> Self {
        Self {
            x_label: x_label.into(),
            y_label: y_label.into(),
            x_values: series.times,
            y_values: series.values,
        }
    }

    pub fn from_samples(
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        series: &SampleSeries,
    ) -> Self {
        Self {
            x_label: x_label.into(),
            y_label: y_label.into(),
            x_values: series.timestamps(),
            y_values: series.data.clone(),
        }
    }
}
