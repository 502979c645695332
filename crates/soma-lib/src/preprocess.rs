use crate::signal::SampleSeries;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Sampling rate of the condition-label channel (Hz).
pub const LABEL_FS: f64 = 700.0;

/// Fallback sampling rates for payloads that carry no rate of their own.
pub fn default_fs(modality: &str) -> Option<f64> {
    match modality.to_ascii_uppercase().as_str() {
        "EDA" => Some(4.0),
        "BVP" => Some(64.0),
        "TEMP" => Some(4.0),
        "ACC" => Some(32.0),
        "ECG" => Some(700.0),
        "RESP" => Some(700.0),
        "EMG" => Some(700.0),
        "LABEL" => Some(LABEL_FS),
        _ => None,
    }
}

/// Accelerometer column selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
    Magnitude,
}

impl Axis {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "z" => Some(Axis::Z),
            "mag" | "magnitude" => Some(Axis::Magnitude),
            _ => None,
        }
    }

    fn column(self) -> Option<usize> {
        match self {
            Axis::X => Some(0),
            Axis::Y => Some(1),
            Axis::Z => Some(2),
            Axis::Magnitude => None,
        }
    }

    /// Suffix used in axis-qualified channel labels.
    pub fn label_suffix(self) -> &'static str {
        match self {
            Axis::X => " (x)",
            Axis::Y => " (y)",
            Axis::Z => " (z)",
            Axis::Magnitude => " (mag)",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
            Axis::Magnitude => write!(f, "mag"),
        }
    }
}

/// Channel sample data as stored: either a flat sequence or one row per
/// sample across columns (3-axis accelerometer, single-column chest leads).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Matrix {
    Flat(Vec<f64>),
    Rows(Vec<Vec<f64>>),
}

impl Matrix {
    pub fn rows(&self) -> usize {
        match self {
            Matrix::Flat(v) => v.len(),
            Matrix::Rows(rows) => rows.len(),
        }
    }

    pub fn columns(&self) -> usize {
        match self {
            Matrix::Flat(_) => 1,
            Matrix::Rows(rows) => rows.first().map_or(0, Vec::len),
        }
    }
}

/// Raw channel payload as found in a recording: some modalities are stored
/// as a record with an explicit sampling rate, others as a bare array.
/// Resolved exactly once, here, into a [`SampleSeries`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelPayload {
    Structured {
        signal: Matrix,
        #[serde(default)]
        sampling_rate: Option<f64>,
    },
    Bare(Matrix),
}

impl ChannelPayload {
    pub fn matrix(&self) -> &Matrix {
        match self {
            ChannelPayload::Structured { signal, .. } => signal,
            ChannelPayload::Bare(matrix) => matrix,
        }
    }

    pub fn sampling_rate(&self) -> Option<f64> {
        match self {
            ChannelPayload::Structured { sampling_rate, .. } => *sampling_rate,
            ChannelPayload::Bare(_) => None,
        }
    }
}

/// Calibration settings applied while resolving raw payloads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Divisor converting wrist accelerometer counts to g.
    pub wrist_acc_divisor: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            wrist_acc_divisor: 64.0,
        }
    }
}

/// Axis selection and decimation applied after column resolution.
#[derive(Debug, Clone, Copy)]
pub struct SeriesOptions {
    pub axis: Option<Axis>,
    /// Keep every stride-th sample.
    pub stride: usize,
    /// Maximum number of samples kept after decimation.
    pub limit: Option<usize>,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            axis: None,
            stride: 1,
            limit: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("axis {0} is not available for this channel")]
    AxisUnavailable(Axis),
    #[error("channel matrix is ragged at row {row}")]
    RaggedMatrix { row: usize },
}

/// Resolve a raw payload into a flat series: pick the sampling rate, collapse
/// accelerometer columns, apply wrist calibration, then decimate.
pub fn resolve_channel(
    payload: &ChannelPayload,
    sensor: &str,
    modality: &str,
    opts: &SeriesOptions,
    cfg: &PreprocessConfig,
) -> Result<SampleSeries, PreprocessError> {
    let fs = payload
        .sampling_rate()
        .filter(|&fs| fs > 0.0)
        .or_else(|| default_fs(modality))
        .unwrap_or(1.0);

    let is_acc = modality.eq_ignore_ascii_case("ACC");
    let mut data = resolve_columns(payload.matrix(), is_acc, opts.axis)?;

    if is_acc && sensor.eq_ignore_ascii_case("wrist") && cfg.wrist_acc_divisor != 0.0 {
        for v in &mut data {
            *v /= cfg.wrist_acc_divisor;
        }
    }

    let stride = opts.stride.max(1);
    if stride > 1 {
        data = data.into_iter().step_by(stride).collect();
    }
    if let Some(limit) = opts.limit {
        data.truncate(limit);
    }

    Ok(SampleSeries {
        fs: fs / stride as f64,
        data,
    })
}

fn resolve_columns(
    matrix: &Matrix,
    is_acc: bool,
    axis: Option<Axis>,
) -> Result<Vec<f64>, PreprocessError> {
    match matrix {
        Matrix::Flat(values) => match axis {
            None | Some(Axis::Magnitude) => Ok(values.clone()),
            Some(other) => Err(PreprocessError::AxisUnavailable(other)),
        },
        Matrix::Rows(rows) => {
            let width = rows.first().map_or(0, Vec::len);
            if let Some(row) = rows.iter().position(|r| r.len() != width) {
                return Err(PreprocessError::RaggedMatrix { row });
            }
            if is_acc && width >= 3 {
                match axis.and_then(Axis::column) {
                    Some(col) => Ok(rows.iter().map(|r| r[col]).collect()),
                    None => Ok(rows
                        .iter()
                        .map(|r| (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt())
                        .collect()),
                }
            } else {
                match axis {
                    Some(axis) if axis != Axis::Magnitude => {
                        Err(PreprocessError::AxisUnavailable(axis))
                    }
                    _ => Ok(rows.iter().flatten().copied().collect()),
                }
            }
        }
    }
}
