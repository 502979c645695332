use crate::signal::RateSeries;
use crate::windows::{block_means, BlockStamp};
use serde::{Deserialize, Serialize};

/// Which channel combination feeds the composite index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressModel {
    /// Standardized channel levels only.
    Levels,
    /// Cardiac variability (absolute first difference) with an
    /// EDA-variability interaction term.
    Variability,
}

/// Composite stress index configuration. Channel weights are data, not code:
/// both observed model variants are selectable and re-weightable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub model: StressModel,
    /// Fixed block length of the output grid, in seconds.
    pub window_sec: f64,
    /// Added to each block-start timestamp in the output grid.
    pub presentation_offset_sec: f64,
    pub eda_weight: f64,
    pub cardiac_weight: f64,
    pub temperature_weight: f64,
    /// Weight of the EDA x cardiac-variability cross term (variability
    /// model only).
    pub interaction_weight: f64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self::levels()
    }
}

impl StressConfig {
    pub fn levels() -> Self {
        Self {
            model: StressModel::Levels,
            window_sec: 5.0,
            presentation_offset_sec: 5.0,
            eda_weight: 0.5,
            cardiac_weight: 0.3,
            temperature_weight: 0.2,
            interaction_weight: 0.0,
        }
    }

    pub fn variability() -> Self {
        Self {
            model: StressModel::Variability,
            window_sec: 5.0,
            presentation_offset_sec: 5.0,
            eda_weight: 0.4,
            cardiac_weight: 0.3,
            temperature_weight: 0.2,
            interaction_weight: 0.1,
        }
    }
}

/// Time-aligned input channels, already truncated by the caller to a common
/// sampling rate (`fs`); lengths may still differ and are clipped here.
#[derive(Debug, Clone, Copy)]
pub struct StressInputs<'a> {
    pub eda: &'a [f64],
    pub cardiac: &'a [f64],
    pub temperature: &'a [f64],
    pub fs: f64,
}

/// Composite stress index in [0, 100] over fixed blocks.
///
/// Each channel is standardized over the whole session; a session too short
/// to standardize (length < 2) or a zero-variance channel degrades the whole
/// index to an empty series.
pub fn stress_index_series(inputs: &StressInputs<'_>, cfg: &StressConfig) -> RateSeries {
    let n = inputs
        .eda
        .len()
        .min(inputs.cardiac.len())
        .min(inputs.temperature.len());
    if n < 2 {
        return RateSeries::default();
    }
    let Some(eda_z) = zscore(&inputs.eda[..n]) else {
        return RateSeries::default();
    };
    let Some(temp_z) = zscore(&inputs.temperature[..n]) else {
        return RateSeries::default();
    };
    let raw: Vec<f64> = match cfg.model {
        StressModel::Levels => {
            let Some(cardiac_z) = zscore(&inputs.cardiac[..n]) else {
                return RateSeries::default();
            };
            (0..n)
                .map(|i| {
                    cfg.eda_weight * eda_z[i] + cfg.cardiac_weight * cardiac_z[i]
                        - cfg.temperature_weight * temp_z[i]
                })
                .collect()
        }
        StressModel::Variability => {
            let variability = abs_first_difference(&inputs.cardiac[..n]);
            let Some(var_z) = zscore(&variability) else {
                return RateSeries::default();
            };
            (0..n)
                .map(|i| {
                    cfg.eda_weight * eda_z[i] + cfg.cardiac_weight * var_z[i]
                        - cfg.temperature_weight * temp_z[i]
                        + cfg.interaction_weight * eda_z[i] * var_z[i]
                })
                .collect()
        }
    };
    let index: Vec<f64> = raw
        .iter()
        .map(|&x| (100.0 / (1.0 + (-x).exp())).clamp(0.0, 100.0))
        .collect();
    let mut out = block_means(&index, inputs.fs, cfg.window_sec, BlockStamp::Start);
    out.shift_times(cfg.presentation_offset_sec);
    out
}

fn zscore(data: &[f64]) -> Option<Vec<f64>> {
    if data.len() < 2 {
        return None;
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    if variance <= 0.0 || !variance.is_finite() {
        return None;
    }
    let sd = variance.sqrt();
    Some(data.iter().map(|x| (x - mean) / sd).collect())
}

fn abs_first_difference(data: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(data.len());
    out.push(0.0);
    for w in data.windows(2) {
        out.push((w[1] - w[0]).abs());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize, scale: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * scale).collect()
    }

    fn wave(n: usize, freq: f64) -> Vec<f64> {
        (0..n).map(|i| (i as f64 * freq).sin()).collect()
    }

    #[test]
    fn index_stays_in_bounds_under_extreme_inputs() {
        let mut eda = ramp(200, 100.0);
        eda[199] = 1e9;
        let cardiac = wave(200, 0.7);
        let temp = ramp(200, -50.0);
        let inputs = StressInputs {
            eda: &eda,
            cardiac: &cardiac,
            temperature: &temp,
            fs: 4.0,
        };
        for cfg in [StressConfig::levels(), StressConfig::variability()] {
            let series = stress_index_series(&inputs, &cfg);
            assert!(!series.is_empty());
            for (_, v) in series.iter() {
                assert!((0.0..=100.0).contains(&v), "index {} out of bounds", v);
            }
        }
    }

    #[test]
    fn output_grid_is_offset_block_starts() {
        let eda = wave(80, 0.3);
        let cardiac = wave(80, 0.5);
        let temp = wave(80, 0.11);
        let inputs = StressInputs {
            eda: &eda,
            cardiac: &cardiac,
            temperature: &temp,
            fs: 4.0,
        };
        let series = stress_index_series(&inputs, &StressConfig::levels());
        // 80 samples at 4 Hz = 20 s = four 5 s blocks, stamped start + offset
        assert_eq!(series.times, vec![5.0, 10.0, 15.0, 20.0]);
    }

    #[test]
    fn zero_variance_channel_degrades_to_empty() {
        let eda = vec![1.0; 40];
        let cardiac = wave(40, 0.5);
        let temp = wave(40, 0.2);
        let inputs = StressInputs {
            eda: &eda,
            cardiac: &cardiac,
            temperature: &temp,
            fs: 4.0,
        };
        assert!(stress_index_series(&inputs, &StressConfig::levels()).is_empty());
    }

    #[test]
    fn session_shorter_than_two_samples_degrades() {
        let inputs = StressInputs {
            eda: &[1.0],
            cardiac: &[1.0],
            temperature: &[1.0],
            fs: 4.0,
        };
        assert!(stress_index_series(&inputs, &StressConfig::levels()).is_empty());
    }

    #[test]
    fn constant_cardiac_degrades_variability_model() {
        let eda = wave(40, 0.3);
        let cardiac = vec![70.0; 40];
        let temp = wave(40, 0.2);
        let inputs = StressInputs {
            eda: &eda,
            cardiac: &cardiac,
            temperature: &temp,
            fs: 4.0,
        };
        assert!(stress_index_series(&inputs, &StressConfig::variability()).is_empty());
    }

    #[test]
    fn models_disagree_on_the_same_inputs() {
        let eda = ramp(100, 0.05);
        let cardiac = wave(100, 0.9);
        let temp = ramp(100, 0.01);
        let inputs = StressInputs {
            eda: &eda,
            cardiac: &cardiac,
            temperature: &temp,
            fs: 4.0,
        };
        let levels = stress_index_series(&inputs, &StressConfig::levels());
        let variability = stress_index_series(&inputs, &StressConfig::variability());
        assert_eq!(levels.times, variability.times);
        assert_ne!(levels.values, variability.values);
    }
}
