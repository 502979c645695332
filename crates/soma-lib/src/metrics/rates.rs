use crate::detect::{find_peaks, PeakCriteria};
use crate::filters::{bandpass_zero_phase, Band, RESP_BAND};
use crate::signal::{RateSeries, SampleSeries};
use crate::windows::{block_means, block_peak_rates, trailing_count_rates, BlockStamp};

/// Heart-rate pipeline parameters.
#[derive(Debug, Clone, Copy)]
pub struct HeartRateConfig {
    /// Fixed block length in seconds.
    pub window_sec: f64,
    /// Minimum inter-beat distance in seconds.
    pub min_distance_sec: f64,
    /// Beat prominence as a fraction of the signal standard deviation.
    pub prominence_std_scale: f64,
}

impl Default for HeartRateConfig {
    fn default() -> Self {
        Self {
            window_sec: 5.0,
            min_distance_sec: 0.4,
            prominence_std_scale: 0.5,
        }
    }
}

/// Beats per minute over fixed blocks, from prominence-gated peaks on the
/// (already preprocessed) cardiac signal. Inputs shorter than one block
/// yield an empty series.
pub fn heart_rate_series(series: &SampleSeries, cfg: &HeartRateConfig) -> RateSeries {
    if series.len() < 2 || series.fs <= 0.0 {
        return RateSeries::default();
    }
    let sigma = population_std(&series.data);
    let criteria = PeakCriteria {
        min_distance: cfg.min_distance_sec * series.fs,
        height: None,
        prominence: Some(cfg.prominence_std_scale * sigma),
    };
    let peaks = find_peaks(&series.data, &criteria);
    block_peak_rates(&peaks, series.fs, series.len(), cfg.window_sec)
}

/// Breathing-rate pipeline parameters.
#[derive(Debug, Clone, Copy)]
pub struct BreathingConfig {
    /// Trailing lookback length in seconds.
    pub winsec: usize,
    /// Step between window ends in seconds.
    pub step_sec: usize,
    /// Respiration extraction band.
    pub band: Band,
    /// Minimum breath-to-breath distance in seconds.
    pub min_distance_sec: f64,
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            winsec: 15,
            step_sec: 5,
            band: RESP_BAND,
            min_distance_sec: 1.0,
        }
    }
}

/// Breaths per minute over trailing-lookback windows of the band-filtered
/// respiration signal. An infeasible filter or an input shorter than one
/// step collapses to the degenerate `{0.0: 0.0}` series.
pub fn breathing_rate_series(series: &SampleSeries, cfg: &BreathingConfig) -> RateSeries {
    let Some(filtered) = bandpass_zero_phase(&series.data, series.fs, cfg.band, 2) else {
        return RateSeries::degenerate();
    };
    let fs = series.fs;
    let criteria = PeakCriteria {
        min_distance: cfg.min_distance_sec * fs,
        height: Some(0.0),
        prominence: None,
    };
    trailing_count_rates(&filtered, fs, cfg.winsec, cfg.step_sec, |window| {
        find_peaks(window, &criteria).len()
    })
}

/// Fixed-block mean trend of an already preprocessed channel (movement,
/// temperature, skin conductance).
pub fn trend_series(series: &SampleSeries, window_sec: f64, stamp: BlockStamp) -> RateSeries {
    block_means(&series.data, series.fs, window_sec, stamp)
}

fn population_std(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mean = data.iter().sum::<f64>() / data.len() as f64;
    (data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / data.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// ECG-like trace: R-wave bumps on a slow baseline wander.
    fn synthetic_ecg(fs: f64, bpm: f64, seconds: f64) -> SampleSeries {
        let period = 60.0 / bpm;
        let n = (seconds * fs) as usize;
        let mut data = Vec::with_capacity(n);
        for i in 0..n {
            let t = i as f64 / fs;
            let mut v = 0.03 * (2.0 * PI * 1.0 * t).sin();
            let mut beat = 0.5;
            while beat < seconds + 1.0 {
                let width = 0.02;
                v += 1.2 * (-0.5 * ((t - beat) / width).powi(2)).exp();
                beat += period;
            }
            data.push(v);
        }
        SampleSeries { fs, data }
    }

    #[test]
    fn regular_rhythm_reports_its_rate() {
        let series = synthetic_ecg(700.0, 75.0, 30.0);
        let rates = heart_rate_series(&series, &HeartRateConfig::default());
        assert_eq!(rates.len(), 6);
        for (_, bpm) in rates.iter() {
            assert!((bpm - 75.0).abs() <= 2.0, "window rate {} off 75", bpm);
        }
    }

    #[test]
    fn heart_rate_keys_step_by_window() {
        let series = synthetic_ecg(700.0, 60.0, 25.0);
        let rates = heart_rate_series(&series, &HeartRateConfig::default());
        assert!(rates.times.windows(2).all(|w| (w[1] - w[0] - 5.0).abs() < 1e-9));
    }

    #[test]
    fn short_cardiac_input_is_empty() {
        let series = SampleSeries {
            fs: 700.0,
            data: vec![0.0; 100],
        };
        assert!(heart_rate_series(&series, &HeartRateConfig::default()).is_empty());
    }

    #[test]
    fn respiration_sinusoid_reports_twelve() {
        let fs = 700.0;
        let n = (60.0 * fs) as usize;
        let data: Vec<f64> = (0..n)
            .map(|i| 0.6 * (2.0 * PI * 0.2 * i as f64 / fs).sin())
            .collect();
        let series = SampleSeries { fs, data };
        let rates = breathing_rate_series(&series, &BreathingConfig::default());
        assert!(!rates.is_empty());
        for (t, bpm) in rates.iter() {
            if t >= 15.0 {
                assert!((bpm - 12.0).abs() <= 2.0, "window at {}s: {} bpm", t, bpm);
            }
        }
    }

    #[test]
    fn breathing_degenerates_on_short_input() {
        let series = SampleSeries {
            fs: 700.0,
            data: vec![0.0; 10],
        };
        let rates = breathing_rate_series(&series, &BreathingConfig::default());
        assert_eq!(rates, RateSeries::degenerate());
    }

    #[test]
    fn trend_reports_block_means() {
        let series = SampleSeries {
            fs: 4.0,
            data: (0..40).map(|i| i as f64).collect(),
        };
        let trend = trend_series(&series, 5.0, BlockStamp::Start);
        assert_eq!(trend.times, vec![0.0, 5.0]);
        assert!((trend.values[0] - 9.5).abs() < 1e-9);
        assert!((trend.values[1] - 29.5).abs() < 1e-9);
    }
}
