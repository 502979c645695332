use crate::detect::{find_peaks, PeakCriteria};
use crate::filters::{bandpass_zero_phase, Band, BVP_BAND, ECG_BAND};
use crate::signal::{RateSeries, SampleSeries};
use crate::windows::trailing_means;

/// Pulse-transit-time pipeline parameters.
#[derive(Debug, Clone, Copy)]
pub struct PttConfig {
    /// Trailing aggregation window in seconds.
    pub winsec: f64,
    /// Step between window ends in seconds.
    pub step_sec: usize,
    /// R-wave emphasis band for the electrical channel.
    pub ecg_band: Band,
    /// Pulse band for the optical channel.
    pub bvp_band: Band,
    /// Minimum peak distance on both channels, in seconds.
    pub min_distance_sec: f64,
    /// Plausibility bounds on a single transit time, in milliseconds.
    pub min_ptt_ms: f64,
    pub max_ptt_ms: f64,
}

impl Default for PttConfig {
    fn default() -> Self {
        Self {
            winsec: 5.0,
            step_sec: 5,
            ecg_band: ECG_BAND,
            bvp_band: BVP_BAND,
            min_distance_sec: 0.35,
            min_ptt_ms: 50.0,
            max_ptt_ms: 500.0,
        }
    }
}

/// One plausible electrical-to-pulse transit sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitSample {
    /// Timestamp of the electrical event, in seconds.
    pub time: f64,
    /// Transit time to the matched pulse arrival, in milliseconds.
    pub ptt_ms: f64,
}

/// Pulse transit time over trailing windows. Each channel is band-filtered
/// and peak-picked at its own rate; peak times are then merged with a
/// forward-only cursor. Missing peaks on either channel, or no plausible
/// candidate at all, collapse to the degenerate `{0.0: 0.0}` series.
pub fn ptt_series(ecg: &SampleSeries, bvp: &SampleSeries, cfg: &PttConfig) -> RateSeries {
    let ecg_times = banded_peak_times(ecg, cfg.ecg_band, cfg.min_distance_sec);
    let bvp_times = banded_peak_times(bvp, cfg.bvp_band, cfg.min_distance_sec);
    if ecg_times.is_empty() || bvp_times.is_empty() {
        return RateSeries::degenerate();
    }
    let samples = align_pulse_events(&ecg_times, &bvp_times, cfg);
    if samples.is_empty() {
        return RateSeries::degenerate();
    }
    let times: Vec<f64> = samples.iter().map(|s| s.time).collect();
    let values: Vec<f64> = samples.iter().map(|s| s.ptt_ms).collect();
    trailing_means(&times, &values, cfg.winsec, cfg.step_sec)
}

/// Match each electrical peak to the first strictly later pulse peak.
///
/// The cursor into `bvp_times` only ever advances, so the matched pulse index
/// is non-decreasing across electrical peaks; implausible candidates are
/// dropped without rewinding.
pub fn align_pulse_events(
    ecg_times: &[f64],
    bvp_times: &[f64],
    cfg: &PttConfig,
) -> Vec<TransitSample> {
    let mut out = Vec::new();
    let mut cursor = 0usize;
    for &t_ecg in ecg_times {
        while cursor < bvp_times.len() && bvp_times[cursor] <= t_ecg {
            cursor += 1;
        }
        if cursor >= bvp_times.len() {
            break;
        }
        let ptt_ms = (bvp_times[cursor] - t_ecg) * 1000.0;
        if ptt_ms > cfg.min_ptt_ms && ptt_ms < cfg.max_ptt_ms {
            out.push(TransitSample { time: t_ecg, ptt_ms });
        }
    }
    out
}

fn banded_peak_times(series: &SampleSeries, band: Band, min_distance_sec: f64) -> Vec<f64> {
    let Some(filtered) = bandpass_zero_phase(&series.data, series.fs, band, 2) else {
        return Vec::new();
    };
    let criteria = PeakCriteria {
        min_distance: min_distance_sec * series.fs,
        height: Some(0.0),
        prominence: None,
    };
    find_peaks(&filtered, &criteria).times(series.fs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn second_marks(count: usize, offset: f64) -> Vec<f64> {
        (0..count).map(|i| i as f64 + offset).collect()
    }

    #[test]
    fn aligns_to_next_pulse_peak() {
        let cfg = PttConfig::default();
        let ecg = second_marks(30, 0.0);
        let bvp = second_marks(30, 0.3);
        let samples = align_pulse_events(&ecg, &bvp, &cfg);
        assert_eq!(samples.len(), 30);
        for s in &samples {
            assert!((s.ptt_ms - 300.0).abs() < 1e-9);
        }
    }

    #[test]
    fn matched_pulse_index_never_rewinds() {
        let cfg = PttConfig::default();
        let ecg = vec![0.0, 0.9, 1.8, 2.7, 3.6];
        let bvp = vec![0.3, 1.1, 2.0, 2.9, 3.9];
        let samples = align_pulse_events(&ecg, &bvp, &cfg);
        let mut last = 0usize;
        for s in &samples {
            let idx = bvp.iter().position(|&b| b > s.time).unwrap();
            assert!(idx >= last);
            last = idx;
        }
    }

    #[test]
    fn implausible_candidates_are_dropped_silently() {
        let cfg = PttConfig::default();
        // 20 ms and 800 ms candidates straddle the plausibility gate
        let ecg = vec![1.0, 2.0, 3.0];
        let bvp = vec![1.02, 2.8, 3.3];
        let samples = align_pulse_events(&ecg, &bvp, &cfg);
        assert_eq!(samples.len(), 1);
        assert!((samples[0].ptt_ms - 300.0).abs() < 1e-9);
    }

    #[test]
    fn windowed_series_averages_transits() {
        let cfg = PttConfig::default();
        let ecg = second_marks(12, 0.0);
        let bvp = second_marks(12, 0.3);
        let samples = align_pulse_events(&ecg, &bvp, &cfg);
        let times: Vec<f64> = samples.iter().map(|s| s.time).collect();
        let values: Vec<f64> = samples.iter().map(|s| s.ptt_ms).collect();
        let series = trailing_means(&times, &values, cfg.winsec, cfg.step_sec);
        assert_eq!(series.times, vec![5.0, 10.0]);
        for (_, v) in series.iter() {
            assert!((v - 300.0).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_channel_collapses_to_degenerate() {
        let ecg = SampleSeries {
            fs: 700.0,
            data: vec![0.0; 10],
        };
        let bvp = SampleSeries {
            fs: 64.0,
            data: vec![0.0; 10],
        };
        let series = ptt_series(&ecg, &bvp, &PttConfig::default());
        assert_eq!(series, RateSeries::degenerate());
    }
}
