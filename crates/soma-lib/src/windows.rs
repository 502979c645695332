use crate::signal::{PeakSet, RateSeries};

/// Where a fixed block's output sample lands on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStamp {
    Start,
    End,
}

/// Fixed-block discipline over a peak set: consecutive, non-overlapping
/// blocks of `window_sec`; a block emits a rate only when it holds at least
/// two peaks. Blocks below that occupancy are omitted entirely.
pub fn block_peak_rates(
    peaks: &PeakSet,
    fs: f64,
    n_samples: usize,
    window_sec: f64,
) -> RateSeries {
    let mut out = RateSeries::default();
    if fs <= 0.0 {
        return out;
    }
    let win = (window_sec * fs) as usize;
    if win == 0 || n_samples < win {
        return out;
    }
    let idx = &peaks.indices;
    let mut lo = 0usize;
    let mut start = 0usize;
    while start + win <= n_samples {
        let end = start + win;
        while lo < idx.len() && idx[lo] < start {
            lo += 1;
        }
        let mut hi = lo;
        while hi < idx.len() && idx[hi] < end {
            hi += 1;
        }
        let count = hi - lo;
        if count >= 2 {
            let duration = (idx[hi - 1] - idx[lo]) as f64 / fs;
            if duration > 0.0 {
                out.push(start as f64 / fs, (count as f64 - 1.0) / duration * 60.0);
            }
        }
        lo = hi;
        start = end;
    }
    out
}

/// Fixed-block means (movement, temperature, skin conductance and the
/// squashed stress index). Every complete block emits its mean regardless of
/// content; non-finite samples are ignored.
pub fn block_means(data: &[f64], fs: f64, window_sec: f64, stamp: BlockStamp) -> RateSeries {
    let mut out = RateSeries::default();
    if fs <= 0.0 {
        return out;
    }
    let win = ((window_sec * fs).round() as usize).max(1);
    let mut start = 0usize;
    while start + win <= data.len() {
        let t = match stamp {
            BlockStamp::Start => start as f64 / fs,
            BlockStamp::End => (start + win) as f64 / fs,
        };
        out.push(t, finite_mean(&data[start..start + win]));
        start += win;
    }
    out
}

/// Trailing-lookback discipline over a sample buffer: for each integer
/// second `t = step, 2·step, …`, look back `winsec` seconds (clipped at the
/// start) and convert the event count reported by `count_events` into a
/// per-minute rate. Inputs shorter than one step collapse to the
/// single-point degenerate series.
pub fn trailing_count_rates<F>(
    data: &[f64],
    fs: f64,
    winsec: usize,
    step_sec: usize,
    mut count_events: F,
) -> RateSeries
where
    F: FnMut(&[f64]) -> usize,
{
    if fs <= 0.0 {
        return RateSeries::degenerate();
    }
    let step = step_sec.max(1);
    if (data.len() as f64) < step as f64 * fs {
        return RateSeries::degenerate();
    }
    let win_samples = (winsec as f64 * fs) as usize;
    let total_sec = (data.len() as f64 / fs) as usize;
    let mut out = RateSeries::default();
    let mut t = step;
    while t <= total_sec {
        let end = ((t as f64) * fs) as usize;
        let end = end.min(data.len());
        let start = end.saturating_sub(win_samples);
        if end > start {
            let count = count_events(&data[start..end]);
            let duration = (end - start) as f64 / fs;
            out.push(t as f64, count as f64 / duration * 60.0);
        }
        t += step;
    }
    if out.is_empty() {
        RateSeries::degenerate()
    } else {
        out
    }
}

/// Trailing-lookback means over sparse timestamped samples (pulse transit
/// times). A window without samples carries the previous window's value
/// forward (0.0 before any value exists) instead of being omitted.
pub fn trailing_means(times: &[f64], values: &[f64], winsec: f64, step_sec: usize) -> RateSeries {
    debug_assert_eq!(times.len(), values.len());
    let mut out = RateSeries::default();
    if times.is_empty() {
        return out;
    }
    let step = step_sec.max(1);
    let total = times.iter().copied().fold(f64::MIN, f64::max) as usize;
    let mut t = step;
    while t <= total {
        let end = t as f64;
        let window_start = (end - winsec).max(0.0);
        let mut sum = 0.0;
        let mut n = 0usize;
        for (&ts, &v) in times.iter().zip(values) {
            if ts >= window_start && ts < end {
                sum += v;
                n += 1;
            }
        }
        let value = if n > 0 {
            sum / n as f64
        } else {
            out.last_value().unwrap_or(0.0)
        };
        out.push(end, value);
        t += step;
    }
    out
}

fn finite_mean(window: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for &v in window {
        if v.is_finite() {
            sum += v;
            n += 1;
        }
    }
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
