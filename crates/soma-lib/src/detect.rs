use crate::signal::PeakSet;

/// Peak acceptance constraints.
///
/// Semantics follow the usual SciPy `find_peaks` behaviour: plateau maxima
/// collapse to their midpoint, the distance constraint keeps taller peaks
/// first, and prominence is measured against the higher of the two
/// surrounding bases.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeakCriteria {
    /// Minimum separation between accepted peaks, in samples.
    pub min_distance: f64,
    /// Absolute height floor.
    pub height: Option<f64>,
    /// Minimum topographic prominence.
    pub prominence: Option<f64>,
}

/// Locate peaks satisfying the criteria; indices are returned ascending.
pub fn find_peaks(data: &[f64], criteria: &PeakCriteria) -> PeakSet {
    let mut peaks = local_maxima(data);
    if let Some(floor) = criteria.height {
        peaks.retain(|&p| data[p] >= floor);
    }
    if criteria.min_distance > 1.0 {
        let distance = criteria.min_distance.ceil() as usize;
        let keep = select_by_distance(&peaks, data, distance);
        peaks = peaks
            .into_iter()
            .zip(keep)
            .filter_map(|(p, k)| k.then_some(p))
            .collect();
    }
    if let Some(min_prominence) = criteria.prominence {
        peaks.retain(|&p| prominence_at(data, p) >= min_prominence);
    }
    PeakSet::from_indices(peaks)
}

/// Strict local maxima; a flat-topped peak yields its plateau midpoint.
fn local_maxima(data: &[f64]) -> Vec<usize> {
    let mut out = Vec::new();
    if data.len() < 3 {
        return out;
    }
    let last = data.len() - 1;
    let mut i = 1;
    while i < last {
        if data[i - 1] < data[i] {
            let mut ahead = i + 1;
            while ahead < last && data[ahead] == data[i] {
                ahead += 1;
            }
            if data[ahead] < data[i] {
                out.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    out
}

/// Drop peaks closer than `distance` samples to a taller accepted peak.
fn select_by_distance(peaks: &[usize], data: &[f64], distance: usize) -> Vec<bool> {
    let n = peaks.len();
    let mut keep = vec![true; n];
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        data[peaks[a]]
            .partial_cmp(&data[peaks[b]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for &j in order.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 {
            k -= 1;
            if peaks[j] - peaks[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        let mut k = j + 1;
        while k < n && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }
    keep
}

/// Height of a peak above the higher of its two bases, searching outward
/// until a strictly higher sample or the signal edge.
fn prominence_at(data: &[f64], peak: usize) -> f64 {
    let reference = data[peak];
    let mut left_min = reference;
    let mut i = peak as isize;
    while i >= 0 && data[i as usize] <= reference {
        left_min = left_min.min(data[i as usize]);
        i -= 1;
    }
    let mut right_min = reference;
    let mut i = peak;
    while i < data.len() && data[i] <= reference {
        right_min = right_min.min(data[i]);
        i += 1;
    }
    reference - left_min.max(right_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_simple_maxima() {
        let data = vec![0.0, 1.0, 0.0, 2.0, 0.0];
        let peaks = find_peaks(&data, &PeakCriteria::default());
        assert_eq!(peaks.indices, vec![1, 3]);
    }

    #[test]
    fn plateau_collapses_to_midpoint() {
        let data = vec![0.0, 1.0, 1.0, 1.0, 0.0];
        let peaks = find_peaks(&data, &PeakCriteria::default());
        assert_eq!(peaks.indices, vec![2]);
    }

    #[test]
    fn height_floor_filters() {
        let data = vec![0.0, 0.5, 0.0, 2.0, 0.0, -1.0, -0.5, -1.0];
        let criteria = PeakCriteria {
            height: Some(0.0),
            ..PeakCriteria::default()
        };
        let peaks = find_peaks(&data, &criteria);
        assert_eq!(peaks.indices, vec![1, 3]);
    }

    #[test]
    fn distance_keeps_taller_peak() {
        let data = vec![0.0, 1.0, 0.5, 3.0, 0.0, 1.0, 0.0];
        let criteria = PeakCriteria {
            min_distance: 3.0,
            ..PeakCriteria::default()
        };
        let peaks = find_peaks(&data, &criteria);
        // the 3.0 at index 3 wins over its lower neighbour at index 1
        assert!(peaks.indices.contains(&3));
        assert!(!peaks.indices.contains(&1));
    }

    #[test]
    fn prominence_rejects_ripple_on_slope() {
        // small bump riding on the shoulder of a tall peak
        let data = vec![0.0, 0.2, 5.0, 4.0, 4.2, 4.0, 1.0, 0.0];
        let criteria = PeakCriteria {
            prominence: Some(1.0),
            ..PeakCriteria::default()
        };
        let peaks = find_peaks(&data, &criteria);
        assert_eq!(peaks.indices, vec![2]);
    }

    #[test]
    fn short_input_yields_no_peaks() {
        assert!(find_peaks(&[], &PeakCriteria::default()).is_empty());
        assert!(find_peaks(&[1.0, 2.0], &PeakCriteria::default()).is_empty());
    }

    #[test]
    fn indices_are_ascending() {
        let data: Vec<f64> = (0..200)
            .map(|i| (i as f64 * 0.7).sin() + 0.3 * (i as f64 * 2.1).cos())
            .collect();
        let criteria = PeakCriteria {
            min_distance: 4.0,
            ..PeakCriteria::default()
        };
        let peaks = find_peaks(&data, &criteria);
        assert!(peaks.indices.windows(2).all(|w| w[0] < w[1]));
    }
}
