use sci_rs::signal::filter::{
    design::{butter_dyn, DigitalFilter, FilterBandType, FilterOutputType, SosFormatFilter},
    sosfiltfilt_dyn,
};

/// Pass band in Hz.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

/// Respiration extraction band.
pub const RESP_BAND: Band = Band {
    low: 0.1,
    high: 0.5,
};
/// Blood volume pulse band.
pub const BVP_BAND: Band = Band {
    low: 0.83,
    high: 3.0,
};
/// R-wave emphasis band.
pub const ECG_BAND: Band = Band {
    low: 5.0,
    high: 15.0,
};

/// Zero-phase Butterworth band-pass of the given order.
///
/// Returns `None` when the design is infeasible: band outside (0, Nyquist) or
/// input shorter than the forward-backward edge padding. Callers substitute
/// their own degenerate output in that case.
pub fn bandpass_zero_phase(data: &[f64], fs: f64, band: Band, order: usize) -> Option<Vec<f64>> {
    let nyquist = 0.5 * fs;
    if band.low <= 0.0 || band.high <= band.low || band.high >= nyquist {
        return None;
    }
    // The forward-backward pass mirrors 3 * (2 * sections + 1) samples at
    // each edge; shorter inputs cannot be padded.
    if data.len() <= 3 * (2 * order + 1) {
        return None;
    }
    let design = butter_dyn(
        order,
        vec![band.low, band.high],
        Some(FilterBandType::Bandpass),
        Some(false),
        Some(FilterOutputType::Sos),
        Some(fs),
    );
    let DigitalFilter::Sos(SosFormatFilter { sos }) = design else {
        return None;
    };
    Some(sosfiltfilt_dyn(data.iter(), &sos))
}
