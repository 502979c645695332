//! Operation layer over the recording store and the signal core: one
//! function per client-facing computation, all returning the uniform series
//! envelope or the nested health report.

use serde::Deserialize;
use soma_lib::health::{
    health_report, HealthReport, PersonalProfile, PhysiologicalMetrics, QuestionnaireScores,
    SeriesStats,
};
use soma_lib::metrics::ptt::{ptt_series, PttConfig};
use soma_lib::metrics::rates::{
    breathing_rate_series, heart_rate_series, trend_series, BreathingConfig, HeartRateConfig,
};
use soma_lib::metrics::stress::{stress_index_series, StressConfig, StressInputs};
use soma_lib::preprocess::{
    resolve_channel, Axis, PreprocessConfig, PreprocessError, SeriesOptions,
};
use soma_lib::signal::{SampleSeries, SeriesEnvelope};
use soma_lib::windows::BlockStamp;
use soma_store::{Inventory, RecordingStore, StoreError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Block length shared by the fixed-window trend operations, in seconds.
const TREND_WINDOW_SEC: f64 = 5.0;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unknown channel {sensor}/{modality}")]
    MissingChannel { sensor: String, modality: String },
    #[error("no recording for subject {0}")]
    SourceUnavailable(String),
    #[error("computation failed: {0}")]
    Fault(String),
}

impl From<StoreError> for AnalysisError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SourceUnavailable { subject } => AnalysisError::SourceUnavailable(subject),
            StoreError::MissingChannel { sensor, modality } => {
                AnalysisError::MissingChannel { sensor, modality }
            }
            other => AnalysisError::Fault(other.to_string()),
        }
    }
}

/// Tunable calibration and model settings, loadable from TOML.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub preprocess: PreprocessConfig,
    pub stress: StressConfig,
}

/// Read an [`AnalyzerConfig`] from a TOML file.
pub fn read_config(path: &Path) -> anyhow::Result<AnalyzerConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config {}: {e}", path.display()))?;
    let config = toml::from_str(&text)
        .map_err(|e| anyhow::anyhow!("parsing config {}: {e}", path.display()))?;
    Ok(config)
}

/// Raw-series request parameters.
#[derive(Debug, Clone, Copy)]
pub struct ChannelQuery<'a> {
    pub sensor: &'a str,
    pub modality: &'a str,
    pub axis: Option<Axis>,
    pub stride: usize,
    pub limit: Option<usize>,
}

pub struct Analyzer {
    store: RecordingStore,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, AnalyzerConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: AnalyzerConfig) -> Self {
        Self {
            store: RecordingStore::new(root),
            config,
        }
    }

    pub fn store(&self) -> &RecordingStore {
        &self.store
    }

    /// Channel inventory for one subject: sensors, rates, shapes, label map.
    pub fn inventory(&self, subject: &str) -> Result<Inventory, AnalysisError> {
        Ok(self.store.get(subject)?.inventory())
    }

    /// Preprocessed raw channel with axis/stride/limit controls.
    pub fn raw_series(
        &self,
        subject: &str,
        query: &ChannelQuery<'_>,
    ) -> Result<SeriesEnvelope, AnalysisError> {
        let recording = self.store.get(subject)?;
        if query.sensor.eq_ignore_ascii_case("label")
            || query.modality.eq_ignore_ascii_case("LABEL")
        {
            let series = recording.label_series()?;
            return Ok(SeriesEnvelope::from_samples("Time (s)", "Condition ID", &series));
        }
        let series = self.resolve(
            &recording,
            query.sensor,
            query.modality,
            &SeriesOptions {
                axis: query.axis,
                stride: query.stride,
                limit: query.limit,
            },
        )?;
        let modality = query.modality.to_ascii_uppercase();
        let suffix = if modality == "ACC" {
            query.axis.unwrap_or(Axis::Magnitude).label_suffix()
        } else {
            ""
        };
        let unit = soma_store::unit_label(&modality);
        let y_label = format!("{modality}{suffix} [{unit}]");
        Ok(SeriesEnvelope::from_samples("Time (s)", y_label, &series))
    }

    /// Beats per minute from the cardiac channel over 5 s blocks.
    pub fn compute_heart_rate(
        &self,
        subject: &str,
        sensor: &str,
        modality: &str,
    ) -> Result<SeriesEnvelope, AnalysisError> {
        let series = self.channel_series(subject, sensor, modality)?;
        let rates = heart_rate_series(&series, &HeartRateConfig::default());
        Ok(SeriesEnvelope::from_rates("Time (s)", "Heartrate (BPM)", rates))
    }

    /// Breaths per minute from the chest respiration channel.
    pub fn compute_breathing_rate(
        &self,
        subject: &str,
        winsec: usize,
        step_sec: usize,
    ) -> Result<SeriesEnvelope, AnalysisError> {
        let series = self.channel_series(subject, "chest", "RESP")?;
        let cfg = BreathingConfig {
            winsec,
            step_sec,
            ..BreathingConfig::default()
        };
        let rates = breathing_rate_series(&series, &cfg);
        Ok(SeriesEnvelope::from_rates(
            "Time (s)",
            "Breathing rate (BPM)",
            rates,
        ))
    }

    /// Pulse transit time between chest ECG and wrist BVP.
    pub fn compute_ptt(
        &self,
        subject: &str,
        winsec: f64,
        step_sec: usize,
    ) -> Result<SeriesEnvelope, AnalysisError> {
        let ecg = self.channel_series(subject, "chest", "ECG")?;
        let bvp = self.channel_series(subject, "wrist", "BVP")?;
        let cfg = PttConfig {
            winsec,
            step_sec,
            ..PttConfig::default()
        };
        let rates = ptt_series(&ecg, &bvp, &cfg);
        Ok(SeriesEnvelope::from_rates("Time (s)", "PTT (ms)", rates))
    }

    /// Composite stress index from wrist EDA/TEMP and the decimated chest
    /// cardiac channel, using the configured model.
    pub fn compute_stress_index(&self, subject: &str) -> Result<SeriesEnvelope, AnalysisError> {
        let eda = self.channel_series(subject, "wrist", "EDA")?;
        let temp = self.channel_series(subject, "wrist", "TEMP")?;
        let ecg = self.channel_series(subject, "chest", "ECG")?;
        let factor = ((ecg.fs / eda.fs) as usize).max(1);
        let cardiac: Vec<f64> = ecg.data.iter().copied().step_by(factor).collect();
        let inputs = StressInputs {
            eda: &eda.data,
            cardiac: &cardiac,
            temperature: &temp.data,
            fs: eda.fs,
        };
        let rates = stress_index_series(&inputs, &self.config.stress);
        Ok(SeriesEnvelope::from_rates(
            "Time (s)",
            "Stress Level (0-100)",
            rates,
        ))
    }

    /// Mean accelerometer magnitude per 5 s block.
    pub fn compute_movement_intensity(
        &self,
        subject: &str,
        sensor: &str,
    ) -> Result<SeriesEnvelope, AnalysisError> {
        let series = self.channel_series(subject, sensor, "ACC")?;
        let trend = trend_series(&series, TREND_WINDOW_SEC, BlockStamp::End);
        Ok(SeriesEnvelope::from_rates(
            "Time (s)",
            "Movement intensity (g)",
            trend,
        ))
    }

    /// Mean skin conductance per 5 s block.
    pub fn compute_skin_conductance_trend(
        &self,
        subject: &str,
    ) -> Result<SeriesEnvelope, AnalysisError> {
        let series = self.channel_series(subject, "wrist", "EDA")?;
        let trend = trend_series(&series, TREND_WINDOW_SEC, BlockStamp::Start);
        Ok(SeriesEnvelope::from_rates("Time (s)", "Skin Conductance", trend))
    }

    /// Mean skin temperature per 5 s block.
    pub fn compute_temperature_trend(
        &self,
        subject: &str,
    ) -> Result<SeriesEnvelope, AnalysisError> {
        let series = self.channel_series(subject, "wrist", "TEMP")?;
        let trend = trend_series(&series, TREND_WINDOW_SEC, BlockStamp::Start);
        Ok(SeriesEnvelope::from_rates("Time (s)", "Temperature (°C)", trend))
    }

    /// Full multi-source report. A missing subject recording is an error;
    /// individual modality failures degrade to absent metrics.
    pub fn compute_health_summary(&self, subject: &str) -> Result<HealthReport, AnalysisError> {
        self.store.get(subject)?;

        let phys = PhysiologicalMetrics {
            heart_rate: self.metric_stats("heart_rate", || {
                self.compute_heart_rate(subject, "chest", "ECG")
            }),
            breathing_rate: self.metric_stats("breathing_rate", || {
                self.compute_breathing_rate(subject, 5, 5)
            }),
            stress_level: self.metric_stats("stress_level", || {
                self.compute_stress_index(subject)
            }),
            temperature: self.metric_stats("temperature", || {
                self.compute_temperature_trend(subject)
            }),
            pulse_transit_time: self.metric_stats("pulse_transit_time", || {
                self.compute_ptt(subject, 5.0, 5)
            }),
            skin_conductance: self.metric_stats("skin_conductance", || {
                self.compute_skin_conductance_trend(subject)
            }),
        };

        let quest_data =
            soma_store::questionnaire::load_questionnaire(&self.store.questionnaire_path(subject));
        let quest: QuestionnaireScores =
            soma_store::questionnaire::questionnaire_scores(&quest_data);
        let profile: PersonalProfile =
            soma_store::subject::load_subject_info(&self.store.readme_path(subject));

        Ok(health_report(&phys, &quest, &profile))
    }

    fn metric_stats(
        &self,
        name: &str,
        compute: impl FnOnce() -> Result<SeriesEnvelope, AnalysisError>,
    ) -> Option<SeriesStats> {
        match compute() {
            Ok(envelope) => SeriesStats::from_values(&envelope.y_values),
            Err(err) => {
                log::warn!("{name} unavailable for summary: {err}");
                None
            }
        }
    }

    fn channel_series(
        &self,
        subject: &str,
        sensor: &str,
        modality: &str,
    ) -> Result<SampleSeries, AnalysisError> {
        let recording = self.store.get(subject)?;
        self.resolve(&recording, sensor, modality, &SeriesOptions::default())
    }

    fn resolve(
        &self,
        recording: &soma_store::Recording,
        sensor: &str,
        modality: &str,
        opts: &SeriesOptions,
    ) -> Result<SampleSeries, AnalysisError> {
        let payload = recording.channel(sensor, modality)?;
        resolve_channel(payload, sensor, modality, opts, &self.config.preprocess).map_err(|err| {
            match err {
                PreprocessError::AxisUnavailable(axis) => AnalysisError::MissingChannel {
                    sensor: sensor.to_string(),
                    modality: format!("{modality}:{axis}"),
                },
                PreprocessError::RaggedMatrix { .. } => AnalysisError::Fault(err.to_string()),
            }
        })
    }
}
