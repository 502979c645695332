use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use soma_lib::preprocess::{default_fs, ChannelPayload, LABEL_FS};
use soma_lib::signal::SampleSeries;
use std::collections::BTreeMap;

/// Protocol condition encoded in the label channel.
pub fn label_name(id: u8) -> &'static str {
    match id {
        0 => "transient",
        1 => "baseline",
        2 => "stress",
        3 => "amusement",
        4 => "meditation",
        _ => "ignore",
    }
}

/// Display unit for a modality.
pub fn unit_label(modality: &str) -> &'static str {
    match modality.to_ascii_uppercase().as_str() {
        "EDA" => "µS",
        "TEMP" => "°C",
        "ACC" => "g",
        "ECG" => "mV",
        "LABEL" => "ID",
        _ => "a.u.",
    }
}

/// One subject's multi-channel session as decoded from disk: raw payloads
/// per sensor position plus the condition-label channel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub signal: BTreeMap<String, BTreeMap<String, ChannelPayload>>,
    #[serde(default)]
    pub label: Vec<f64>,
}

impl Recording {
    /// Case-insensitive channel lookup.
    pub fn channel(&self, sensor: &str, modality: &str) -> Result<&ChannelPayload, StoreError> {
        let missing = || StoreError::MissingChannel {
            sensor: sensor.to_string(),
            modality: modality.to_string(),
        };
        let block = self
            .signal
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(sensor))
            .map(|(_, block)| block)
            .ok_or_else(missing)?;
        block
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(modality))
            .map(|(_, payload)| payload)
            .ok_or_else(missing)
    }

    /// The 700 Hz condition-label channel.
    pub fn label_series(&self) -> Result<SampleSeries, StoreError> {
        if self.label.is_empty() {
            return Err(StoreError::MissingChannel {
                sensor: "label".to_string(),
                modality: "LABEL".to_string(),
            });
        }
        Ok(SampleSeries {
            fs: LABEL_FS,
            data: self.label.clone(),
        })
    }

    /// Per-channel sampling rates and shapes, plus the label map.
    pub fn inventory(&self) -> Inventory {
        let mut sensors = BTreeMap::new();
        for (sensor, block) in &self.signal {
            let mut channels = BTreeMap::new();
            for (modality, payload) in block {
                let matrix = payload.matrix();
                channels.insert(
                    modality.clone(),
                    ChannelInfo {
                        sampling_rate: payload
                            .sampling_rate()
                            .or_else(|| default_fs(modality))
                            .unwrap_or(1.0),
                        samples: matrix.rows(),
                        columns: matrix.columns(),
                    },
                );
            }
            sensors.insert(sensor.clone(), channels);
        }
        Inventory {
            subject: self.subject.clone(),
            sensors,
            label: LabelInfo {
                sampling_rate: LABEL_FS,
                samples: self.label.len(),
                conditions: (0..=7).map(|id| (id, label_name(id))).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Inventory {
    pub subject: Option<String>,
    pub sensors: BTreeMap<String, BTreeMap<String, ChannelInfo>>,
    pub label: LabelInfo,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChannelInfo {
    pub sampling_rate: f64,
    pub samples: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelInfo {
    pub sampling_rate: f64,
    pub samples: usize,
    pub conditions: BTreeMap<u8, &'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_recording() -> Recording {
        serde_json::from_str(
            r#"{
                "subject": "S2",
                "signal": {
                    "chest": {
                        "ECG": {"signal": [0.1, 0.2, 0.3], "sampling_rate": 700.0}
                    },
                    "wrist": {
                        "ACC": [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
                        "EDA": {"signal": [0.5, 0.6]}
                    }
                },
                "label": [0.0, 1.0, 1.0]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn channel_lookup_is_case_insensitive() {
        let rec = sample_recording();
        assert!(rec.channel("Chest", "ecg").is_ok());
        assert!(rec.channel("WRIST", "Eda").is_ok());
        let err = rec.channel("chest", "EMG").unwrap_err();
        assert!(matches!(err, StoreError::MissingChannel { .. }));
    }

    #[test]
    fn inventory_reports_rates_and_shapes() {
        let inv = sample_recording().inventory();
        let ecg = &inv.sensors["chest"]["ECG"];
        assert_eq!(ecg.sampling_rate, 700.0);
        assert_eq!(ecg.samples, 3);
        assert_eq!(ecg.columns, 1);
        let acc = &inv.sensors["wrist"]["ACC"];
        assert_eq!(acc.sampling_rate, 32.0);
        assert_eq!(acc.columns, 3);
        let eda = &inv.sensors["wrist"]["EDA"];
        assert_eq!(eda.sampling_rate, 4.0);
        assert_eq!(inv.label.conditions[&2], "stress");
    }

    #[test]
    fn label_series_has_fixed_rate() {
        let series = sample_recording().label_series().unwrap();
        assert_eq!(series.fs, 700.0);
        assert_eq!(series.data.len(), 3);
        assert!(Recording::default().label_series().is_err());
    }
}
