use anyhow::{Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::json;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

/// Parameters of the deterministic synthetic subject generator.
///
/// Used by integration tests and the `simulate` CLI command to produce a
/// complete subject directory in store format without real study data.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub subject: String,
    pub duration_sec: f64,
    pub heart_bpm: f64,
    pub breath_bpm: f64,
    /// Electrical-to-pulse delay reproduced between the ECG and BVP channels.
    pub ptt_ms: f64,
    pub seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            subject: "S1".to_string(),
            duration_sec: 60.0,
            heart_bpm: 75.0,
            breath_bpm: 12.0,
            ptt_ms: 300.0,
            seed: 7,
        }
    }
}

/// Build the recording payload: chest ECG/RESP at 700 Hz, wrist BVP at
/// 64 Hz, EDA/TEMP at 4 Hz, 3-axis wrist ACC at 32 Hz (raw counts) and the
/// 700 Hz label channel.
pub fn synth_recording(cfg: &SynthConfig) -> serde_json::Value {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let beat_period = 60.0 / cfg.heart_bpm.max(1.0);
    let breath_hz = cfg.breath_bpm.max(1.0) / 60.0;
    let ptt_sec = cfg.ptt_ms / 1000.0;

    let ecg = sampled(700.0, cfg.duration_sec, |t| {
        0.03 * (2.0 * PI * t).sin() + pulse_train(t, 0.5, beat_period, 0.02, 1.2)
    });
    let ecg = with_noise(ecg, 0.005, &mut rng);

    let resp = sampled(700.0, cfg.duration_sec, |t| {
        0.6 * (2.0 * PI * breath_hz * t).sin()
    });
    let resp = with_noise(resp, 0.005, &mut rng);

    let bvp = sampled(64.0, cfg.duration_sec, |t| {
        pulse_train(t, 0.5 + ptt_sec, beat_period, 0.06, 1.0)
    });
    let bvp = with_noise(bvp, 0.01, &mut rng);

    let eda = sampled(4.0, cfg.duration_sec, |t| {
        2.0 + 0.4 * (2.0 * PI * 0.01 * t).sin()
    });
    let eda = with_noise(eda, 0.02, &mut rng);

    let temp = sampled(4.0, cfg.duration_sec, |t| {
        33.5 + 0.3 * (2.0 * PI * 0.004 * t).sin()
    });
    let temp = with_noise(temp, 0.01, &mut rng);

    // wrist counts: gravity split across axes plus a slow wobble
    let n_acc = (32.0 * cfg.duration_sec) as usize;
    let acc: Vec<[f64; 3]> = (0..n_acc)
        .map(|i| {
            let t = i as f64 / 32.0;
            let wobble = 0.05 * (2.0 * PI * 0.2 * t).sin();
            [
                64.0 * (0.60 + wobble) + rng.gen_range(-1.5..1.5),
                64.0 * 0.30 + rng.gen_range(-1.5..1.5),
                64.0 * 0.74 + rng.gen_range(-1.5..1.5),
            ]
        })
        .collect();

    let n_label = (700.0 * cfg.duration_sec) as usize;
    let label: Vec<f64> = (0..n_label)
        .map(|i| if i < n_label / 2 { 1.0 } else { 2.0 })
        .collect();

    json!({
        "subject": cfg.subject,
        "signal": {
            "chest": {
                "ECG": {"signal": ecg, "sampling_rate": 700.0},
                "RESP": {"signal": resp, "sampling_rate": 700.0},
            },
            "wrist": {
                "BVP": {"signal": bvp, "sampling_rate": 64.0},
                "EDA": {"signal": eda, "sampling_rate": 4.0},
                "TEMP": {"signal": temp, "sampling_rate": 4.0},
                "ACC": acc,
            },
        },
        "label": label,
    })
}

/// Write a full subject directory (recording, questionnaire, readme) under
/// `root` and return its path.
pub fn write_subject(root: &Path, cfg: &SynthConfig) -> Result<PathBuf> {
    let dir = root.join(&cfg.subject);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating subject dir {}", dir.display()))?;

    let recording = synth_recording(cfg);
    let path = dir.join(format!("{}.json", cfg.subject));
    std::fs::write(&path, serde_json::to_string(&recording)?)
        .with_context(|| format!("writing recording {}", path.display()))?;

    std::fs::write(
        dir.join(format!("{}_quest.csv", cfg.subject)),
        questionnaire_text(),
    )?;
    std::fs::write(
        dir.join(format!("{}_readme.txt", cfg.subject)),
        readme_text(),
    )?;
    Ok(dir)
}

fn sampled(fs: f64, duration_sec: f64, f: impl Fn(f64) -> f64) -> Vec<f64> {
    let n = (fs * duration_sec) as usize;
    (0..n).map(|i| f(i as f64 / fs)).collect()
}

fn with_noise(mut data: Vec<f64>, amplitude: f64, rng: &mut StdRng) -> Vec<f64> {
    for v in &mut data {
        *v += rng.gen_range(-amplitude..amplitude);
    }
    data
}

/// Gaussian bump train starting at `offset` with the given period.
fn pulse_train(t: f64, offset: f64, period: f64, width: f64, amplitude: f64) -> f64 {
    if t + width * 4.0 < offset {
        return 0.0;
    }
    let k = ((t - offset) / period).round();
    let nearest = offset + k.max(0.0) * period;
    amplitude * (-0.5 * ((t - nearest) / width).powi(2)).exp()
}

fn questionnaire_text() -> &'static str {
    "\
# ORDER;Base;TSST;Medi 1;Fun;Medi 2
# START;0;12;24;36;48
# END;11;23;35;47;59
# PANAS;2;3;2;3;2
# PANAS;3;3;2;2;3
# STAI;2;2;3;2
# STAI;2;3;2;2
# DIM;6;4
# DIM;5;5
# SSSQ;2;3;2
"
}

fn readme_text() -> &'static str {
    "\
Personal information

Age: 28
Height (cm): 178
Weight (kg): 72
Gender: male
Dominant hand: right

Additional questions

Did you drink coffee today? YES
Did you drink coffee within the last hour? NO
Did you do any sports today? NO
Are you a smoker? NO
Did you smoke within the last hour? NO
Do you feel ill today? NO

### Additional notes ###
Synthetic subject generated for pipeline tests.
"
}
