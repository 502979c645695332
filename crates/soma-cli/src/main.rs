use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use soma_analysis::{read_config, Analyzer, AnalyzerConfig, ChannelQuery};
use soma_lib::preprocess::Axis;
use soma_lib::signal::SeriesEnvelope;
use soma_store::synth::{write_subject, SynthConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "soma",
    version,
    about = "SOMA: wearable biosignal analysis tools"
)]
struct Cli {
    /// Root directory holding one folder per subject
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,
    /// Optional TOML file overriding calibration and stress-model settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a subject's sensors, modalities, sampling rates and label map
    Info {
        #[arg(long, default_value = "S2")]
        subject: String,
    },
    /// Preprocessed raw channel samples
    Series {
        #[arg(long, default_value = "S2")]
        subject: String,
        #[arg(long, default_value = "wrist")]
        sensor: String,
        #[arg(long, default_value = "EDA")]
        modality: String,
        /// For ACC: x | y | z | mag
        #[arg(long)]
        axis: Option<String>,
        #[arg(long, default_value_t = 10)]
        stride: usize,
        #[arg(long, default_value_t = 5000)]
        limit: usize,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Heart rate (BPM) over fixed 5 s blocks
    HeartRate {
        #[arg(long, default_value = "S2")]
        subject: String,
        #[arg(long, default_value = "chest")]
        sensor: String,
        #[arg(long, default_value = "ECG")]
        modality: String,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Breathing rate (BPM) over trailing-lookback windows
    BreathingRate {
        #[arg(long, default_value = "S2")]
        subject: String,
        #[arg(long, default_value_t = 15)]
        winsec: usize,
        #[arg(long, default_value_t = 5)]
        step_sec: usize,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Pulse transit time (ms) between chest ECG and wrist BVP
    Ptt {
        #[arg(long, default_value = "S2")]
        subject: String,
        #[arg(long, default_value_t = 5.0)]
        winsec: f64,
        #[arg(long, default_value_t = 5)]
        step_sec: usize,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Composite stress index (0-100)
    StressIndex {
        #[arg(long, default_value = "S2")]
        subject: String,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Movement intensity (g) per 5 s block
    Movement {
        #[arg(long, default_value = "S2")]
        subject: String,
        #[arg(long, default_value = "wrist")]
        sensor: String,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Skin conductance trend per 5 s block
    SkinConductance {
        #[arg(long, default_value = "S2")]
        subject: String,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Skin temperature trend per 5 s block
    Temperature {
        #[arg(long, default_value = "S2")]
        subject: String,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Aggregate health report from signals, questionnaire and subject info
    HealthSummary {
        #[arg(long, default_value = "S2")]
        subject: String,
    },
    /// Write a synthetic subject directory in store format
    Simulate {
        #[arg(long, default_value = "S1")]
        subject: String,
        #[arg(long, default_value_t = 60.0)]
        duration: f64,
        #[arg(long, default_value_t = 75.0)]
        heart_bpm: f64,
        #[arg(long, default_value_t = 12.0)]
        breath_bpm: f64,
        #[arg(long, default_value_t = 300.0)]
        ptt_ms: f64,
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => read_config(path)?,
        None => AnalyzerConfig::default(),
    };
    let analyzer = Analyzer::with_config(&cli.data_dir, config);

    match cli.command {
        Commands::Info { subject } => {
            let inventory = analyzer.inventory(&subject)?;
            println!("{}", serde_json::to_string(&inventory)?);
        }
        Commands::Series {
            subject,
            sensor,
            modality,
            axis,
            stride,
            limit,
            csv,
        } => {
            let axis = match axis.as_deref() {
                Some(name) => {
                    Some(Axis::parse(name).ok_or_else(|| anyhow!("unknown axis '{name}'"))?)
                }
                None => None,
            };
            let envelope = analyzer.raw_series(
                &subject,
                &ChannelQuery {
                    sensor: &sensor,
                    modality: &modality,
                    axis,
                    stride,
                    limit: Some(limit),
                },
            )?;
            emit(&envelope, csv.as_deref())?;
        }
        Commands::HeartRate {
            subject,
            sensor,
            modality,
            csv,
        } => {
            let envelope = analyzer.compute_heart_rate(&subject, &sensor, &modality)?;
            emit(&envelope, csv.as_deref())?;
        }
        Commands::BreathingRate {
            subject,
            winsec,
            step_sec,
            csv,
        } => {
            let envelope = analyzer.compute_breathing_rate(&subject, winsec, step_sec)?;
            emit(&envelope, csv.as_deref())?;
        }
        Commands::Ptt {
            subject,
            winsec,
            step_sec,
            csv,
        } => {
            let envelope = analyzer.compute_ptt(&subject, winsec, step_sec)?;
            emit(&envelope, csv.as_deref())?;
        }
        Commands::StressIndex { subject, csv } => {
            let envelope = analyzer.compute_stress_index(&subject)?;
            emit(&envelope, csv.as_deref())?;
        }
        Commands::Movement {
            subject,
            sensor,
            csv,
        } => {
            let envelope = analyzer.compute_movement_intensity(&subject, &sensor)?;
            emit(&envelope, csv.as_deref())?;
        }
        Commands::SkinConductance { subject, csv } => {
            let envelope = analyzer.compute_skin_conductance_trend(&subject)?;
            emit(&envelope, csv.as_deref())?;
        }
        Commands::Temperature { subject, csv } => {
            let envelope = analyzer.compute_temperature_trend(&subject)?;
            emit(&envelope, csv.as_deref())?;
        }
        Commands::HealthSummary { subject } => {
            let report = analyzer.compute_health_summary(&subject)?;
            println!("{}", serde_json::to_string(&report)?);
        }
        Commands::Simulate {
            subject,
            duration,
            heart_bpm,
            breath_bpm,
            ptt_ms,
            seed,
        } => {
            let cfg = SynthConfig {
                subject,
                duration_sec: duration,
                heart_bpm,
                breath_bpm,
                ptt_ms,
                seed,
            };
            let dir = write_subject(&cli.data_dir, &cfg)?;
            println!("{}", serde_json::json!({ "written": dir }));
        }
    }
    Ok(())
}

fn emit(envelope: &SeriesEnvelope, csv_path: Option<&Path>) -> Result<()> {
    if let Some(path) = csv_path {
        write_csv(path, envelope)?;
    }
    println!("{}", serde_json::to_string(envelope)?);
    Ok(())
}

fn write_csv(path: &Path, envelope: &SeriesEnvelope) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["time_s", "value"])?;
    for (x, y) in envelope.x_values.iter().zip(&envelope.y_values) {
        writer.write_record([x.to_string(), y.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
