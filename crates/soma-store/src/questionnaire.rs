use serde::Serialize;
use soma_lib::health::QuestionnaireScores;
use std::path::Path;

/// Raw per-phase questionnaire rows plus the session timing header, as
/// parsed from the semicolon-delimited `*_quest.csv` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuestionnaireData {
    pub panas: Vec<Vec<i32>>,
    pub stai: Vec<Vec<i32>>,
    pub dim: Vec<Vec<i32>>,
    pub sssq: Vec<Vec<i32>>,
    pub start_times: Vec<f64>,
    pub end_times: Vec<f64>,
    pub phase_order: Vec<String>,
}

impl QuestionnaireData {
    pub fn is_empty(&self) -> bool {
        self.panas.is_empty() && self.stai.is_empty() && self.dim.is_empty() && self.sssq.is_empty()
    }
}

/// Parse the `#`-tagged questionnaire rows. Unknown rows are skipped.
pub fn parse_questionnaire(text: &str) -> QuestionnaireData {
    let mut data = QuestionnaireData::default();
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("# START") {
            data.start_times = number_fields(line);
        } else if line.starts_with("# END") {
            data.end_times = number_fields(line);
        } else if line.starts_with("# ORDER") {
            data.phase_order = text_fields(line);
        } else if line.starts_with("# PANAS") {
            push_scores(&mut data.panas, line);
        } else if line.starts_with("# STAI") {
            push_scores(&mut data.stai, line);
        } else if line.starts_with("# DIM") {
            push_scores(&mut data.dim, line);
        } else if line.starts_with("# SSSQ") {
            push_scores(&mut data.sssq, line);
        }
    }
    data
}

/// Load and parse a questionnaire file; a missing file yields the empty
/// structure, never an error.
pub fn load_questionnaire(path: &Path) -> QuestionnaireData {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_questionnaire(&text),
        Err(err) => {
            log::debug!("no questionnaire at {}: {}", path.display(), err);
            QuestionnaireData::default()
        }
    }
}

/// Reduce raw rows to the aggregate scores consumed by the health
/// aggregator. Each instrument is the mean of its per-phase row means.
pub fn questionnaire_scores(data: &QuestionnaireData) -> QuestionnaireScores {
    let mut scores = QuestionnaireScores::default();

    let panas = row_means(&data.panas);
    if !panas.is_empty() {
        scores.panas_mean = Some(mean(&panas));
        scores.panas_std = Some(if panas.len() > 1 {
            population_std(&panas)
        } else {
            0.0
        });
    }

    let stai = row_means(&data.stai);
    if !stai.is_empty() {
        scores.stai_mean = Some(mean(&stai));
        scores.stai_max = Some(stai.iter().copied().fold(f64::MIN, f64::max));
    }

    if data.dim.first().is_some_and(|row| row.len() >= 2) {
        let valence: Vec<f64> = data
            .dim
            .iter()
            .filter_map(|row| row.first().map(|&v| v as f64))
            .collect();
        let arousal: Vec<f64> = data
            .dim
            .iter()
            .filter_map(|row| row.get(1).map(|&v| v as f64))
            .collect();
        if !valence.is_empty() {
            scores.dim_valence_mean = Some(mean(&valence));
        }
        if !arousal.is_empty() {
            scores.dim_arousal_mean = Some(mean(&arousal));
        }
    }

    let sssq = row_means(&data.sssq);
    if !sssq.is_empty() {
        scores.sssq_mean = Some(mean(&sssq));
    }

    scores
}

fn fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(';').skip(1).map(str::trim)
}

fn number_fields(line: &str) -> Vec<f64> {
    fields(line).filter_map(|v| v.parse().ok()).collect()
}

fn text_fields(line: &str) -> Vec<String> {
    fields(line)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn push_scores(rows: &mut Vec<Vec<i32>>, line: &str) {
    let row: Vec<i32> = fields(line)
        .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|v| v.parse().ok())
        .collect();
    rows.push(row);
}

fn row_means(rows: &[Vec<i32>]) -> Vec<f64> {
    rows.iter()
        .filter(|row| !row.is_empty())
        .map(|row| row.iter().sum::<i32>() as f64 / row.len() as f64)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}
