use serde::{Deserialize, Serialize};

/// Summary statistics of one computed modality series (population std).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeriesStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesStats {
    /// `None` for an empty series: the modality is treated as unavailable
    /// rather than contributing zeros.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { mean, std, min, max })
    }
}

/// Per-modality summaries feeding the aggregate scores. Absent entries
/// simply do not contribute.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PhysiologicalMetrics {
    pub heart_rate: Option<SeriesStats>,
    pub breathing_rate: Option<SeriesStats>,
    pub stress_level: Option<SeriesStats>,
    pub temperature: Option<SeriesStats>,
    pub pulse_transit_time: Option<SeriesStats>,
    pub skin_conductance: Option<SeriesStats>,
}

/// Aggregated self-report scores, each nominally on a 1..k Likert scale.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QuestionnaireScores {
    pub panas_mean: Option<f64>,
    pub panas_std: Option<f64>,
    pub stai_mean: Option<f64>,
    pub stai_max: Option<f64>,
    pub dim_valence_mean: Option<f64>,
    pub dim_arousal_mean: Option<f64>,
    pub sssq_mean: Option<f64>,
}

/// Subject attributes parsed from the per-subject readme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalProfile {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub dominant_hand: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub bmi: Option<f64>,
    pub coffee_today: Option<bool>,
    pub coffee_last_hour: Option<bool>,
    pub sports_today: Option<bool>,
    pub smoker: Option<bool>,
    pub smoked_last_hour: Option<bool>,
    pub feels_ill: Option<bool>,
    pub notes: Option<String>,
}

/// The five weighted sub-scores plus the supplemental arousal level.
/// All values are in [0, 100]; `stress_index` is the only one where higher
/// is worse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthScores {
    pub cardiovascular_health: f64,
    pub stress_index: f64,
    pub respiratory_health: f64,
    pub emotional_wellbeing: f64,
    pub physical_condition: f64,
    pub arousal_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateClass {
    Critical,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl StateClass {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            StateClass::Excellent
        } else if score >= 65.0 {
            StateClass::Good
        } else if score >= 50.0 {
            StateClass::Fair
        } else if score >= 35.0 {
            StateClass::Poor
        } else {
            StateClass::Critical
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StateClass::Excellent => "Excellent condition",
            StateClass::Good => "Good condition",
            StateClass::Fair => "Fair condition",
            StateClass::Poor => "Poor condition",
            StateClass::Critical => "Critical condition",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallState {
    pub overall_score: f64,
    pub state_class: StateClass,
    pub state_description: String,
    pub components: HealthScores,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VitalSigns {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_bpm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_variability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breathing_rate_bpm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skin_temperature_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_level_0_100: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PsychologicalState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anxiety_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotional_valence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arousal_level: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

/// The nested report produced by the health-summary operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub vital_signs: VitalSigns,
    pub psychological_state: PsychologicalState,
    pub demographics: Demographics,
    pub risk_factors: Vec<String>,
    pub key_observations: Vec<String>,
    pub health_scores: HealthScores,
    pub overall_state: OverallState,
}

/// Compute the sub-scores. Each is the arithmetic mean of whichever of its
/// components exist, neutral 50 when none do, and clamped into [0, 100].
pub fn health_scores(
    phys: &PhysiologicalMetrics,
    quest: &QuestionnaireScores,
    profile: &PersonalProfile,
) -> HealthScores {
    let mut cardio = Vec::new();
    if let Some(hr) = phys.heart_rate {
        cardio.push(clamp100(100.0 - (hr.mean - 80.0).abs() * 2.0));
    }
    if let Some(ptt) = phys.pulse_transit_time {
        cardio.push((ptt.mean / 4.0).min(100.0));
    }

    let mut stress = Vec::new();
    if let Some(level) = phys.stress_level {
        stress.push(level.mean);
    }
    if let Some(sc) = phys.skin_conductance {
        stress.push((sc.mean * 20.0).min(100.0));
    }
    if let Some(stai) = quest.stai_mean {
        stress.push((stai - 1.0) * 33.3);
    }
    if let Some(sssq) = quest.sssq_mean {
        stress.push((sssq - 1.0) * 25.0);
    }

    let respiratory = match phys.breathing_rate {
        Some(br) => clamp100(100.0 - (br.mean - 16.0).abs() * 5.0),
        None => 50.0,
    };

    let mut emotional = Vec::new();
    if let Some(valence) = quest.dim_valence_mean {
        emotional.push((valence - 1.0) * 12.5);
    }
    if let Some(panas) = quest.panas_mean {
        emotional.push((panas - 1.0) * 25.0);
    }
    if let Some(stai) = quest.stai_mean {
        emotional.push(100.0 - (stai - 1.0) * 33.3);
    }

    let mut physical = Vec::new();
    if let Some(bmi) = profile.bmi {
        physical.push(bmi_score(bmi));
    }
    if profile.sports_today == Some(true) {
        physical.push(80.0);
    }
    if profile.feels_ill == Some(false) {
        physical.push(90.0);
    }
    if profile.smoker == Some(false) {
        physical.push(85.0);
    }

    let arousal = quest
        .dim_arousal_mean
        .map(|a| clamp100((a - 1.0) * 12.5))
        .unwrap_or(50.0);

    HealthScores {
        cardiovascular_health: mean_or_neutral(&cardio),
        stress_index: mean_or_neutral(&stress),
        respiratory_health: respiratory,
        emotional_wellbeing: mean_or_neutral(&emotional),
        physical_condition: mean_or_neutral(&physical),
        arousal_level: arousal,
    }
}

/// BMI band score: optimal 18.5..=24.9 scores 100, overweight 75, with
/// linear penalties outside, clamped into [0, 100].
pub fn bmi_score(bmi: f64) -> f64 {
    let score = if (18.5..=24.9).contains(&bmi) {
        100.0
    } else if (25.0..=29.9).contains(&bmi) {
        75.0
    } else if bmi < 18.5 {
        70.0 - (18.5 - bmi) * 10.0
    } else {
        50.0 - (bmi - 30.0) * 5.0
    };
    clamp100(score)
}

/// Weighted overall state; the stress sub-score contributes inverted.
pub fn overall_state(scores: &HealthScores) -> OverallState {
    let entries = [
        (scores.cardiovascular_health, 0.25, false),
        (scores.stress_index, 0.25, true),
        (scores.respiratory_health, 0.15, false),
        (scores.emotional_wellbeing, 0.20, false),
        (scores.physical_condition, 0.15, false),
    ];
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (value, weight, inverted) in entries {
        let v = if inverted { 100.0 - value } else { value };
        weighted += v * weight;
        total_weight += weight;
    }
    let overall = if total_weight > 0.0 {
        weighted / total_weight
    } else {
        50.0
    };
    let class = StateClass::from_score(overall);
    OverallState {
        overall_score: round2(overall),
        state_class: class,
        state_description: class.description().to_string(),
        components: *scores,
    }
}

/// Assemble the full report: scores, bucketed indicators, risk factors and
/// threshold-triggered observations.
pub fn health_report(
    phys: &PhysiologicalMetrics,
    quest: &QuestionnaireScores,
    profile: &PersonalProfile,
) -> HealthReport {
    let scores = health_scores(phys, quest, profile);
    let overall = overall_state(&scores);

    let mut vital_signs = VitalSigns::default();
    if let Some(hr) = phys.heart_rate {
        vital_signs.heart_rate_bpm = Some(round1(hr.mean));
        vital_signs.heart_rate_variability = Some(round1(hr.std));
    }
    if let Some(br) = phys.breathing_rate {
        vital_signs.breathing_rate_bpm = Some(round1(br.mean));
    }
    if let Some(temp) = phys.temperature {
        vital_signs.skin_temperature_c = Some(round2(temp.mean));
    }
    if let Some(level) = phys.stress_level {
        vital_signs.stress_level_0_100 = Some(round1(level.mean));
    }

    let psychological_state = PsychologicalState {
        anxiety_level: quest.stai_mean.map(round2),
        emotional_valence: quest.dim_valence_mean.map(round2),
        arousal_level: quest.dim_arousal_mean.map(round2),
    };

    let demographics = Demographics {
        age: profile.age,
        gender: profile.gender.clone(),
        bmi: profile.bmi,
        height_cm: profile.height_cm,
        weight_kg: profile.weight_kg,
    };

    let mut risk_factors = Vec::new();
    if profile.smoker == Some(true) {
        risk_factors.push("smoker".to_string());
    }
    if profile.feels_ill == Some(true) {
        risk_factors.push("feeling_ill".to_string());
    }
    if profile.coffee_last_hour == Some(true) {
        risk_factors.push("recent_caffeine".to_string());
    }
    if let Some(bmi) = profile.bmi {
        if bmi > 30.0 {
            risk_factors.push("obesity".to_string());
        } else if bmi < 18.5 {
            risk_factors.push("underweight".to_string());
        }
    }

    let mut key_observations = Vec::new();
    if scores.stress_index > 70.0 {
        key_observations.push("High stress levels detected".to_string());
    }
    if scores.cardiovascular_health < 60.0 {
        key_observations.push("Cardiovascular metrics show concern".to_string());
    }
    if scores.emotional_wellbeing < 50.0 {
        key_observations.push("Low emotional well-being".to_string());
    }
    if vital_signs.heart_rate_bpm.is_some_and(|hr| hr > 100.0) {
        key_observations.push("Elevated heart rate".to_string());
    }

    HealthReport {
        vital_signs,
        psychological_state,
        demographics,
        risk_factors,
        key_observations,
        health_scores: scores,
        overall_state: overall,
    }
}

fn mean_or_neutral(components: &[f64]) -> f64 {
    if components.is_empty() {
        50.0
    } else {
        clamp100(components.iter().sum::<f64>() / components.len() as f64)
    }
}

fn clamp100(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean: f64) -> Option<SeriesStats> {
        Some(SeriesStats {
            mean,
            std: 1.0,
            min: mean - 1.0,
            max: mean + 1.0,
        })
    }

    #[test]
    fn bmi_band_table() {
        assert_eq!(bmi_score(22.0), 100.0);
        assert_eq!(bmi_score(27.0), 75.0);
        assert_eq!(bmi_score(16.0), 45.0);
        assert_eq!(bmi_score(33.0), 35.0);
    }

    #[test]
    fn all_scores_neutral_without_inputs() {
        let scores = health_scores(
            &PhysiologicalMetrics::default(),
            &QuestionnaireScores::default(),
            &PersonalProfile::default(),
        );
        assert_eq!(scores.cardiovascular_health, 50.0);
        assert_eq!(scores.stress_index, 50.0);
        assert_eq!(scores.respiratory_health, 50.0);
        assert_eq!(scores.emotional_wellbeing, 50.0);
        assert_eq!(scores.physical_condition, 50.0);
        assert_eq!(scores.arousal_level, 50.0);
    }

    #[test]
    fn cardiovascular_mixes_rate_and_transit() {
        let phys = PhysiologicalMetrics {
            heart_rate: stats(80.0),
            pulse_transit_time: stats(300.0),
            ..PhysiologicalMetrics::default()
        };
        let scores = health_scores(
            &phys,
            &QuestionnaireScores::default(),
            &PersonalProfile::default(),
        );
        // (100 + 75) / 2
        assert!((scores.cardiovascular_health - 87.5).abs() < 1e-9);
    }

    #[test]
    fn scores_stay_in_bounds_for_extreme_inputs() {
        let phys = PhysiologicalMetrics {
            heart_rate: stats(500.0),
            breathing_rate: stats(90.0),
            stress_level: stats(100.0),
            pulse_transit_time: stats(10_000.0),
            skin_conductance: stats(40.0),
            temperature: stats(45.0),
        };
        let quest = QuestionnaireScores {
            panas_mean: Some(5.0),
            stai_mean: Some(4.0),
            dim_valence_mean: Some(9.0),
            dim_arousal_mean: Some(9.0),
            sssq_mean: Some(5.0),
            ..QuestionnaireScores::default()
        };
        let profile = PersonalProfile {
            bmi: Some(60.0),
            smoker: Some(true),
            feels_ill: Some(true),
            ..PersonalProfile::default()
        };
        let scores = health_scores(&phys, &quest, &profile);
        for value in [
            scores.cardiovascular_health,
            scores.stress_index,
            scores.respiratory_health,
            scores.emotional_wellbeing,
            scores.physical_condition,
            scores.arousal_level,
        ] {
            assert!((0.0..=100.0).contains(&value), "score {} out of bounds", value);
        }
    }

    #[test]
    fn physical_bonuses_require_present_flags() {
        let profile = PersonalProfile {
            sports_today: Some(true),
            feels_ill: Some(false),
            smoker: Some(false),
            ..PersonalProfile::default()
        };
        let scores = health_scores(
            &PhysiologicalMetrics::default(),
            &QuestionnaireScores::default(),
            &profile,
        );
        assert!((scores.physical_condition - 85.0).abs() < 1e-9);

        // flags absent entirely: neutral, not bonused
        let scores = health_scores(
            &PhysiologicalMetrics::default(),
            &QuestionnaireScores::default(),
            &PersonalProfile::default(),
        );
        assert_eq!(scores.physical_condition, 50.0);
    }

    #[test]
    fn overall_boundary_classification() {
        let scores = HealthScores {
            cardiovascular_health: 80.0,
            stress_index: 20.0,
            respiratory_health: 80.0,
            emotional_wellbeing: 80.0,
            physical_condition: 80.0,
            arousal_level: 50.0,
        };
        let state = overall_state(&scores);
        assert_eq!(state.overall_score, 80.0);
        assert_eq!(state.state_class, StateClass::Excellent);

        let scores = HealthScores {
            cardiovascular_health: 79.99,
            stress_index: 20.01,
            respiratory_health: 79.99,
            emotional_wellbeing: 79.99,
            physical_condition: 79.99,
            arousal_level: 50.0,
        };
        let state = overall_state(&scores);
        assert_eq!(state.state_class, StateClass::Good);
    }

    #[test]
    fn report_collects_risks_and_observations() {
        let phys = PhysiologicalMetrics {
            heart_rate: stats(110.0),
            stress_level: stats(90.0),
            ..PhysiologicalMetrics::default()
        };
        let quest = QuestionnaireScores {
            stai_mean: Some(3.8),
            sssq_mean: Some(4.5),
            ..QuestionnaireScores::default()
        };
        let profile = PersonalProfile {
            smoker: Some(true),
            coffee_last_hour: Some(true),
            bmi: Some(31.0),
            ..PersonalProfile::default()
        };
        let report = health_report(&phys, &quest, &profile);
        assert!(report.risk_factors.iter().any(|r| r == "smoker"));
        assert!(report.risk_factors.iter().any(|r| r == "recent_caffeine"));
        assert!(report.risk_factors.iter().any(|r| r == "obesity"));
        assert!(report
            .key_observations
            .iter()
            .any(|o| o == "High stress levels detected"));
        assert!(report
            .key_observations
            .iter()
            .any(|o| o == "Elevated heart rate"));
        assert_eq!(report.vital_signs.heart_rate_bpm, Some(110.0));
    }

    #[test]
    fn stats_of_empty_series_are_absent() {
        assert!(SeriesStats::from_values(&[]).is_none());
        let s = SeriesStats::from_values(&[2.0, 4.0]).unwrap();
        assert_eq!(s.mean, 3.0);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.std, 1.0);
    }
}
