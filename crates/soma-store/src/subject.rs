use soma_lib::health::PersonalProfile;
use std::path::Path;

/// Parse the per-subject readme: personal attributes as `Key: value` lines,
/// prerequisite flags as `Question? YES/NO` lines, free text after the
/// `### Additional notes ###` marker. BMI derives from height and weight.
pub fn parse_subject_info(text: &str) -> PersonalProfile {
    let mut profile = PersonalProfile::default();
    let mut notes: Vec<&str> = Vec::new();
    let mut in_notes = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("###") {
            in_notes = line.contains("Additional notes");
            continue;
        }
        if in_notes {
            notes.push(line);
            continue;
        }
        if let Some((question, answer)) = split_flag_line(line) {
            let value = Some(answer.eq_ignore_ascii_case("YES"));
            match normalize_question(question).as_str() {
                "did you drink coffee today" => profile.coffee_today = value,
                "did you drink coffee within the last hour" => profile.coffee_last_hour = value,
                "did you do any sports today" => profile.sports_today = value,
                "are you a smoker" => profile.smoker = value,
                "did you smoke within the last hour" => profile.smoked_last_hour = value,
                "do you feel ill today" => profile.feels_ill = value,
                _ => {}
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            match key.trim().to_lowercase().as_str() {
                "age" => profile.age = value.parse().ok(),
                "height (cm)" => profile.height_cm = value.parse().ok(),
                "weight (kg)" => profile.weight_kg = value.parse().ok(),
                "gender" => profile.gender = Some(value.to_lowercase()),
                "dominant hand" => profile.dominant_hand = Some(value.to_lowercase()),
                _ => {}
            }
        }
    }

    if !notes.is_empty() {
        profile.notes = Some(notes.join("\n"));
    }
    if let (Some(height), Some(weight)) = (profile.height_cm, profile.weight_kg) {
        if height > 0.0 {
            let meters = height / 100.0;
            profile.bmi = Some(round2(weight / (meters * meters)));
        }
    }
    profile
}

/// Load a readme file; missing files yield the empty profile, never an error.
pub fn load_subject_info(path: &Path) -> PersonalProfile {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_subject_info(&text),
        Err(err) => {
            log::debug!("no subject info at {}: {}", path.display(), err);
            PersonalProfile::default()
        }
    }
}

fn split_flag_line(line: &str) -> Option<(&str, &str)> {
    let (question, rest) = line.split_once('?')?;
    let answer = rest.trim();
    (answer.eq_ignore_ascii_case("YES") || answer.eq_ignore_ascii_case("NO"))
        .then_some((question, answer))
}

fn normalize_question(question: &str) -> String {
    question
        .trim()
        .trim_end_matches(':')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .to_lowercase()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const README: &str = "\
Personal information

Age: 28
Height (cm): 178
Weight (kg): 72
Gender: Male
Dominant hand: right

Additional questions

Did you drink coffee today? YES
Did you drink coffee within the last hour? NO
Did you do any sports today? NO
Are you a smoker? NO
Did you smoke within the last hour? NO
Do you feel ill today? NO

### Additional notes ###
Subject wore the wrist unit on the left arm.
";

    #[test]
    fn parses_personal_attributes() {
        let profile = parse_subject_info(README);
        assert_eq!(profile.age, Some(28));
        assert_eq!(profile.height_cm, Some(178.0));
        assert_eq!(profile.weight_kg, Some(72.0));
        assert_eq!(profile.gender.as_deref(), Some("male"));
        assert_eq!(profile.dominant_hand.as_deref(), Some("right"));
    }

    #[test]
    fn derives_bmi_to_two_decimals() {
        let profile = parse_subject_info(README);
        assert_eq!(profile.bmi, Some(22.72));
    }

    #[test]
    fn parses_prerequisite_flags() {
        let profile = parse_subject_info(README);
        assert_eq!(profile.coffee_today, Some(true));
        assert_eq!(profile.coffee_last_hour, Some(false));
        assert_eq!(profile.sports_today, Some(false));
        assert_eq!(profile.smoker, Some(false));
        assert_eq!(profile.smoked_last_hour, Some(false));
        assert_eq!(profile.feels_ill, Some(false));
    }

    #[test]
    fn collects_notes_block() {
        let profile = parse_subject_info(README);
        assert_eq!(
            profile.notes.as_deref(),
            Some("Subject wore the wrist unit on the left arm.")
        );
    }

    #[test]
    fn unanswered_flags_stay_absent() {
        let profile = parse_subject_info("Age: 30\n");
        assert_eq!(profile.age, Some(30));
        assert!(profile.smoker.is_none());
        assert!(profile.feels_ill.is_none());
        assert!(profile.bmi.is_none());
    }

    #[test]
    fn missing_file_yields_empty_profile() {
        let profile = load_subject_info(Path::new("/definitely/not/here_readme.txt"));
        assert_eq!(profile, PersonalProfile::default());
    }
}
