use serde::Serialize;

/// Trait names in the order the analysis service returns scores.
pub const TRAIT_NAMES: [&str; 6] = [
    "Extraversion",
    "Agreeableness",
    "Conscientiousness",
    "Neuroticism",
    "Openness",
    "Interview Score",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitLevel {
    Low,
    Medium,
    High,
}

impl TraitLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 0.4 {
            TraitLevel::Low
        } else if score < 0.6 {
            TraitLevel::Medium
        } else {
            TraitLevel::High
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TraitResult {
    #[serde(rename = "trait")]
    pub trait_name: String,
    /// Percentage, one decimal place.
    pub score: f64,
    pub raw_score: f64,
    pub description: String,
    pub level: TraitLevel,
}

pub fn trait_description(trait_name: &str, level: TraitLevel) -> &'static str {
    use TraitLevel::*;
    match (trait_name, level) {
        ("Extraversion", Low) => "Reserved and thoughtful, prefers working independently",
        ("Extraversion", Medium) => "Balanced between social interaction and independent work",
        ("Extraversion", High) => "Outgoing and energetic, thrives in collaborative environments",
        ("Agreeableness", Low) => "Direct and analytical, values honesty over harmony",
        ("Agreeableness", Medium) => "Cooperative when needed, maintains professional boundaries",
        ("Agreeableness", High) => "Highly collaborative and empathetic, excellent team player",
        ("Conscientiousness", Low) => "Flexible and adaptable, comfortable with ambiguity",
        ("Conscientiousness", Medium) => {
            "Organized when necessary, balances structure and flexibility"
        }
        ("Conscientiousness", High) => "Highly organized and detail-oriented, strong work ethic",
        ("Neuroticism", Low) => "Calm under pressure, emotionally stable and resilient",
        ("Neuroticism", Medium) => "Generally stable with normal stress responses",
        ("Neuroticism", High) => "Sensitive and perceptive, deeply invested in work quality",
        ("Openness", Low) => "Practical and results-focused, values proven methods",
        ("Openness", Medium) => "Open to new ideas within structured frameworks",
        ("Openness", High) => "Creative and innovative, embraces new technologies and approaches",
        ("Interview Score", Low) => "May benefit from interview coaching and practice",
        ("Interview Score", Medium) => "Solid interview performance with clear communication",
        ("Interview Score", High) => "Excellent presentation skills and professional demeanor",
        _ => "",
    }
}

/// Describes six raw scores in `[0, 1]`. Any other arity is an error.
pub fn describe_scores(scores: &[f64]) -> Result<Vec<TraitResult>, String> {
    if scores.len() != TRAIT_NAMES.len() {
        return Err(format!(
            "expected {} scores from the analysis service, got {}",
            TRAIT_NAMES.len(),
            scores.len()
        ));
    }

    Ok(TRAIT_NAMES
        .iter()
        .zip(scores)
        .map(|(name, &raw)| {
            let level = TraitLevel::from_score(raw);
            TraitResult {
                trait_name: name.to_string(),
                score: (raw * 1000.0).round() / 10.0,
                raw_score: raw,
                description: trait_description(name, level).to_string(),
                level,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(TraitLevel::from_score(0.39), TraitLevel::Low);
        assert_eq!(TraitLevel::from_score(0.4), TraitLevel::Medium);
        assert_eq!(TraitLevel::from_score(0.59), TraitLevel::Medium);
        assert_eq!(TraitLevel::from_score(0.6), TraitLevel::High);
    }

    #[test]
    fn test_describe_scores() {
        let results = describe_scores(&[0.1, 0.5, 0.9, 0.3, 0.65, 0.72345]).unwrap();
        assert_eq!(results.len(), 6);
        assert_eq!(results[0].trait_name, "Extraversion");
        assert_eq!(results[0].level, TraitLevel::Low);
        assert_eq!(
            results[0].description,
            "Reserved and thoughtful, prefers working independently"
        );
        assert_eq!(results[5].trait_name, "Interview Score");
        assert_eq!(results[5].score, 72.3);
        assert_eq!(results[5].raw_score, 0.72345);
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        assert!(describe_scores(&[0.5; 5]).is_err());
        assert!(describe_scores(&[]).is_err());
    }

    #[test]
    fn test_result_serializes_trait_key() {
        let results = describe_scores(&[0.5; 6]).unwrap();
        let value = serde_json::to_value(&results[0]).unwrap();
        assert_eq!(value["trait"], "Extraversion");
        assert_eq!(value["level"], "medium");
        assert_eq!(value["score"], 50.0);
    }
}
