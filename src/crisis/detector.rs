use super::types::{CrisisMatch, CrisisType};

const KEYWORD_GROUPS: &[(CrisisType, &[&str])] = &[
    (
        CrisisType::SuicidalIdeation,
        &[
            "suicide",
            "suicidal",
            "kill myself",
            "end my life",
            "want to die",
            "better off dead",
            "no reason to live",
        ],
    ),
    (
        CrisisType::SelfHarm,
        &["self harm", "self-harm", "hurt myself", "cut myself"],
    ),
    (
        CrisisType::SevereDepression,
        &["hopeless", "give up", "can't go on", "cant go on"],
    ),
];

/// Keyword-based crisis detector: a case-insensitive substring test against
/// a fixed list.
#[derive(Debug, Clone, Default)]
pub struct CrisisDetector;

impl CrisisDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn scan(&self, text: &str) -> Option<CrisisMatch> {
        let lowered = text.to_lowercase();
        let mut keywords = Vec::new();
        let mut worst: Option<CrisisType> = None;

        for (crisis_type, group) in KEYWORD_GROUPS {
            for keyword in group.iter().filter(|k| lowered.contains(*k)) {
                keywords.push(keyword.to_string());
                if worst.map_or(true, |w| crisis_type.severity() > w.severity()) {
                    worst = Some(*crisis_type);
                }
            }
        }

        let crisis_type = worst?;
        let confidence = (0.5 + 0.1 * keywords.len() as f64).min(0.99);
        Some(CrisisMatch {
            keywords,
            crisis_type,
            severity: crisis_type.severity(),
            confidence,
        })
    }

    pub fn is_crisis(&self, text: &str) -> bool {
        self.scan(text).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crisis::types::CrisisSeverity;

    #[test]
    fn ordinary_text_is_not_a_crisis() {
        let detector = CrisisDetector::new();
        assert!(detector.scan("I had a long day at university").is_none());
        assert!(!detector.is_crisis(""));
    }

    #[test]
    fn match_is_case_insensitive() {
        let found = CrisisDetector::new().scan("Sometimes I WANT TO DIE").unwrap();
        assert_eq!(found.keywords, vec!["want to die"]);
        assert_eq!(found.crisis_type, CrisisType::SuicidalIdeation);
        assert_eq!(found.severity, CrisisSeverity::Critical);
        assert!((found.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn most_severe_group_wins() {
        let found = CrisisDetector::new()
            .scan("I feel hopeless and I keep thinking I should hurt myself")
            .unwrap();
        assert_eq!(found.crisis_type, CrisisType::SelfHarm);
        assert_eq!(found.severity, CrisisSeverity::High);
        assert_eq!(found.keywords.len(), 2);
    }

    #[test]
    fn confidence_is_capped() {
        let text = "suicide suicidal kill myself end my life want to die better off dead no reason to live";
        let found = CrisisDetector::new().scan(text).unwrap();
        assert!(found.keywords.len() >= 7);
        assert!((found.confidence - 0.99).abs() < 1e-9);
    }

    #[test]
    fn severity_maps_to_session_scale() {
        assert_eq!(CrisisSeverity::Low.numeric(), 3);
        assert_eq!(CrisisSeverity::Medium.numeric(), 5);
        assert_eq!(CrisisSeverity::High.numeric(), 8);
        assert_eq!(CrisisSeverity::Critical.numeric(), 10);
    }
}
