use crate::config::ModerationConfig;

const TOXIC_TERMS: &[&str] = &[
    "idiot",
    "stupid",
    "moron",
    "loser",
    "pathetic",
    "worthless",
    "shut up",
    "hate you",
    "kill yourself",
    "kys",
    "freak",
    "disgusting",
];

const SCORE_PER_TERM: f64 = 0.35;

/// Outcome of screening a post or reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Screening {
    pub toxicity_score: Option<f64>,
    pub flagged: bool,
    pub hold_for_review: bool,
}

impl Screening {
    pub fn clean() -> Self {
        Self {
            toxicity_score: None,
            flagged: false,
            hold_for_review: false,
        }
    }
}

/// Score of `text` against the toxic term list, in [0, 1].
pub fn toxicity_score(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let hits = TOXIC_TERMS
        .iter()
        .filter(|term| {
            if term.contains(' ') {
                lowered.contains(*term)
            } else {
                tokens.contains(*term)
            }
        })
        .count();
    (hits as f64 * SCORE_PER_TERM).min(1.0)
}

pub fn screen(config: &ModerationConfig, text: &str) -> Screening {
    if !config.enabled {
        return Screening::clean();
    }
    let score = toxicity_score(text);
    Screening {
        toxicity_score: Some(score),
        flagged: score >= config.toxicity_threshold,
        hold_for_review: score >= config.auto_flag_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_text_scores_zero() {
        assert_eq!(toxicity_score("You are doing great, keep going!"), 0.0);
    }

    #[test]
    fn terms_count_once_and_cap() {
        assert!((toxicity_score("idiot idiot IDIOT") - 0.35).abs() < 1e-9);
        assert_eq!(toxicity_score("stupid idiot loser moron"), 1.0);
    }

    #[test]
    fn substrings_of_words_do_not_count() {
        assert_eq!(toxicity_score("skyscraper"), 0.0);
    }

    #[test]
    fn thresholds_decide_flag_and_hold() {
        let config = ModerationConfig::default();

        let mild = screen(&config, "that was stupid");
        assert!(!mild.flagged && !mild.hold_for_review);

        let flagged = screen(&config, "you stupid idiot");
        assert!(flagged.flagged);
        assert!(!flagged.hold_for_review);

        let held = screen(&config, "shut up you stupid idiot");
        assert!(held.flagged && held.hold_for_review);
    }

    #[test]
    fn disabled_moderation_passes_everything() {
        let config = ModerationConfig {
            enabled: false,
            ..ModerationConfig::default()
        };
        assert_eq!(screen(&config, "stupid idiot loser"), Screening::clean());
    }
}
