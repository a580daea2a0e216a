use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Resource,
    Activity,
    Therapist,
    CrisisResource,
    CopingStrategy,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Resource => "resource",
            RecommendationKind::Activity => "activity",
            RecommendationKind::Therapist => "therapist",
            RecommendationKind::CrisisResource => "crisis_resource",
            RecommendationKind::CopingStrategy => "coping_strategy",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub kind: RecommendationKind,
    pub title: &'static str,
    pub description: &'static str,
}

/// Mood bands on the 1-10 average of recent entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodBand {
    Low,
    Mid,
    High,
}

impl MoodBand {
    pub fn from_average(average: f64) -> Self {
        if average < 4.0 {
            MoodBand::Low
        } else if average < 7.0 {
            MoodBand::Mid
        } else {
            MoodBand::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodBand::Low => "low",
            MoodBand::Mid => "mid",
            MoodBand::High => "high",
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            MoodBand::Low => "Your recent mood entries have been low",
            MoodBand::Mid => "Your mood has been mixed over the past week",
            MoodBand::High => "You have been feeling good lately",
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            MoodBand::Low => 0.9,
            MoodBand::Mid => 0.75,
            MoodBand::High => 0.6,
        }
    }

    /// One template pool per slot, each with the priority it is stored with.
    pub fn slots(&self) -> &'static [(&'static [Template], i64)] {
        match self {
            MoodBand::Low => &[(COPING_STRATEGIES, 8), (CRISIS_RESOURCES, 10)],
            MoodBand::Mid => &[(ACTIVITIES, 5), (RESOURCES, 4)],
            MoodBand::High => &[(ACTIVITIES, 2)],
        }
    }

    /// Draw one template per slot.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Vec<(Template, i64)> {
        self.slots()
            .iter()
            .filter_map(|(pool, priority)| pool.choose(rng).map(|t| (*t, *priority)))
            .collect()
    }
}

const COPING_STRATEGIES: &[Template] = &[
    Template {
        kind: RecommendationKind::CopingStrategy,
        title: "Try grounding with 5-4-3-2-1",
        description: "Name five things you see, four you can touch, three you hear, two you smell and one you taste.",
    },
    Template {
        kind: RecommendationKind::CopingStrategy,
        title: "Reach out to someone you trust",
        description: "A short message or call to a friend or family member can ease the weight you are carrying.",
    },
    Template {
        kind: RecommendationKind::CopingStrategy,
        title: "Box breathing",
        description: "Breathe in for four counts, hold for four, out for four and hold for four. Repeat for two minutes.",
    },
];

const CRISIS_RESOURCES: &[Template] = &[
    Template {
        kind: RecommendationKind::CrisisResource,
        title: "Support is available 24/7",
        description: "If things feel overwhelming, crisis lines in your country are free and confidential.",
    },
    Template {
        kind: RecommendationKind::CrisisResource,
        title: "Talk to a counselor today",
        description: "Trained counselors are ready to listen any time. See the crisis support page for numbers.",
    },
];

const ACTIVITIES: &[Template] = &[
    Template {
        kind: RecommendationKind::Activity,
        title: "Take a mindful walk",
        description: "Fifteen minutes outside, paying attention to your surroundings, can lift your energy.",
    },
    Template {
        kind: RecommendationKind::Activity,
        title: "Body scan meditation",
        description: "A ten-minute body scan helps release tension you may not notice during the day.",
    },
    Template {
        kind: RecommendationKind::Activity,
        title: "Write three good things",
        description: "Note three things that went well today in your journal and why they happened.",
    },
];

const RESOURCES: &[Template] = &[
    Template {
        kind: RecommendationKind::Resource,
        title: "Understanding your mood patterns",
        description: "Browse the resource library for short reads on how sleep, activity and stress shape mood.",
    },
    Template {
        kind: RecommendationKind::Resource,
        title: "Managing everyday stress",
        description: "Practical worksheets and exercises for handling pressure at school and work.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn band_boundaries() {
        assert_eq!(MoodBand::from_average(3.9), MoodBand::Low);
        assert_eq!(MoodBand::from_average(4.0), MoodBand::Mid);
        assert_eq!(MoodBand::from_average(6.9), MoodBand::Mid);
        assert_eq!(MoodBand::from_average(7.0), MoodBand::High);
    }

    #[test]
    fn low_band_draws_coping_and_crisis() {
        let mut rng = StdRng::seed_from_u64(3);
        let drawn = MoodBand::Low.draw(&mut rng);
        let kinds: Vec<_> = drawn.iter().map(|(t, _)| t.kind).collect();
        assert_eq!(
            kinds,
            vec![RecommendationKind::CopingStrategy, RecommendationKind::CrisisResource]
        );
    }

    #[test]
    fn high_band_draws_a_single_activity() {
        let mut rng = StdRng::seed_from_u64(9);
        let drawn = MoodBand::High.draw(&mut rng);
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].0.kind, RecommendationKind::Activity);
    }
}
