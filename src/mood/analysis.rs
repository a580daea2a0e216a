use std::collections::HashMap;

use super::types::{MoodAnalysis, TrendDirection};
use crate::database::models::MoodEntry;

const TREND_DELTA: f64 = 0.5;
const POSITIVE_SCORE: i64 = 7;
const TOP_N: usize = 3;

/// Analyse entries given oldest first. Returns `None` for an empty slice.
pub fn analyze_entries(entries: &[MoodEntry]) -> Option<MoodAnalysis> {
    if entries.is_empty() {
        return None;
    }

    let scores: Vec<f64> = entries.iter().map(|e| e.mood_score as f64).collect();
    let average = mean(&scores);
    let variance = scores.iter().map(|s| (s - average).powi(2)).sum::<f64>() / scores.len() as f64;

    let trend = if scores.len() < 2 {
        TrendDirection::Stable
    } else {
        let (first, second) = scores.split_at(scores.len() / 2);
        let delta = mean(second) - mean(first);
        if delta >= TREND_DELTA {
            TrendDirection::Improving
        } else if delta <= -TREND_DELTA {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    };

    let dominant_emotions = top_terms(entries.iter().flat_map(|e| e.emotions.0.iter().map(String::as_str)));
    let common_triggers = top_terms(entries.iter().flat_map(|e| e.triggers.split([',', ';', '\n'])));
    let positive_activities = top_terms(
        entries
            .iter()
            .filter(|e| e.mood_score >= POSITIVE_SCORE)
            .flat_map(|e| e.activities.0.iter().map(String::as_str)),
    );

    let concern_level = concern_level(average);
    Some(MoodAnalysis {
        entry_count: entries.len(),
        average_mood_score: round1(average),
        mood_variance: round1(variance),
        trend_direction: trend,
        recommendations: recommendation_text(concern_level, trend, &positive_activities),
        dominant_emotions,
        common_triggers,
        positive_activities,
        concern_level,
    })
}

/// 1 (no concern) to 5 (high concern) from the average score.
pub fn concern_level(average: f64) -> i64 {
    if average >= 8.0 {
        1
    } else if average >= 6.0 {
        2
    } else if average >= 4.0 {
        3
    } else if average >= 2.5 {
        4
    } else {
        5
    }
}

fn recommendation_text(concern: i64, trend: TrendDirection, positive: &[String]) -> String {
    let mut text = match concern {
        1 => "Your mood has been consistently positive. Keep up the routines that are working for you.".to_string(),
        2 => "Your mood has been mostly good. Regular check-ins and wellness activities can help keep it steady."
            .to_string(),
        3 => "Your mood has been mixed. Try a breathing or grounding exercise on harder days and keep journaling."
            .to_string(),
        4 => "You have been having a difficult time. Consider talking to a counselor; our therapist directory can help you find one."
            .to_string(),
        _ => "Your recent entries suggest you are struggling. Please reach out to a crisis line or a professional today; you do not have to face this alone."
            .to_string(),
    };

    if trend == TrendDirection::Declining {
        text.push_str(" Your mood has been trending down recently.");
    }
    if let Some(activity) = positive.first() {
        text.push_str(&format!(" On your better days you reported \"{}\"; making room for it may help.", activity));
    }
    text
}

fn top_terms<'a>(terms: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for term in terms {
        let term = term.trim().to_lowercase();
        if !term.is_empty() {
            *counts.entry(term).or_default() += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(TOP_N).map(|(term, _)| term).collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use sqlx::types::Json;

    fn entry(day: u32, score: i64, emotions: &[&str], activities: &[&str], triggers: &str) -> MoodEntry {
        MoodEntry {
            id: format!("e{}", day),
            user_id: "u".into(),
            mood_level: "neutral".into(),
            mood_score: score,
            emotions: Json(emotions.iter().map(|s| s.to_string()).collect()),
            energy_level: 5,
            sleep_quality: None,
            sleep_hours: None,
            activities: Json(activities.iter().map(|s| s.to_string()).collect()),
            triggers: triggers.into(),
            notes: String::new(),
            entry_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input_has_no_analysis() {
        assert!(analyze_entries(&[]).is_none());
    }

    #[test]
    fn improving_trend_and_positive_activities() {
        let entries = vec![
            entry(1, 3, &["anxious"], &["studying"], "exams"),
            entry(2, 4, &["anxious", "tired"], &["studying"], "exams, sleep"),
            entry(3, 7, &["calm"], &["walking"], ""),
            entry(4, 8, &["calm", "happy"], &["walking", "music"], ""),
        ];
        let analysis = analyze_entries(&entries).unwrap();

        assert_eq!(analysis.entry_count, 4);
        assert!((analysis.average_mood_score - 5.5).abs() < 1e-9);
        assert_eq!(analysis.trend_direction, TrendDirection::Improving);
        assert_eq!(analysis.dominant_emotions[..2], ["anxious".to_string(), "calm".to_string()]);
        assert_eq!(analysis.common_triggers[0], "exams");
        assert_eq!(analysis.positive_activities[0], "walking");
        assert!(!analysis.positive_activities.contains(&"studying".to_string()));
        assert_eq!(analysis.concern_level, 3);
    }

    #[test]
    fn declining_and_stable_trends() {
        let declining = analyze_entries(&[entry(1, 8, &[], &[], ""), entry(2, 6, &[], &[], "")]).unwrap();
        assert_eq!(declining.trend_direction, TrendDirection::Declining);

        let stable = analyze_entries(&[entry(1, 6, &[], &[], ""), entry(2, 6, &[], &[], "")]).unwrap();
        assert_eq!(stable.trend_direction, TrendDirection::Stable);
        assert_eq!(stable.mood_variance, 0.0);

        let single = analyze_entries(&[entry(1, 9, &[], &[], "")]).unwrap();
        assert_eq!(single.trend_direction, TrendDirection::Stable);
    }

    #[test]
    fn concern_level_bands() {
        assert_eq!(concern_level(9.0), 1);
        assert_eq!(concern_level(8.0), 1);
        assert_eq!(concern_level(6.5), 2);
        assert_eq!(concern_level(4.0), 3);
        assert_eq!(concern_level(2.5), 4);
        assert_eq!(concern_level(2.4), 5);
    }
}
