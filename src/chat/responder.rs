use rand::seq::SliceRandom;
use rand::Rng;

/// A reply picked for a user message.
#[derive(Debug, Clone, PartialEq)]
pub struct BotReply {
    pub template_key: String,
    pub text: String,
    pub topic: Option<&'static str>,
    pub keywords: Vec<String>,
    pub confidence: f64,
}

struct Topic {
    name: &'static str,
    keywords: &'static [&'static str],
    replies: &'static [&'static str],
}

const TOPICS: &[Topic] = &[
    Topic {
        name: "anxiety",
        keywords: &["anxious", "anxiety", "panic", "nervous", "worried", "worry", "scared"],
        replies: &[
            "I hear that you're feeling anxious. Can you tell me more about what's been triggering these feelings?",
            "Anxiety can feel overwhelming. Let's try a slow breath together: in for four, hold for four, out for six.",
            "When worry builds up, it can help to name what is in your control right now. What is one small thing you can do today?",
        ],
    },
    Topic {
        name: "sleep",
        keywords: &["sleep", "sleeping", "insomnia", "tired", "exhausted", "awake"],
        replies: &[
            "Sleep problems can affect everything else. Have you noticed anything that keeps you awake, like screens or racing thoughts?",
            "A steady wind-down routine can help. Would you like some ideas for the hour before bed?",
        ],
    },
    Topic {
        name: "stress",
        keywords: &["stress", "stressed", "overwhelmed", "pressure", "exam", "exams", "deadline", "deadlines", "focus"],
        replies: &[
            "It sounds like a lot is on your plate. Let's break it down: what feels most urgent right now?",
            "It's completely normal to feel this way under pressure. Let's explore some coping strategies together.",
            "Have you tried any relaxation techniques like deep breathing or a short walk between tasks?",
        ],
    },
    Topic {
        name: "sadness",
        keywords: &["sad", "down", "depressed", "crying", "cry", "unhappy", "empty"],
        replies: &[
            "I'm sorry you're feeling low. Thank you for sharing that with me. What has your day been like?",
            "Feeling sad is hard. Remember that everyone's journey is different, and it's okay to go at your own pace.",
        ],
    },
    Topic {
        name: "loneliness",
        keywords: &["lonely", "alone", "isolated", "nobody", "no friends"],
        replies: &[
            "Feeling alone is painful. Is there someone you trust you could reach out to, even with a short message?",
            "Our community forum has people going through similar things. Would you like to hear more about it?",
        ],
    },
    Topic {
        name: "gratitude",
        keywords: &["thank", "thanks", "grateful", "helpful", "helped"],
        replies: &[
            "I'm glad this was helpful. Is there anything else on your mind?",
            "You're welcome. Taking time to look after yourself like this matters.",
        ],
    },
    Topic {
        name: "greeting",
        keywords: &["hello", "hi", "hey", "good morning", "good evening"],
        replies: &[
            "Hello! I'm here to listen. How are you feeling today?",
            "Hi there. What would you like to talk about?",
        ],
    },
];

const GENERAL_REPLIES: &[&str] = &[
    "Thank you for sharing. Can you tell me a bit more about how that made you feel?",
    "I'm here to listen. What do you think would help you most right now?",
    "Would you like to try a quick mindfulness exercise?",
    "Let me share a helpful resource: our library has short guides on managing difficult feelings.",
];

pub const CRISIS_REPLY: &str = "I'm really concerned about what you've shared, and I'm glad you told me. \
You don't have to go through this alone. If you are in immediate danger, please call your local emergency \
number now. Crisis hotlines for your country are listed on the crisis support page (/crisis-support), and \
our support team has been alerted.";

/// Scripted reply selection: keyword topics map to reply lists and one
/// reply is drawn at random.
#[derive(Debug, Clone, Default)]
pub struct ResponseGenerator;

impl ResponseGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn respond(&self, text: &str) -> BotReply {
        self.respond_with(text, &mut rand::thread_rng())
    }

    pub fn respond_with<R: Rng>(&self, text: &str, rng: &mut R) -> BotReply {
        let keywords = extract_keywords(text);

        let topic = TOPICS
            .iter()
            .find(|t| t.keywords.iter().any(|k| keywords.iter().any(|found| found == k)));

        let (name, replies, confidence) = match topic {
            Some(t) => (Some(t.name), t.replies, 0.85),
            None => (None, GENERAL_REPLIES, 0.6),
        };

        let index = rng.gen_range(0..replies.len());
        BotReply {
            template_key: format!("{}.{}", name.unwrap_or("general"), index),
            text: replies[index].to_string(),
            topic: name,
            keywords,
            confidence,
        }
    }

    pub fn crisis_reply(&self, hotline: Option<(&str, &str)>) -> BotReply {
        let mut text = CRISIS_REPLY.to_string();
        if let Some((name, phone)) = hotline {
            text.push_str(&format!(" You can reach {} at {}.", name, phone));
        }
        BotReply {
            template_key: "crisis.0".to_string(),
            text,
            topic: Some("crisis"),
            keywords: Vec::new(),
            confidence: 0.95,
        }
    }

    /// A random opener for a new session.
    pub fn greeting(&self) -> &'static str {
        TOPICS
            .iter()
            .find(|t| t.name == "greeting")
            .and_then(|t| t.replies.choose(&mut rand::thread_rng()))
            .copied()
            .unwrap_or(GENERAL_REPLIES[0])
    }
}

/// Topic keywords present in `text`, in list order. Single words match whole
/// tokens, phrases match as substrings.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .collect();

    let mut found = Vec::new();
    for topic in TOPICS {
        for keyword in topic.keywords {
            let hit = if keyword.contains(' ') {
                lowered.contains(keyword)
            } else {
                tokens.contains(keyword)
            };
            if hit && !found.iter().any(|f: &String| f == keyword) {
                found.push(keyword.to_string());
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn anxiety_message_gets_anxiety_reply() {
        let mut rng = StdRng::seed_from_u64(7);
        let reply = ResponseGenerator::new().respond_with("I've been feeling really anxious lately", &mut rng);
        assert_eq!(reply.topic, Some("anxiety"));
        assert!(reply.template_key.starts_with("anxiety."));
        assert_eq!(reply.keywords, vec!["anxious"]);
        assert!(TOPICS[0].replies.contains(&reply.text.as_str()));
    }

    #[test]
    fn unknown_topic_falls_back_to_general() {
        let mut rng = StdRng::seed_from_u64(1);
        let reply = ResponseGenerator::new().respond_with("The weather is mild", &mut rng);
        assert_eq!(reply.topic, None);
        assert!(reply.template_key.starts_with("general."));
        assert!(GENERAL_REPLIES.contains(&reply.text.as_str()));
    }

    #[test]
    fn short_keywords_match_whole_words_only() {
        assert!(extract_keywords("this is fine").is_empty());
        assert_eq!(extract_keywords("Hi, I am so stressed"), vec!["stressed", "hi"]);
    }

    #[test]
    fn crisis_reply_mentions_hotline() {
        let reply = ResponseGenerator::new().crisis_reply(Some(("988 Lifeline", "988")));
        assert!(reply.text.contains("/crisis-support"));
        assert!(reply.text.ends_with("You can reach 988 Lifeline at 988."));
    }
}
