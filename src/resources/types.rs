use serde::{Deserialize, Serialize};

use crate::database::models::{Resource, ResourceInteraction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Article,
    Video,
    Audio,
    Exercise,
    Meditation,
    JournalPrompt,
    Worksheet,
    Infographic,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Article => "article",
            ResourceType::Video => "video",
            ResourceType::Audio => "audio",
            ResourceType::Exercise => "exercise",
            ResourceType::Meditation => "meditation",
            ResourceType::JournalPrompt => "journal_prompt",
            ResourceType::Worksheet => "worksheet",
            ResourceType::Infographic => "infographic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "article" => Some(ResourceType::Article),
            "video" => Some(ResourceType::Video),
            "audio" => Some(ResourceType::Audio),
            "exercise" => Some(ResourceType::Exercise),
            "meditation" => Some(ResourceType::Meditation),
            "journal_prompt" => Some(ResourceType::JournalPrompt),
            "worksheet" => Some(ResourceType::Worksheet),
            "infographic" => Some(ResourceType::Infographic),
            _ => None,
        }
    }
}

/// Staff action named in `/admin/resources/{id}/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAction {
    Feature,
    Unfeature,
    Publish,
    Unpublish,
}

impl ResourceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceAction::Feature => "feature",
            ResourceAction::Unfeature => "unfeature",
            ResourceAction::Publish => "publish",
            ResourceAction::Unpublish => "unpublish",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "feature" => Some(ResourceAction::Feature),
            "unfeature" => Some(ResourceAction::Unfeature),
            "publish" => Some(ResourceAction::Publish),
            "unpublish" => Some(ResourceAction::Unpublish),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceQuery {
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub topic: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceInput {
    pub title: String,
    pub resource_type: String,
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub author: String,
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub mental_health_topics: Vec<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

/// Partial update of the caller's interaction; absent fields are left as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionInput {
    pub liked: Option<bool>,
    pub saved: Option<bool>,
    pub completed: Option<bool>,
    pub rating: Option<i64>,
    pub progress_percentage: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractionResult {
    pub interaction: ResourceInteraction,
    pub resource: Resource,
}
