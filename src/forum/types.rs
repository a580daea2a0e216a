use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::models::{Achievement, ForumPost, ForumReply};

pub const ANONYMOUS_NAME: &str = "Anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Spam,
    Harassment,
    HateSpeech,
    SelfHarm,
    Misinformation,
    Inappropriate,
    Other,
}

impl ReportReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportReason::Spam => "spam",
            ReportReason::Harassment => "harassment",
            ReportReason::HateSpeech => "hate_speech",
            ReportReason::SelfHarm => "self_harm",
            ReportReason::Misinformation => "misinformation",
            ReportReason::Inappropriate => "inappropriate",
            ReportReason::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "spam" => Some(ReportReason::Spam),
            "harassment" => Some(ReportReason::Harassment),
            "hate_speech" => Some(ReportReason::HateSpeech),
            "self_harm" => Some(ReportReason::SelfHarm),
            "misinformation" => Some(ReportReason::Misinformation),
            "inappropriate" => Some(ReportReason::Inappropriate),
            "other" => Some(ReportReason::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReportStatus::Pending),
            "resolved" => Some(ReportStatus::Resolved),
            "dismissed" => Some(ReportStatus::Dismissed),
            _ => None,
        }
    }
}

/// Moderator action on a post, as named in `/admin/forum/posts/{id}/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    Publish,
    Unpublish,
    Pin,
    Unpin,
    Lock,
    Unlock,
}

impl PostAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostAction::Publish => "publish",
            PostAction::Unpublish => "unpublish",
            PostAction::Pin => "pin",
            PostAction::Unpin => "unpin",
            PostAction::Lock => "lock",
            PostAction::Unlock => "unlock",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "publish" => Some(PostAction::Publish),
            "unpublish" => Some(PostAction::Unpublish),
            "pin" => Some(PostAction::Pin),
            "unpin" => Some(PostAction::Unpin),
            "lock" => Some(PostAction::Lock),
            "unlock" => Some(PostAction::Unlock),
            _ => None,
        }
    }
}

/// Moderator action on a reply, as named in `/admin/forum/replies/{id}/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyAction {
    Publish,
    Unpublish,
}

impl ReplyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyAction::Publish => "publish",
            ReplyAction::Unpublish => "unpublish",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "publish" => Some(ReplyAction::Publish),
            "unpublish" => Some(ReplyAction::Unpublish),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostInput {
    pub category_id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyInput {
    pub content: String,
    #[serde(default)]
    pub is_anonymous: bool,
    pub parent_reply_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportInput {
    pub post_id: Option<String>,
    pub reply_id: Option<String>,
    pub reason: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewReport {
    pub status: String,
    #[serde(default)]
    pub action_taken: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModerationNote {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostQuery {
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct PostRow {
    #[sqlx(flatten)]
    pub post: ForumPost,
    pub author_username: String,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct ReplyRow {
    #[sqlx(flatten)]
    pub reply: ForumReply,
    pub author_username: String,
}

/// A post as shown to readers; the author is hidden on anonymous posts.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: ForumPost,
    pub author_id: Option<String>,
    pub author_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyView {
    #[serde(flatten)]
    pub reply: ForumReply,
    pub author_id: Option<String>,
    pub author_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub replies: Vec<ReplyView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedPost {
    pub post: PostView,
    pub flagged: bool,
    pub pending_review: bool,
    pub new_achievements: Vec<Achievement>,
}
