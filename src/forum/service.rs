use std::sync::Arc;

use serde_json::json;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::moderation::{screen, Screening};
use super::types::*;
use crate::audit::AuditLogger;
use crate::config::AppConfig;
use crate::crisis::{CrisisService, CrisisSource};
use crate::database::models::{ForumCategory, ForumReport};
use crate::database::{new_id, now};
use crate::error::AppError;
use crate::gamification::GamificationService;
use crate::validation::{require_choice, require_text};

const DEFAULT_LIST_LIMIT: i64 = 50;
const POST_SELECT: &str = r#"
    SELECT p.*, u.username AS author_username
    FROM forum_posts p JOIN users u ON u.id = p.author_id
"#;
const REPLY_SELECT: &str = r#"
    SELECT r.*, u.username AS author_username
    FROM forum_replies r JOIN users u ON u.id = r.author_id
"#;

/// Who is reading: decides whether anonymous authors and unpublished
/// content are visible.
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    pub user_id: Option<&'a str>,
    pub is_staff: bool,
}

impl Viewer<'_> {
    pub fn anonymous() -> Self {
        Viewer {
            user_id: None,
            is_staff: false,
        }
    }
}

/// Community forum: categories, posts, replies, likes and reports.
pub struct ForumService {
    pool: SqlitePool,
    config: Arc<AppConfig>,
}

impl ForumService {
    pub fn new(pool: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { pool, config }
    }

    pub async fn categories(&self) -> Result<Vec<ForumCategory>, AppError> {
        let categories = sqlx::query_as::<_, ForumCategory>(
            r#"
            SELECT c.*,
                   (SELECT COUNT(*) FROM forum_posts p WHERE p.category_id = c.id AND p.is_published = 1) AS post_count
            FROM forum_categories c
            WHERE c.is_active = 1
            ORDER BY c.display_order ASC, c.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn create_post(&self, author_id: &str, input: PostInput) -> Result<CreatedPost, AppError> {
        let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM forum_categories WHERE id = ?")
            .bind(input.category_id)
            .fetch_optional(&self.pool)
            .await?;
        if active != Some(true) {
            return Err(AppError::not_found("Forum category"));
        }

        let title = require_text("Title", &input.title, 300)?;
        let content = require_text("Content", &input.content, 20_000)?;
        let screening = screen(&self.config.moderation, &format!("{}\n{}", title, content));
        let status = if screening.hold_for_review {
            ModerationStatus::Pending
        } else {
            ModerationStatus::Approved
        };

        let id = new_id();
        let created_at = now();
        sqlx::query(
            r#"
            INSERT INTO forum_posts
            (id, category_id, author_id, title, content, is_anonymous, is_published, is_flagged,
             moderation_status, toxicity_score, ai_flagged, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(input.category_id)
        .bind(author_id)
        .bind(&title)
        .bind(&content)
        .bind(input.is_anonymous)
        .bind(!screening.hold_for_review)
        .bind(screening.flagged)
        .bind(status.as_str())
        .bind(screening.toxicity_score)
        .bind(screening.flagged)
        .bind(created_at)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        if screening.flagged {
            self.log_automatic_flag(Some(&id), None, &screening).await?;
        }

        CrisisService::new(self.pool.clone(), self.config.clone())
            .scan_and_raise(author_id, CrisisSource::Forum, &content)
            .await?;
        let new_achievements = GamificationService::new(self.pool.clone(), self.config.clone())
            .evaluate(author_id)
            .await?;

        info!("Forum post {} created (status {})", id, status.as_str());
        let viewer = Viewer {
            user_id: Some(author_id),
            is_staff: false,
        };
        Ok(CreatedPost {
            post: self.post_view(&id, viewer).await?,
            flagged: screening.flagged,
            pending_review: screening.hold_for_review,
            new_achievements,
        })
    }

    async fn log_automatic_flag(
        &self,
        post_id: Option<&str>,
        reply_id: Option<&str>,
        screening: &Screening,
    ) -> Result<(), AppError> {
        let action = if screening.hold_for_review { "hold" } else { "flag" };
        sqlx::query(
            r#"
            INSERT INTO content_moderation_logs
            (moderator_id, forum_post_id, forum_reply_id, action_type, reason, ai_suggested, ai_confidence, created_at)
            VALUES (NULL, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(post_id)
        .bind(reply_id)
        .bind(action)
        .bind("Automatic toxicity screening")
        .bind(screening.toxicity_score)
        .bind(now())
        .execute(&self.pool)
        .await?;
        warn!(
            "Content auto-{} (score {:.2}) post={:?} reply={:?}",
            action,
            screening.toxicity_score.unwrap_or_default(),
            post_id,
            reply_id
        );
        Ok(())
    }

    fn to_post_view(row: PostRow, viewer: Viewer<'_>) -> PostView {
        let own = viewer.user_id == Some(row.post.author_id.as_str());
        let reveal = !row.post.is_anonymous || viewer.is_staff || own;
        PostView {
            author_id: reveal.then(|| row.post.author_id.clone()),
            author_name: if row.post.is_anonymous && !viewer.is_staff {
                ANONYMOUS_NAME.to_string()
            } else {
                row.author_username
            },
            post: row.post,
        }
    }

    fn to_reply_view(row: ReplyRow, viewer: Viewer<'_>) -> ReplyView {
        let own = viewer.user_id == Some(row.reply.author_id.as_str());
        let reveal = !row.reply.is_anonymous || viewer.is_staff || own;
        ReplyView {
            author_id: reveal.then(|| row.reply.author_id.clone()),
            author_name: if row.reply.is_anonymous && !viewer.is_staff {
                ANONYMOUS_NAME.to_string()
            } else {
                row.author_username
            },
            reply: row.reply,
        }
    }

    async fn post_view(&self, post_id: &str, viewer: Viewer<'_>) -> Result<PostView, AppError> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{} WHERE p.id = ?", POST_SELECT))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))?;
        Ok(Self::to_post_view(row, viewer))
    }

    /// Published posts, pinned first then newest.
    pub async fn list_posts(&self, query: PostQuery, viewer: Viewer<'_>) -> Result<Vec<PostView>, AppError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 200);
        let category = query.category.as_deref().filter(|c| !c.is_empty());
        let sql = format!(
            r#"{}
            WHERE p.is_published = 1
              AND (? IS NULL OR p.category_id = (SELECT id FROM forum_categories WHERE slug = ?))
            ORDER BY p.is_pinned DESC, p.created_at DESC
            LIMIT ?"#,
            POST_SELECT
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(category)
            .bind(category)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|row| Self::to_post_view(row, viewer)).collect())
    }

    pub async fn recent_posts(&self, limit: i64) -> Result<Vec<PostView>, AppError> {
        let sql = format!(
            "{} WHERE p.is_published = 1 ORDER BY p.created_at DESC LIMIT ?",
            POST_SELECT
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| Self::to_post_view(row, Viewer::anonymous()))
            .collect())
    }

    pub async fn popular_posts(&self, limit: i64) -> Result<Vec<PostView>, AppError> {
        let sql = format!(
            "{} WHERE p.is_published = 1 ORDER BY p.like_count DESC, p.reply_count DESC, p.created_at DESC LIMIT ?",
            POST_SELECT
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| Self::to_post_view(row, Viewer::anonymous()))
            .collect())
    }

    /// Open a post: counts a view and returns its published replies.
    pub async fn get_post(&self, post_id: &str, viewer: Viewer<'_>) -> Result<PostDetail, AppError> {
        let post = self.post_view(post_id, viewer).await?;
        let own = viewer.user_id == Some(post.post.author_id.as_str());
        if !post.post.is_published && !viewer.is_staff && !own {
            return Err(AppError::not_found("Post"));
        }

        sqlx::query("UPDATE forum_posts SET view_count = view_count + 1 WHERE id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        let sql = format!(
            "{} WHERE r.post_id = ? AND (r.is_published = 1 OR ?) ORDER BY r.created_at ASC",
            REPLY_SELECT
        );
        let replies = sqlx::query_as::<_, ReplyRow>(&sql)
            .bind(post_id)
            .bind(viewer.is_staff)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| Self::to_reply_view(row, viewer))
            .collect();

        let mut post = post;
        post.post.view_count += 1;
        Ok(PostDetail { post, replies })
    }

    pub async fn reply(&self, author_id: &str, post_id: &str, input: ReplyInput) -> Result<ReplyView, AppError> {
        let post = self.post_view(post_id, Viewer::anonymous()).await?;
        if !post.post.is_published {
            return Err(AppError::not_found("Post"));
        }
        if post.post.is_locked {
            return Err(AppError::validation("This post is locked and no longer accepts replies"));
        }

        if let Some(parent_id) = input.parent_reply_id.as_deref() {
            let parent_post: Option<String> = sqlx::query_scalar("SELECT post_id FROM forum_replies WHERE id = ?")
                .bind(parent_id)
                .fetch_optional(&self.pool)
                .await?;
            if parent_post.as_deref() != Some(post_id) {
                return Err(AppError::validation("Parent reply does not belong to this post"));
            }
        }

        let content = require_text("Content", &input.content, 10_000)?;
        let screening = screen(&self.config.moderation, &content);

        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO forum_replies
            (id, post_id, author_id, parent_reply_id, content, is_anonymous, is_published, is_flagged, toxicity_score, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(post_id)
        .bind(author_id)
        .bind(input.parent_reply_id.as_deref())
        .bind(&content)
        .bind(input.is_anonymous)
        .bind(!screening.hold_for_review)
        .bind(screening.flagged)
        .bind(screening.toxicity_score)
        .bind(now())
        .execute(&self.pool)
        .await?;

        if !screening.hold_for_review {
            sqlx::query("UPDATE forum_posts SET reply_count = reply_count + 1, updated_at = ? WHERE id = ?")
                .bind(now())
                .bind(post_id)
                .execute(&self.pool)
                .await?;
        }
        if screening.flagged {
            self.log_automatic_flag(None, Some(&id), &screening).await?;
        }

        CrisisService::new(self.pool.clone(), self.config.clone())
            .scan_and_raise(author_id, CrisisSource::Forum, &content)
            .await?;

        let row = sqlx::query_as::<_, ReplyRow>(&format!("{} WHERE r.id = ?", REPLY_SELECT))
            .bind(&id)
            .fetch_one(&self.pool)
            .await?;
        let viewer = Viewer {
            user_id: Some(author_id),
            is_staff: false,
        };
        Ok(Self::to_reply_view(row, viewer))
    }

    pub async fn like_post(&self, user_id: &str, post_id: &str) -> Result<i64, AppError> {
        let published: Option<bool> = sqlx::query_scalar("SELECT is_published FROM forum_posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;
        if published != Some(true) {
            return Err(AppError::not_found("Post"));
        }

        let already: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM forum_likes WHERE user_id = ? AND post_id = ?)")
                .bind(user_id)
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;
        if already {
            return Err(AppError::Conflict("You already liked this post".to_string()));
        }

        sqlx::query("INSERT INTO forum_likes (user_id, post_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(post_id)
            .bind(now())
            .execute(&self.pool)
            .await?;
        let likes: i64 =
            sqlx::query_scalar("UPDATE forum_posts SET like_count = like_count + 1 WHERE id = ? RETURNING like_count")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(likes)
    }

    pub async fn like_reply(&self, user_id: &str, reply_id: &str) -> Result<i64, AppError> {
        let published: Option<bool> = sqlx::query_scalar("SELECT is_published FROM forum_replies WHERE id = ?")
            .bind(reply_id)
            .fetch_optional(&self.pool)
            .await?;
        if published != Some(true) {
            return Err(AppError::not_found("Reply"));
        }

        let already: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM forum_likes WHERE user_id = ? AND reply_id = ?)")
                .bind(user_id)
                .bind(reply_id)
                .fetch_one(&self.pool)
                .await?;
        if already {
            return Err(AppError::Conflict("You already liked this reply".to_string()));
        }

        sqlx::query("INSERT INTO forum_likes (user_id, reply_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(reply_id)
            .bind(now())
            .execute(&self.pool)
            .await?;
        let likes: i64 =
            sqlx::query_scalar("UPDATE forum_replies SET like_count = like_count + 1 WHERE id = ? RETURNING like_count")
                .bind(reply_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(likes)
    }

    /// File a report against exactly one post or reply.
    pub async fn report(&self, reporter_id: &str, input: ReportInput) -> Result<ForumReport, AppError> {
        let reason = require_choice("report reason", &input.reason, ReportReason::from_str)?;
        let description = require_text("Description", &input.description, 2000)?;

        let (table, target) = match (input.post_id.as_deref(), input.reply_id.as_deref()) {
            (Some(post_id), None) => ("forum_posts", post_id),
            (None, Some(reply_id)) => ("forum_replies", reply_id),
            _ => return Err(AppError::validation("Report exactly one post or one reply")),
        };
        let exists: bool = sqlx::query_scalar(&format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", table))
            .bind(target)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(AppError::not_found("Reported content"));
        }

        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO forum_reports (id, reporter_id, post_id, reply_id, reason, description, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(reporter_id)
        .bind(input.post_id.as_deref())
        .bind(input.reply_id.as_deref())
        .bind(reason.as_str())
        .bind(&description)
        .bind(ReportStatus::Pending.as_str())
        .bind(now())
        .execute(&self.pool)
        .await?;

        info!("Report {} filed ({})", id, reason.as_str());
        self.get_report(&id).await
    }

    async fn get_report(&self, report_id: &str) -> Result<ForumReport, AppError> {
        sqlx::query_as::<_, ForumReport>("SELECT * FROM forum_reports WHERE id = ?")
            .bind(report_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Report"))
    }

    pub async fn list_reports(&self, status: Option<ReportStatus>) -> Result<Vec<ForumReport>, AppError> {
        let reports = sqlx::query_as::<_, ForumReport>(
            "SELECT * FROM forum_reports WHERE (? IS NULL OR status = ?) ORDER BY created_at ASC",
        )
        .bind(status.map(|s| s.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }

    /// Staff moderation of a post.
    pub async fn moderate_post(
        &self,
        moderator_id: &str,
        post_id: &str,
        action: PostAction,
        note: ModerationNote,
    ) -> Result<PostView, AppError> {
        self.post_view(post_id, Viewer::anonymous()).await?;

        let sql = match action {
            PostAction::Publish => {
                "UPDATE forum_posts SET is_published = 1, moderation_status = 'approved', updated_at = ? WHERE id = ?"
            }
            PostAction::Unpublish => {
                "UPDATE forum_posts SET is_published = 0, moderation_status = 'rejected', updated_at = ? WHERE id = ?"
            }
            PostAction::Pin => "UPDATE forum_posts SET is_pinned = 1, updated_at = ? WHERE id = ?",
            PostAction::Unpin => "UPDATE forum_posts SET is_pinned = 0, updated_at = ? WHERE id = ?",
            PostAction::Lock => "UPDATE forum_posts SET is_locked = 1, updated_at = ? WHERE id = ?",
            PostAction::Unlock => "UPDATE forum_posts SET is_locked = 0, updated_at = ? WHERE id = ?",
        };
        sqlx::query(sql)
            .bind(now())
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO content_moderation_logs (moderator_id, forum_post_id, action_type, reason, ai_suggested, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(moderator_id)
        .bind(post_id)
        .bind(action.as_str())
        .bind(note.reason.trim())
        .bind(now())
        .execute(&self.pool)
        .await?;

        AuditLogger::new(self.pool.clone())
            .record(
                Some(moderator_id),
                &format!("forum_post.{}", action.as_str()),
                "ForumPost",
                post_id,
                json!({ "reason": note.reason.trim() }),
            )
            .await?;

        info!("Moderator {} applied {} to post {}", moderator_id, action.as_str(), post_id);
        let viewer = Viewer {
            user_id: Some(moderator_id),
            is_staff: true,
        };
        self.post_view(post_id, viewer).await
    }

    /// Replies held back by the toxicity screen, oldest first.
    pub async fn held_replies(&self) -> Result<Vec<ReplyView>, AppError> {
        let rows = sqlx::query_as::<_, ReplyRow>(&format!(
            "{} WHERE r.is_published = 0 ORDER BY r.created_at ASC",
            REPLY_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        let viewer = Viewer {
            user_id: None,
            is_staff: true,
        };
        Ok(rows.into_iter().map(|row| Self::to_reply_view(row, viewer)).collect())
    }

    /// Staff moderation of a reply. `reply_count` on the post follows the
    /// number of published replies.
    pub async fn moderate_reply(
        &self,
        moderator_id: &str,
        reply_id: &str,
        action: ReplyAction,
        note: ModerationNote,
    ) -> Result<ReplyView, AppError> {
        let post_id: String = sqlx::query_scalar("SELECT post_id FROM forum_replies WHERE id = ?")
            .bind(reply_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Reply"))?;

        let (publish, delta) = match action {
            ReplyAction::Publish => (true, 1),
            ReplyAction::Unpublish => (false, -1),
        };

        let mut tx = self.pool.begin().await?;
        let changed = sqlx::query("UPDATE forum_replies SET is_published = ? WHERE id = ? AND is_published != ?")
            .bind(publish)
            .bind(reply_id)
            .bind(publish)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if changed == 1 {
            sqlx::query("UPDATE forum_posts SET reply_count = MAX(reply_count + ?, 0), updated_at = ? WHERE id = ?")
                .bind(delta)
                .bind(now())
                .bind(&post_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO content_moderation_logs (moderator_id, forum_reply_id, action_type, reason, ai_suggested, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(moderator_id)
        .bind(reply_id)
        .bind(action.as_str())
        .bind(note.reason.trim())
        .bind(now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        AuditLogger::new(self.pool.clone())
            .record(
                Some(moderator_id),
                &format!("forum_reply.{}", action.as_str()),
                "ForumReply",
                reply_id,
                json!({ "post_id": post_id, "reason": note.reason.trim() }),
            )
            .await?;

        info!("Moderator {} applied {} to reply {}", moderator_id, action.as_str(), reply_id);
        let row = sqlx::query_as::<_, ReplyRow>(&format!("{} WHERE r.id = ?", REPLY_SELECT))
            .bind(reply_id)
            .fetch_one(&self.pool)
            .await?;
        let viewer = Viewer {
            user_id: Some(moderator_id),
            is_staff: true,
        };
        Ok(Self::to_reply_view(row, viewer))
    }

    pub async fn review_report(
        &self,
        moderator_id: &str,
        report_id: &str,
        review: ReviewReport,
    ) -> Result<ForumReport, AppError> {
        let status = match ReportStatus::from_str(&review.status) {
            Some(status @ (ReportStatus::Resolved | ReportStatus::Dismissed)) => status,
            _ => return Err(AppError::validation("Status must be resolved or dismissed")),
        };
        let report = self.get_report(report_id).await?;
        if report.status != ReportStatus::Pending.as_str() {
            return Err(AppError::validation("Report has already been reviewed"));
        }

        sqlx::query(
            "UPDATE forum_reports SET status = ?, reviewed_by = ?, action_taken = ?, reviewed_at = ? WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(moderator_id)
        .bind(review.action_taken.trim())
        .bind(now())
        .bind(report_id)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO content_moderation_logs
            (moderator_id, forum_post_id, forum_reply_id, action_type, reason, ai_suggested, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(moderator_id)
        .bind(&report.post_id)
        .bind(&report.reply_id)
        .bind(format!("report_{}", status.as_str()))
        .bind(review.action_taken.trim())
        .bind(now())
        .execute(&self.pool)
        .await?;

        AuditLogger::new(self.pool.clone())
            .record(
                Some(moderator_id),
                &format!("forum_report.{}", status.as_str()),
                "ForumReport",
                report_id,
                json!({ "reason": report.reason, "action_taken": review.action_taken.trim() }),
            )
            .await?;

        self.get_report(report_id).await
    }
}
