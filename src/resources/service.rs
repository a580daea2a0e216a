use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::types::*;
use crate::audit::AuditLogger;
use crate::database::models::{Resource, ResourceInteraction};
use crate::database::{new_id, now};
use crate::error::AppError;
use crate::validation::{max_length, require_choice, require_optional_range, require_text};

const SEARCH_LIMIT: i64 = 100;

fn clean_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Published library content plus each user's likes, ratings and progress.
pub struct ResourceLibrary {
    pool: SqlitePool,
}

impl ResourceLibrary {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Published resources, featured first then most viewed.
    pub async fn search(&self, query: &ResourceQuery) -> Result<Vec<Resource>, AppError> {
        let resource_type = match query.resource_type.as_deref().filter(|t| !t.is_empty()) {
            Some(t) => Some(require_choice("resource type", t, ResourceType::from_str)?.as_str()),
            None => None,
        };
        let topic = query
            .topic
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        let text = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

        let resources = sqlx::query_as::<_, Resource>(
            r#"
            SELECT * FROM resources
            WHERE is_published = 1
              AND (? IS NULL OR resource_type = ?)
              AND (? IS NULL OR EXISTS (SELECT 1 FROM json_each(resources.mental_health_topics) WHERE value = ?))
              AND (? IS NULL OR title LIKE '%' || ? || '%' OR description LIKE '%' || ? || '%')
            ORDER BY is_featured DESC, view_count DESC, created_at DESC
            LIMIT ?
            "#,
        )
        .bind(resource_type)
        .bind(resource_type)
        .bind(topic.as_deref())
        .bind(topic.as_deref())
        .bind(text)
        .bind(text)
        .bind(text)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(resources)
    }

    pub async fn featured(&self, limit: i64) -> Result<Vec<Resource>, AppError> {
        let resources = sqlx::query_as::<_, Resource>(
            r#"
            SELECT * FROM resources
            WHERE is_published = 1 AND is_featured = 1
            ORDER BY view_count DESC, created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(resources)
    }

    async fn find(&self, resource_id: &str) -> Result<Resource, AppError> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = ?")
            .bind(resource_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Resource"))
    }

    async fn find_published(&self, resource_id: &str) -> Result<Resource, AppError> {
        let resource = self.find(resource_id).await?;
        if !resource.is_published {
            return Err(AppError::not_found("Resource"));
        }
        Ok(resource)
    }

    /// Open a resource: counts the view and, for a signed-in reader, marks
    /// it viewed.
    pub async fn get(&self, resource_id: &str, reader: Option<&str>) -> Result<Resource, AppError> {
        self.find_published(resource_id).await?;
        sqlx::query("UPDATE resources SET view_count = view_count + 1 WHERE id = ?")
            .bind(resource_id)
            .execute(&self.pool)
            .await?;

        if let Some(user_id) = reader {
            sqlx::query(
                r#"
                INSERT INTO user_resource_interactions (user_id, resource_id, viewed, updated_at)
                VALUES (?, ?, 1, ?)
                ON CONFLICT(user_id, resource_id) DO UPDATE SET viewed = 1, updated_at = excluded.updated_at
                "#,
            )
            .bind(user_id)
            .bind(resource_id)
            .bind(now())
            .execute(&self.pool)
            .await?;
        }

        self.find(resource_id).await
    }

    pub async fn interaction(
        &self,
        user_id: &str,
        resource_id: &str,
    ) -> Result<Option<ResourceInteraction>, AppError> {
        let row = sqlx::query_as::<_, ResourceInteraction>(
            "SELECT * FROM user_resource_interactions WHERE user_id = ? AND resource_id = ?",
        )
        .bind(user_id)
        .bind(resource_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn interact(
        &self,
        user_id: &str,
        resource_id: &str,
        input: InteractionInput,
    ) -> Result<InteractionResult, AppError> {
        self.find_published(resource_id).await?;
        require_optional_range("Rating", input.rating, 1, 5)?;
        require_optional_range("Progress", input.progress_percentage, 0, 100)?;

        let existing = self.interaction(user_id, resource_id).await?;
        let was_liked = existing.as_ref().map(|i| i.liked).unwrap_or(false);
        let liked = input.liked.unwrap_or(was_liked);
        let saved = input
            .saved
            .unwrap_or_else(|| existing.as_ref().map(|i| i.saved).unwrap_or(false));
        let progress = input
            .progress_percentage
            .unwrap_or_else(|| existing.as_ref().map(|i| i.progress_percentage).unwrap_or(0));
        // an explicit flag wins; otherwise reaching 100% now completes it
        let completed = input.completed.unwrap_or_else(|| {
            existing.as_ref().map(|i| i.completed).unwrap_or(false) || input.progress_percentage == Some(100)
        });
        let progress = if completed { 100 } else { progress };
        let rating = input.rating.or_else(|| existing.as_ref().and_then(|i| i.rating));

        sqlx::query(
            r#"
            INSERT INTO user_resource_interactions
            (user_id, resource_id, viewed, completed, liked, saved, rating, progress_percentage, updated_at)
            VALUES (?, ?, 1, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, resource_id) DO UPDATE SET
                viewed = 1,
                completed = excluded.completed,
                liked = excluded.liked,
                saved = excluded.saved,
                rating = excluded.rating,
                progress_percentage = excluded.progress_percentage,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(resource_id)
        .bind(completed)
        .bind(liked)
        .bind(saved)
        .bind(rating)
        .bind(progress)
        .bind(now())
        .execute(&self.pool)
        .await?;

        if liked != was_liked {
            let delta: i64 = if liked { 1 } else { -1 };
            sqlx::query("UPDATE resources SET like_count = MAX(like_count + ?, 0) WHERE id = ?")
                .bind(delta)
                .bind(resource_id)
                .execute(&self.pool)
                .await?;
        }

        if input.rating.is_some() {
            let average: Option<f64> = sqlx::query_scalar(
                "SELECT AVG(rating) FROM user_resource_interactions WHERE resource_id = ? AND rating IS NOT NULL",
            )
            .bind(resource_id)
            .fetch_one(&self.pool)
            .await?;
            sqlx::query("UPDATE resources SET average_rating = ? WHERE id = ?")
                .bind(average.map(|a| (a * 100.0).round() / 100.0).unwrap_or(0.0))
                .bind(resource_id)
                .execute(&self.pool)
                .await?;
        }

        debug!("User {} updated interaction with resource {}", user_id, resource_id);
        let interaction = self
            .interaction(user_id, resource_id)
            .await?
            .ok_or_else(|| AppError::Internal("interaction row missing after upsert".to_string()))?;
        let resource = self.find(resource_id).await?;
        Ok(InteractionResult { interaction, resource })
    }

    pub async fn create(&self, staff_id: &str, input: ResourceInput) -> Result<Resource, AppError> {
        let resource_type = require_choice("resource type", &input.resource_type, ResourceType::from_str)?;
        let title = require_text("Title", &input.title, 300)?;
        let description = require_text("Description", &input.description, 5000)?;
        max_length("URL", &input.url, 500)?;
        max_length("Author", &input.author, 200)?;
        require_optional_range("Duration", input.duration_minutes, 1, 1440)?;
        let language = input
            .language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or("en");

        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO resources
            (id, title, resource_type, description, content, url, author, duration_minutes, tags,
             mental_health_topics, language, is_featured, is_published, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(&id)
        .bind(&title)
        .bind(resource_type.as_str())
        .bind(&description)
        .bind(input.content.trim())
        .bind(input.url.trim())
        .bind(input.author.trim())
        .bind(input.duration_minutes)
        .bind(serde_json::to_string(&clean_list(&input.tags))?)
        .bind(serde_json::to_string(&clean_list(&input.mental_health_topics))?)
        .bind(language)
        .bind(input.is_featured)
        .bind(now())
        .execute(&self.pool)
        .await?;

        AuditLogger::new(self.pool.clone())
            .record(
                Some(staff_id),
                "resource.create",
                "Resource",
                &id,
                json!({ "title": title, "resource_type": resource_type.as_str() }),
            )
            .await?;

        info!("Resource {} created by {}", id, staff_id);
        self.find(&id).await
    }

    pub async fn apply_action(
        &self,
        staff_id: &str,
        resource_id: &str,
        action: ResourceAction,
    ) -> Result<Resource, AppError> {
        self.find(resource_id).await?;
        let sql = match action {
            ResourceAction::Feature => "UPDATE resources SET is_featured = 1 WHERE id = ?",
            ResourceAction::Unfeature => "UPDATE resources SET is_featured = 0 WHERE id = ?",
            ResourceAction::Publish => "UPDATE resources SET is_published = 1 WHERE id = ?",
            ResourceAction::Unpublish => "UPDATE resources SET is_published = 0 WHERE id = ?",
        };
        sqlx::query(sql).bind(resource_id).execute(&self.pool).await?;

        AuditLogger::new(self.pool.clone())
            .record(
                Some(staff_id),
                &format!("resource.{}", action.as_str()),
                "Resource",
                resource_id,
                json!({}),
            )
            .await?;
        self.find(resource_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_lists_are_normalised() {
        let cleaned = clean_list(&["  Anxiety ".to_string(), "".to_string(), "SLEEP".to_string()]);
        assert_eq!(cleaned, vec!["anxiety", "sleep"]);
    }
}
