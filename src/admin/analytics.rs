use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use super::types::*;
use crate::database::models::PlatformAnalytics;
use crate::database::now;
use crate::error::AppError;
use crate::mood::round1;

const GROWTH_DAYS: i64 = 30;
const TREND_DAYS: i64 = 7;

fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Aggregate COUNT/AVG queries behind the staff dashboards.
pub struct AnalyticsService {
    pool: SqlitePool,
}

impl AnalyticsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn count_since(&self, sql: &str, since: DateTime<Utc>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(sql).bind(since).fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn count(&self, sql: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    pub async fn dashboard(&self) -> Result<StaffDashboard, AppError> {
        let now = now();
        let week_ago = now - Duration::days(7);
        let today = now.date_naive();
        let midnight = day_start(today);

        let users = UserStats {
            total: self.count("SELECT COUNT(*) FROM users").await?,
            active_last_7_days: self
                .count_since(
                    "SELECT COUNT(*) FROM users WHERE COALESCE(last_active, last_login) >= ?",
                    week_ago,
                )
                .await?,
            new_last_7_days: self
                .count_since("SELECT COUNT(*) FROM users WHERE created_at >= ?", week_ago)
                .await?,
        };
        let crisis = CrisisStats {
            active: self
                .count("SELECT COUNT(*) FROM crisis_alerts WHERE status IN ('detected', 'acknowledged')")
                .await?,
            last_7_days: self
                .count_since("SELECT COUNT(*) FROM crisis_alerts WHERE detected_at >= ?", week_ago)
                .await?,
        };
        let mood_entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mood_entries WHERE entry_date = ?")
            .bind(today)
            .fetch_one(&self.pool)
            .await?;
        let engagement_today = EngagementStats {
            chat_sessions: self
                .count_since("SELECT COUNT(*) FROM chat_sessions WHERE started_at >= ?", midnight)
                .await?,
            mood_entries,
        };
        let moderation = ModerationStats {
            pending_reports: self
                .count("SELECT COUNT(*) FROM forum_reports WHERE status = 'pending'")
                .await?,
            flagged_posts: self
                .count("SELECT COUNT(*) FROM forum_posts WHERE is_flagged = 1 AND is_published = 1")
                .await?,
        };
        let upcoming_confirmed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM counseling_appointments WHERE status = 'confirmed' AND scheduled_date >= ?",
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        Ok(StaffDashboard {
            users,
            crisis,
            engagement_today,
            moderation,
            appointments: AppointmentStats { upcoming_confirmed },
        })
    }

    pub async fn widget(&self, widget: Widget) -> Result<WidgetData, AppError> {
        let now = now();
        let today = now.date_naive();
        let midnight = day_start(today);

        let data = match widget {
            Widget::UserGrowth => {
                let since = day_start(today - Duration::days(GROWTH_DAYS - 1));
                let days = sqlx::query_as::<_, DailyCount>(
                    r#"
                    SELECT substr(created_at, 1, 10) AS date, COUNT(*) AS count
                    FROM users WHERE created_at >= ?
                    GROUP BY substr(created_at, 1, 10)
                    ORDER BY date ASC
                    "#,
                )
                .bind(since)
                .fetch_all(&self.pool)
                .await?;
                WidgetData::UserGrowth { days }
            }
            Widget::CrisisSummary => WidgetData::CrisisSummary {
                today: self
                    .count_since("SELECT COUNT(*) FROM crisis_alerts WHERE detected_at >= ?", midnight)
                    .await?,
                this_week: self
                    .count_since(
                        "SELECT COUNT(*) FROM crisis_alerts WHERE detected_at >= ?",
                        now - Duration::days(7),
                    )
                    .await?,
                active: self
                    .count("SELECT COUNT(*) FROM crisis_alerts WHERE status IN ('detected', 'acknowledged')")
                    .await?,
            },
            Widget::MoodTrends => {
                let since = today - Duration::days(TREND_DAYS - 1);
                let days = sqlx::query_as::<_, DailyAverage>(
                    r#"
                    SELECT entry_date AS date, AVG(mood_score) AS average
                    FROM mood_entries WHERE entry_date >= ?
                    GROUP BY entry_date
                    ORDER BY entry_date ASC
                    "#,
                )
                .bind(since)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|d| DailyAverage {
                    average: round1(d.average),
                    ..d
                })
                .collect();
                WidgetData::MoodTrends { days }
            }
            Widget::Engagement => {
                let mood_entries: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM mood_entries WHERE entry_date = ?")
                        .bind(today)
                        .fetch_one(&self.pool)
                        .await?;
                WidgetData::Engagement {
                    chat_sessions: self
                        .count_since("SELECT COUNT(*) FROM chat_sessions WHERE started_at >= ?", midnight)
                        .await?,
                    mood_entries,
                    forum_posts: self
                        .count_since("SELECT COUNT(*) FROM forum_posts WHERE created_at >= ?", midnight)
                        .await?,
                    active_users: self
                        .count_since(
                            "SELECT COUNT(*) FROM users WHERE COALESCE(last_active, last_login) >= ?",
                            midnight,
                        )
                        .await?,
                }
            }
        };
        Ok(data)
    }

    async fn count_between(&self, sql: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(sql)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_on(&self, sql: &str, day: NaiveDate) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(sql).bind(day).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Compute the platform metrics for `date` and store them, replacing
    /// any earlier snapshot for the same day.
    pub async fn snapshot(&self, date: NaiveDate) -> Result<PlatformAnalytics, AppError> {
        let from = day_start(date);
        let to = from + Duration::days(1);

        let total_users = self
            .count_since("SELECT COUNT(*) FROM users WHERE created_at < ?", to)
            .await?;
        let new_users = self
            .count_between("SELECT COUNT(*) FROM users WHERE created_at >= ? AND created_at < ?", from, to)
            .await?;
        let active_users = self
            .count_between(
                "SELECT COUNT(*) FROM users WHERE COALESCE(last_active, last_login) >= ? AND COALESCE(last_active, last_login) < ?",
                from,
                to,
            )
            .await?;
        let total_chat_sessions = self
            .count_between(
                "SELECT COUNT(*) FROM chat_sessions WHERE started_at >= ? AND started_at < ?",
                from,
                to,
            )
            .await?;
        let total_messages = self
            .count_between(
                "SELECT COUNT(*) FROM chat_messages WHERE created_at >= ? AND created_at < ?",
                from,
                to,
            )
            .await?;
        let total_mood_entries = self
            .count_on("SELECT COUNT(*) FROM mood_entries WHERE entry_date = ?", date)
            .await?;
        let total_forum_posts = self
            .count_between(
                "SELECT COUNT(*) FROM forum_posts WHERE created_at >= ? AND created_at < ?",
                from,
                to,
            )
            .await?;
        let crisis_alerts = self
            .count_between(
                "SELECT COUNT(*) FROM crisis_alerts WHERE detected_at >= ? AND detected_at < ?",
                from,
                to,
            )
            .await?;
        let crisis_interventions = self
            .count_between(
                "SELECT COUNT(*) FROM crisis_alerts WHERE resolved_at >= ? AND resolved_at < ?",
                from,
                to,
            )
            .await?;
        let total_appointments = self
            .count_on("SELECT COUNT(*) FROM counseling_appointments WHERE scheduled_date = ?", date)
            .await?;
        let completed_appointments = self
            .count_on(
                "SELECT COUNT(*) FROM counseling_appointments WHERE scheduled_date = ? AND status = 'completed'",
                date,
            )
            .await?;
        let average_mood_score: Option<f64> =
            sqlx::query_scalar("SELECT AVG(mood_score) FROM mood_entries WHERE entry_date = ?")
                .bind(date)
                .fetch_one(&self.pool)
                .await?;

        let by_country: Vec<(String, i64)> = sqlx::query_as(
            "SELECT country, COUNT(*) FROM users WHERE created_at < ? GROUP BY country ORDER BY country",
        )
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        let users_by_country: BTreeMap<String, i64> = by_country.into_iter().collect();

        sqlx::query(
            r#"
            INSERT INTO platform_analytics
            (date, total_users, new_users, active_users, total_chat_sessions, total_messages, total_mood_entries,
             total_forum_posts, crisis_alerts, crisis_interventions, total_appointments, completed_appointments,
             users_by_country, average_mood_score, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(date) DO UPDATE SET
                total_users = excluded.total_users,
                new_users = excluded.new_users,
                active_users = excluded.active_users,
                total_chat_sessions = excluded.total_chat_sessions,
                total_messages = excluded.total_messages,
                total_mood_entries = excluded.total_mood_entries,
                total_forum_posts = excluded.total_forum_posts,
                crisis_alerts = excluded.crisis_alerts,
                crisis_interventions = excluded.crisis_interventions,
                total_appointments = excluded.total_appointments,
                completed_appointments = excluded.completed_appointments,
                users_by_country = excluded.users_by_country,
                average_mood_score = excluded.average_mood_score
            "#,
        )
        .bind(date)
        .bind(total_users)
        .bind(new_users)
        .bind(active_users)
        .bind(total_chat_sessions)
        .bind(total_messages)
        .bind(total_mood_entries)
        .bind(total_forum_posts)
        .bind(crisis_alerts)
        .bind(crisis_interventions)
        .bind(total_appointments)
        .bind(completed_appointments)
        .bind(serde_json::to_string(&users_by_country)?)
        .bind(average_mood_score.map(round1))
        .bind(now())
        .execute(&self.pool)
        .await?;

        info!(
            "Analytics snapshot for {}: {} users, {} crisis alerts",
            date, total_users, crisis_alerts
        );
        self.get_snapshot(date).await
    }

    pub async fn get_snapshot(&self, date: NaiveDate) -> Result<PlatformAnalytics, AppError> {
        sqlx::query_as::<_, PlatformAnalytics>("SELECT * FROM platform_analytics WHERE date = ?")
            .bind(date)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Analytics snapshot"))
    }
}
