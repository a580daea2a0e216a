use mental_health_platform::error::AppError;
use mental_health_platform::forum::{
    ForumService, ModerationNote, PostAction, PostInput, PostQuery, ReplyAction, ReplyInput, ReportInput,
    ReportStatus, ReviewReport, Viewer,
};
use mental_health_platform::resources::{
    InteractionInput, ResourceAction, ResourceInput, ResourceLibrary, ResourceQuery,
};

mod common;
use common::*;

fn post(title: &str, content: &str, anonymous: bool) -> PostInput {
    PostInput {
        category_id: 1,
        title: title.to_string(),
        content: content.to_string(),
        is_anonymous: anonymous,
    }
}

fn resource(title: &str) -> ResourceInput {
    ResourceInput {
        title: title.to_string(),
        resource_type: "article".to_string(),
        description: "Practical advice".to_string(),
        content: "Start small.".to_string(),
        url: String::new(),
        author: "Platform team".to_string(),
        duration_minutes: Some(5),
        tags: vec!["Sleep".to_string()],
        mental_health_topics: vec!["Anxiety".to_string(), " Stress ".to_string()],
        language: None,
        is_featured: false,
    }
}

#[tokio::test]
async fn test_anonymous_author_hidden_from_other_members() {
    let db = setup_test_db().await;
    let author = create_user(db.pool(), "amina", "student").await;
    let reader = create_user(db.pool(), "brian", "student").await;
    let forum = ForumService::new(db.pool().clone(), test_config());

    let created = forum
        .create_post(&author.id, post("Exam nerves", "How do you all cope before exams?", true))
        .await
        .unwrap();
    assert!(!created.flagged);

    let as_reader = forum
        .get_post(
            &created.post.post.id,
            Viewer {
                user_id: Some(&reader.id),
                is_staff: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(as_reader.post.author_id, None);
    assert_eq!(as_reader.post.author_name, "Anonymous");

    let as_author = forum
        .get_post(
            &created.post.post.id,
            Viewer {
                user_id: Some(&author.id),
                is_staff: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(as_author.post.author_id.as_deref(), Some(author.id.as_str()));
}

#[tokio::test]
async fn test_toxic_post_is_held_for_review() {
    let db = setup_test_db().await;
    let author = create_user(db.pool(), "troll", "adult").await;
    let moderator = create_admin(db.pool(), "root").await;
    let forum = ForumService::new(db.pool().clone(), test_config());

    let created = forum
        .create_post(
            &author.id,
            post("Listen", "You are a stupid pathetic loser, shut up", false),
        )
        .await
        .unwrap();
    assert!(created.flagged);
    assert!(created.pending_review);
    assert!(!created.post.post.is_published);

    let public = forum.list_posts(PostQuery::default(), Viewer::anonymous()).await.unwrap();
    assert!(public.is_empty());

    let published = forum
        .moderate_post(
            &moderator.id,
            &created.post.post.id,
            PostAction::Publish,
            ModerationNote::default(),
        )
        .await
        .unwrap();
    assert!(published.post.is_published);
    assert_eq!(published.post.moderation_status, "approved");
}

#[tokio::test]
async fn test_likes_are_counted_once() {
    let db = setup_test_db().await;
    let author = create_user(db.pool(), "amina", "student").await;
    let fan = create_user(db.pool(), "brian", "student").await;
    let forum = ForumService::new(db.pool().clone(), test_config());

    let created = forum
        .create_post(&author.id, post("Small win", "I slept eight hours last night!", false))
        .await
        .unwrap();
    let post_id = created.post.post.id;

    assert_eq!(forum.like_post(&fan.id, &post_id).await.unwrap(), 1);
    assert!(matches!(
        forum.like_post(&fan.id, &post_id).await,
        Err(AppError::Conflict(_))
    ));

    let reply = forum
        .reply(
            &fan.id,
            &post_id,
            ReplyInput {
                content: "That's great to hear".to_string(),
                is_anonymous: false,
                parent_reply_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(forum.like_reply(&author.id, &reply.reply.id).await.unwrap(), 1);

    let detail = forum.get_post(&post_id, Viewer::anonymous()).await.unwrap();
    assert_eq!(detail.post.post.reply_count, 1);
    assert_eq!(detail.replies.len(), 1);
}

#[tokio::test]
async fn test_locked_post_rejects_replies() {
    let db = setup_test_db().await;
    let author = create_user(db.pool(), "amina", "student").await;
    let moderator = create_admin(db.pool(), "root").await;
    let forum = ForumService::new(db.pool().clone(), test_config());

    let created = forum
        .create_post(&author.id, post("Closed topic", "Thanks everyone for the advice", false))
        .await
        .unwrap();
    forum
        .moderate_post(&moderator.id, &created.post.post.id, PostAction::Lock, ModerationNote::default())
        .await
        .unwrap();

    let result = forum
        .reply(
            &author.id,
            &created.post.post.id,
            ReplyInput {
                content: "One more thing".to_string(),
                is_anonymous: false,
                parent_reply_id: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_held_reply_waits_for_moderator() {
    let db = setup_test_db().await;
    let author = create_user(db.pool(), "amina", "student").await;
    let troll = create_user(db.pool(), "troll", "adult").await;
    let moderator = create_admin(db.pool(), "root").await;
    let forum = ForumService::new(db.pool().clone(), test_config());

    let created = forum
        .create_post(&author.id, post("Study tips", "What helps you focus in the evening?", false))
        .await
        .unwrap();
    let post_id = created.post.post.id;

    let held = forum
        .reply(
            &troll.id,
            &post_id,
            ReplyInput {
                content: "You are a stupid pathetic loser, shut up".to_string(),
                is_anonymous: false,
                parent_reply_id: None,
            },
        )
        .await
        .unwrap();
    assert!(!held.reply.is_published);

    let queue = forum.held_replies().await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].reply.id, held.reply.id);
    let detail = forum.get_post(&post_id, Viewer::anonymous()).await.unwrap();
    assert_eq!(detail.post.post.reply_count, 0);

    let published = forum
        .moderate_reply(&moderator.id, &held.reply.id, ReplyAction::Publish, ModerationNote::default())
        .await
        .unwrap();
    assert!(published.reply.is_published);
    // publishing twice does not count the reply twice
    forum
        .moderate_reply(&moderator.id, &held.reply.id, ReplyAction::Publish, ModerationNote::default())
        .await
        .unwrap();
    let detail = forum.get_post(&post_id, Viewer::anonymous()).await.unwrap();
    assert_eq!(detail.post.post.reply_count, 1);
    assert!(forum.held_replies().await.unwrap().is_empty());

    forum
        .moderate_reply(
            &moderator.id,
            &held.reply.id,
            ReplyAction::Unpublish,
            ModerationNote {
                reason: "Abusive".to_string(),
            },
        )
        .await
        .unwrap();
    let detail = forum.get_post(&post_id, Viewer::anonymous()).await.unwrap();
    assert_eq!(detail.post.post.reply_count, 0);

    let logged: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM content_moderation_logs WHERE forum_reply_id = ? AND moderator_id IS NOT NULL",
    )
    .bind(&held.reply.id)
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(logged, 3);

    let missing = forum
        .moderate_reply(&moderator.id, "no-such-reply", ReplyAction::Publish, ModerationNote::default())
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_report_review_flow() {
    let db = setup_test_db().await;
    let author = create_user(db.pool(), "amina", "student").await;
    let reporter = create_user(db.pool(), "brian", "student").await;
    let moderator = create_admin(db.pool(), "root").await;
    let forum = ForumService::new(db.pool().clone(), test_config());

    let created = forum
        .create_post(&author.id, post("Buy now", "Visit my shop for discounts", false))
        .await
        .unwrap();

    let both = forum
        .report(
            &reporter.id,
            ReportInput {
                post_id: Some(created.post.post.id.clone()),
                reply_id: Some("whatever".to_string()),
                reason: "spam".to_string(),
                description: "Advertising".to_string(),
            },
        )
        .await;
    assert!(matches!(both, Err(AppError::Validation(_))));

    let report = forum
        .report(
            &reporter.id,
            ReportInput {
                post_id: Some(created.post.post.id.clone()),
                reply_id: None,
                reason: "spam".to_string(),
                description: "Advertising".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(report.status, "pending");
    assert_eq!(forum.list_reports(Some(ReportStatus::Pending)).await.unwrap().len(), 1);

    let reviewed = forum
        .review_report(
            &moderator.id,
            &report.id,
            ReviewReport {
                status: "resolved".to_string(),
                action_taken: "Post removed".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(reviewed.status, "resolved");

    let twice = forum
        .review_report(
            &moderator.id,
            &report.id,
            ReviewReport {
                status: "dismissed".to_string(),
                action_taken: String::new(),
            },
        )
        .await;
    assert!(matches!(twice, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_resource_search_and_views() {
    let db = setup_test_db().await;
    let staff = create_admin(db.pool(), "root").await;
    let reader = create_user(db.pool(), "amina", "student").await;
    let library = ResourceLibrary::new(db.pool().clone());

    let created = library.create(&staff.id, resource("Sleep and anxiety")).await.unwrap();
    library.create(&staff.id, resource("Breathing basics")).await.unwrap();
    assert_eq!(created.mental_health_topics.0, vec!["anxiety".to_string(), "stress".to_string()]);

    let by_topic = library
        .search(&ResourceQuery {
            topic: Some("stress".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_topic.len(), 2);

    let by_text = library
        .search(&ResourceQuery {
            q: Some("breathing".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_text.len(), 1);

    let viewed = library.get(&created.id, Some(&reader.id)).await.unwrap();
    assert_eq!(viewed.view_count, 1);
    let interaction = library.interaction(&reader.id, &created.id).await.unwrap().unwrap();
    assert!(interaction.viewed);

    library
        .apply_action(&staff.id, &created.id, ResourceAction::Unpublish)
        .await
        .unwrap();
    assert!(matches!(
        library.get(&created.id, None).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_resource_interactions() {
    let db = setup_test_db().await;
    let staff = create_admin(db.pool(), "root").await;
    let reader = create_user(db.pool(), "amina", "student").await;
    let library = ResourceLibrary::new(db.pool().clone());
    let created = library.create(&staff.id, resource("Sleep and anxiety")).await.unwrap();

    let liked = library
        .interact(
            &reader.id,
            &created.id,
            InteractionInput {
                liked: Some(true),
                rating: Some(4),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(liked.resource.like_count, 1);
    assert_eq!(liked.resource.average_rating, 4.0);

    let finished = library
        .interact(
            &reader.id,
            &created.id,
            InteractionInput {
                progress_percentage: Some(100),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(finished.interaction.completed);
    assert!(finished.interaction.liked);
    assert_eq!(finished.resource.like_count, 1);

    let unliked = library
        .interact(
            &reader.id,
            &created.id,
            InteractionInput {
                liked: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(unliked.resource.like_count, 0);
    assert!(unliked.interaction.completed);

    let reopened = library
        .interact(
            &reader.id,
            &created.id,
            InteractionInput {
                completed: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!reopened.interaction.completed);

    let bad = library
        .interact(
            &reader.id,
            &created.id,
            InteractionInput {
                rating: Some(6),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(bad, Err(AppError::Validation(_))));
}
