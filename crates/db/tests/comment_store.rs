//! Integration tests for the Postgres comment store.
//!
//! Runs `PgCommentStore` and the repositories against a real database:
//! - Recursive subtree delete and the moderation log written with it
//! - Like/unlike idempotence and the clamped counter
//! - Unique and foreign key violations mapped to domain errors
//! - Public listing order and the pending/spam moderation filters

use std::sync::Arc;

use assert_matches::assert_matches;
use sqlx::PgPool;

use quill_core::actor::Actor;
use quill_core::comments::{
    CommentOrdering, ModerationAction, ModerationFilter, ReportReason, ARTICLE_STATUS_PUBLISHED,
};
use quill_core::error::CoreError;
use quill_core::moderation::ModerationState;
use quill_core::types::DbId;
use quill_db::models::article::CreateArticle;
use quill_db::models::comment::{Comment, CreateComment, NewComment};
use quill_db::models::moderation_log::ModerationNote;
use quill_db::repositories::{ArticleRepo, CommentReportRepo, CommentRepo};
use quill_db::{CommentPolicy, CommentService, CommentStore, PgCommentStore, StoreError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn published_article(pool: &PgPool) -> DbId {
    ArticleRepo::create(
        pool,
        &CreateArticle {
            title: "Store test".to_string(),
            status: ARTICLE_STATUS_PUBLISHED.to_string(),
            allow_comments: true,
        },
    )
    .await
    .unwrap()
    .id
}

async fn insert(
    store: &PgCommentStore,
    article_id: DbId,
    parent_id: Option<DbId>,
    depth: i32,
    is_approved: bool,
) -> Comment {
    store
        .insert_comment(&NewComment {
            article_id,
            author_id: 100,
            parent_id,
            content: "stored".to_string(),
            depth,
            is_approved,
        })
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Test: subtree delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_subtree_counts_descendants_and_logs(pool: PgPool) {
    let store = PgCommentStore::new(pool.clone());
    let article = published_article(&pool).await;
    let a = insert(&store, article, None, 0, true).await;
    let b = insert(&store, article, Some(a.id), 1, true).await;
    let c = insert(&store, article, Some(b.id), 2, true).await;
    let d = insert(&store, article, None, 0, true).await;
    store.add_like(c.id, 5).await.unwrap();
    store
        .insert_report(c.id, 6, ReportReason::Spam, "")
        .await
        .unwrap();

    let removed = store.delete_subtree(b.id, Some(1)).await.unwrap();
    assert_eq!(removed, 2, "b and its reply c should be removed");

    let remaining: Vec<DbId> = store
        .list_public_comments(article, CommentOrdering::CreatedAsc)
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(remaining, vec![a.id, d.id]);
    assert!(store.liked_comment_ids(5, article).await.unwrap().is_empty());
    assert!(store.list_reports(false).await.unwrap().is_empty());

    let log = store.list_log(Some(b.id)).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, "deleted");
    assert_eq!(log[0].reason, "Removed 2 comment(s)");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_missing_comment_removes_nothing_and_logs_nothing(pool: PgPool) {
    let store = PgCommentStore::new(pool);

    assert_eq!(store.delete_subtree(404, Some(1)).await.unwrap(), 0);
    assert!(store.list_log(None).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: likes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_like_and_unlike_are_idempotent(pool: PgPool) {
    let store = PgCommentStore::new(pool.clone());
    let article = published_article(&pool).await;
    let c = insert(&store, article, None, 0, true).await;

    assert_eq!(store.add_like(c.id, 1).await.unwrap().like_count, 1);
    assert_eq!(
        store.add_like(c.id, 1).await.unwrap().like_count,
        1,
        "ON CONFLICT DO NOTHING keeps the count"
    );
    assert_eq!(store.add_like(c.id, 2).await.unwrap().like_count, 2);
    assert_eq!(store.liked_comment_ids(1, article).await.unwrap(), vec![c.id]);

    let status = store.remove_like(c.id, 1).await.unwrap();
    assert!(!status.liked);
    assert_eq!(status.like_count, 1);
    assert_eq!(store.remove_like(c.id, 1).await.unwrap().like_count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_like_counter_never_drops_below_zero(pool: PgPool) {
    let store = PgCommentStore::new(pool.clone());
    let article = published_article(&pool).await;
    let c = insert(&store, article, None, 0, true).await;

    let mut conn = pool.acquire().await.unwrap();
    let count = CommentRepo::adjust_like_count(&mut *conn, c.id, -1)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_like_of_missing_comment_is_not_found(pool: PgPool) {
    let store = PgCommentStore::new(pool);

    assert_matches!(
        store.add_like(999, 1).await,
        Err(StoreError::Core(CoreError::NotFound { entity: "Comment", id: 999 }))
    );
    assert_matches!(
        store.remove_like(999, 1).await,
        Err(StoreError::Core(CoreError::NotFound { .. }))
    );
}

// ---------------------------------------------------------------------------
// Test: constraint mapping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_report_is_conflict(pool: PgPool) {
    let store = PgCommentStore::new(pool.clone());
    let article = published_article(&pool).await;
    let c = insert(&store, article, None, 0, true).await;

    store
        .insert_report(c.id, 9, ReportReason::Harassment, "rude")
        .await
        .unwrap();
    assert_matches!(
        store.insert_report(c.id, 9, ReportReason::Other, "again").await,
        Err(StoreError::Core(CoreError::Conflict(_)))
    );

    let err = CommentReportRepo::create(&pool, c.id, 9, "spam", "")
        .await
        .unwrap_err();
    let db = err.as_database_error().unwrap();
    assert_eq!(db.constraint(), Some("uq_comment_reports_comment_reporter"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_foreign_key_violations_map_to_domain_errors(pool: PgPool) {
    let store = PgCommentStore::new(pool.clone());
    let article = published_article(&pool).await;

    assert_matches!(
        store.insert_report(4242, 9, ReportReason::Spam, "").await,
        Err(StoreError::Core(CoreError::NotFound { .. }))
    );

    let orphan = store
        .insert_comment(&NewComment {
            article_id: article,
            author_id: 1,
            parent_id: Some(4242),
            content: "reply to nothing".to_string(),
            depth: 1,
            is_approved: true,
        })
        .await;
    assert_matches!(
        orphan,
        Err(StoreError::Core(CoreError::FieldValidation(f))) if f.contains_key("parent")
    );
}

// ---------------------------------------------------------------------------
// Test: listings and moderation flags
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_public_listing_orders_by_likes_with_creation_tiebreak(pool: PgPool) {
    let store = PgCommentStore::new(pool.clone());
    let article = published_article(&pool).await;
    let a = insert(&store, article, None, 0, true).await;
    let b = insert(&store, article, None, 0, true).await;
    let c = insert(&store, article, None, 0, true).await;
    insert(&store, article, None, 0, false).await;
    store.add_like(c.id, 1).await.unwrap();

    let ids: Vec<DbId> = store
        .list_public_comments(article, CommentOrdering::LikesDesc)
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![c.id, a.id, b.id], "pending comment must not be listed");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_moderation_filters_and_flags_with_log(pool: PgPool) {
    let store = PgCommentStore::new(pool.clone());
    let article = published_article(&pool).await;
    let pending = insert(&store, article, None, 0, false).await;
    let spam = insert(&store, article, None, 0, true).await;
    store
        .insert_report(spam.id, 7, ReportReason::Spam, "")
        .await
        .unwrap();

    let flagged = store
        .set_moderation(
            spam.id,
            ModerationState::Spam.flags(),
            ModerationNote {
                moderator_id: 1,
                action: ModerationAction::MarkedSpam,
            },
        )
        .await
        .unwrap();
    assert!(flagged.is_spam);
    assert!(!flagged.is_approved);

    let pending_view = store
        .list_for_moderation(ModerationFilter::Pending, Some(article))
        .await
        .unwrap();
    assert_eq!(pending_view.len(), 1);
    assert_eq!(pending_view[0].comment.id, pending.id);
    assert_eq!(pending_view[0].article_title, "Store test");

    let spam_view = store
        .list_for_moderation(ModerationFilter::Spam, None)
        .await
        .unwrap();
    assert_eq!(spam_view.len(), 1);
    assert_eq!(spam_view[0].comment.id, spam.id);
    assert_eq!(spam_view[0].report_count, 1);

    let all = store
        .list_for_moderation(ModerationFilter::All, Some(article))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let log = store.list_log(Some(spam.id)).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, "marked_spam");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_edit_by_moderator_commits_content_and_log_together(pool: PgPool) {
    let store = PgCommentStore::new(pool.clone());
    let article = published_article(&pool).await;
    let c = insert(&store, article, None, 0, true).await;

    let edited = store
        .update_content(
            c.id,
            "moderated",
            Some(ModerationNote {
                moderator_id: 1,
                action: ModerationAction::Edited,
            }),
        )
        .await
        .unwrap();
    assert_eq!(edited.content, "moderated");
    assert!(edited.is_edited);
    assert!(edited.edited_at.is_some());
    assert_eq!(store.list_log(Some(c.id)).await.unwrap().len(), 1);

    assert_matches!(
        store.update_content(4242, "nothing", None).await,
        Err(StoreError::Core(CoreError::NotFound { .. }))
    );
}

// ---------------------------------------------------------------------------
// Test: service rules over Postgres
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_service_hides_spam_from_strangers(pool: PgPool) {
    let article = published_article(&pool).await;
    let service = CommentService::new(
        Arc::new(PgCommentStore::new(pool)),
        CommentPolicy {
            require_approval: false,
            ..CommentPolicy::default()
        },
    );
    let admin = Actor::new(1, "admin");
    let stranger = Actor::new(9, "reader");

    let c = service
        .create_comment(
            &Actor::new(2, "reader"),
            &CreateComment {
                article,
                parent: None,
                content: "cheap pills".to_string(),
            },
        )
        .await
        .unwrap();
    service.mark_comment_as_spam(&admin, c.id).await.unwrap();

    assert_matches!(
        service.like_comment(&stranger, c.id).await,
        Err(StoreError::Core(CoreError::NotFound { .. }))
    );
    let reply = service
        .create_comment(
            &stranger,
            &CreateComment {
                article,
                parent: Some(c.id),
                content: "me too".to_string(),
            },
        )
        .await;
    assert_matches!(
        reply,
        Err(StoreError::Core(CoreError::FieldValidation(f))) if f.contains_key("parent")
    );

    assert_eq!(service.delete_comment(&admin, c.id).await.unwrap(), 1);
    let log = service.list_moderation_log(&admin, Some(c.id)).await.unwrap();
    let actions: Vec<&str> = log.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["deleted", "marked_spam"]);
}
