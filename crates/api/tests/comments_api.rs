//! HTTP-level integration tests for the public comment endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_open_app, build_test_app, build_test_app_with, create_comment,
    delete_auth, get, get_auth, patch_json_auth, post_auth, post_json, post_json_auth,
    reader_token, test_config,
};
use serde_json::json;

fn list_uri(article_id: i64) -> String {
    format!("/api/v1/comments/articles/{article_id}/comments/")
}

fn ids(json: &serde_json::Value) -> Vec<i64> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pending_comments_are_hidden_until_approved() {
    let app = build_test_app().await;
    let c = create_comment(&app, &reader_token(2), None, "First!").await;
    assert_eq!(c["is_approved"], false);

    let json = body_json(get(app.router(), &list_uri(app.article_id)).await).await;
    assert!(ids(&json).is_empty());

    let id = c["id"].as_i64().unwrap();
    let response = post_auth(
        app.router(),
        &format!("/api/v1/comments/comments/{id}/approve/"),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(app.router(), &list_uri(app.article_id)).await).await;
    assert_eq!(ids(&json), vec![id]);
}

#[tokio::test]
async fn ordering_parameter_controls_list_order() {
    let app = build_open_app().await;
    let a = create_comment(&app, &reader_token(2), None, "a").await["id"].as_i64().unwrap();
    let b = create_comment(&app, &reader_token(2), None, "b").await["id"].as_i64().unwrap();
    let c = create_comment(&app, &reader_token(2), None, "c").await["id"].as_i64().unwrap();

    post_auth(
        app.router(),
        &format!("/api/v1/comments/comments/{b}/like/"),
        &reader_token(9),
    )
    .await;

    let uri = list_uri(app.article_id);
    let asc = body_json(get(app.router(), &format!("{uri}?ordering=created_at")).await).await;
    assert_eq!(ids(&asc), vec![a, b, c]);

    let desc = body_json(get(app.router(), &format!("{uri}?ordering=-created_at")).await).await;
    assert_eq!(ids(&desc), vec![c, b, a]);

    let likes = body_json(get(app.router(), &format!("{uri}?ordering=-like_count")).await).await;
    assert_eq!(ids(&likes), vec![b, a, c]);

    let bad = get(app.router(), &format!("{uri}?ordering=rating")).await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    let json = body_json(bad).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["ordering"].is_array());
}

#[tokio::test]
async fn tree_listing_nests_replies_and_caps_depth() {
    let app = build_open_app().await;
    let token = reader_token(2);
    let c1 = create_comment(&app, &token, None, "one").await["id"].as_i64().unwrap();
    let c2 = create_comment(&app, &token, Some(c1), "two").await["id"].as_i64().unwrap();
    let c3 = create_comment(&app, &token, Some(c2), "three").await["id"].as_i64().unwrap();
    let c4 = create_comment(&app, &token, Some(c3), "four").await;
    assert_eq!(c4["depth"], 3);

    let uri = format!("{}?tree=true", list_uri(app.article_id));
    let json = body_json(get(app.router(), &uri).await).await;
    assert_eq!(json["data"]["count"], 4);

    let root = &json["data"]["threads"][0];
    assert_eq!(root["id"], c1);
    assert_eq!(root["can_reply"], true);
    let leaf = &root["replies"][0]["replies"][0]["replies"][0];
    assert_eq!(leaf["id"], c4["id"]);
    assert_eq!(leaf["level"], 3);
    assert_eq!(leaf["can_reply"], false);
}

#[tokio::test]
async fn unknown_article_is_404_and_draft_lists_nothing() {
    let app = build_open_app().await;

    let response = get(app.router(), &list_uri(9999)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let draft = app.add_draft().await;
    let response = get(app.router(), &list_uri(draft)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(ids(&body_json(response).await).is_empty());
}

// ---------------------------------------------------------------------------
// Creating
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_requires_authentication() {
    let app = build_test_app().await;
    let body = json!({ "article": app.article_id, "content": "hi" });

    let response = post_json(app.router(), "/api/v1/comments/comments/", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn empty_and_oversized_content_is_rejected() {
    let app = build_test_app().await;
    let token = reader_token(2);

    for content in ["   ".to_string(), "x".repeat(1001)] {
        let body = json!({ "article": app.article_id, "content": content });
        let response =
            post_json_auth(app.router(), "/api/v1/comments/comments/", body, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(json["fields"]["content"].is_array());
    }
}

#[tokio::test]
async fn reply_beyond_max_depth_is_rejected() {
    let app = build_open_app().await;
    let token = reader_token(2);
    let mut parent = None;
    for _ in 0..4 {
        parent = create_comment(&app, &token, parent, "deeper").await["id"].as_i64();
    }

    let body = json!({ "article": app.article_id, "parent": parent, "content": "too deep" });
    let response = post_json_auth(app.router(), "/api/v1/comments/comments/", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["parent"].is_array());
}

#[tokio::test]
async fn reply_to_comment_on_other_article_is_rejected() {
    let app = build_open_app().await;
    let token = reader_token(2);
    let parent = create_comment(&app, &token, None, "here").await["id"].as_i64().unwrap();
    let other = app
        .add_article(quill_core::comments::ARTICLE_STATUS_PUBLISHED, true)
        .await;

    let body = json!({ "article": other, "parent": parent, "content": "there" });
    let response = post_json_auth(app.router(), "/api/v1/comments/comments/", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comments_closed_article_is_rejected() {
    let app = build_test_app().await;
    let closed = app
        .add_article(quill_core::comments::ARTICLE_STATUS_PUBLISHED, false)
        .await;

    let body = json!({ "article": closed, "content": "hello" });
    let response =
        post_json_auth(app.router(), "/api/v1/comments/comments/", body, &reader_token(2)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["article"].is_array());
}

#[tokio::test]
async fn creation_is_rate_limited_for_readers_only() {
    let mut config = test_config();
    config.rate_limit_per_min = 2;
    let app = build_test_app_with(config).await;
    let body = json!({ "article": app.article_id, "content": "spam spam" });

    for _ in 0..2 {
        let response = post_json_auth(
            app.router(),
            "/api/v1/comments/comments/",
            body.clone(),
            &reader_token(2),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let limited = post_json_auth(
        app.router(),
        "/api/v1/comments/comments/",
        body.clone(),
        &reader_token(2),
    )
    .await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key("retry-after"));
    assert_eq!(body_json(limited).await["code"], "RATE_LIMITED");

    for _ in 0..3 {
        let response =
            post_json_auth(app.router(), "/api/v1/comments/comments/", body.clone(), &admin_token())
                .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

#[tokio::test]
async fn rejected_submissions_do_not_use_up_the_rate_limit() {
    let mut config = test_config();
    config.rate_limit_per_min = 2;
    config.comments.require_approval = false;
    let app = build_test_app_with(config).await;
    let blank = json!({ "article": app.article_id, "content": "   " });
    let valid = json!({ "article": app.article_id, "content": "finally" });

    for _ in 0..3 {
        let response = post_json_auth(
            app.router(),
            "/api/v1/comments/comments/",
            blank.clone(),
            &reader_token(2),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    for _ in 0..2 {
        let response = post_json_auth(
            app.router(),
            "/api/v1/comments/comments/",
            valid.clone(),
            &reader_token(2),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let limited =
        post_json_auth(app.router(), "/api/v1/comments/comments/", valid, &reader_token(2)).await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

    let id = create_comment(&app, &admin_token(), None, "report target").await["id"]
        .as_i64()
        .unwrap();
    let report_uri = format!("/api/v1/comments/comments/{id}/report/");
    let bad_reason = json!({ "reason": "other", "description": "x".repeat(2000) });
    for _ in 0..3 {
        let response =
            post_json_auth(app.router(), &report_uri, bad_reason.clone(), &reader_token(2)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    let response = post_json_auth(
        app.router(),
        &report_uri,
        json!({ "reason": "spam" }),
        &reader_token(2),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// Editing and deleting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn only_author_can_edit_and_edit_sets_flag() {
    let app = build_open_app().await;
    let id = create_comment(&app, &reader_token(2), None, "original").await["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/v1/comments/comments/{id}/");

    let response =
        patch_json_auth(app.router(), &uri, json!({ "content": "hijack" }), &reader_token(3)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response =
        patch_json_auth(app.router(), &uri, json!({ "content": "revised" }), &reader_token(2)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["content"], "revised");
    assert_eq!(json["data"]["is_edited"], true);
    assert!(json["data"]["edited_at"].is_string());
}

#[tokio::test]
async fn delete_cascades_and_reports_count() {
    let app = build_open_app().await;
    let token = reader_token(2);
    let c1 = create_comment(&app, &token, None, "root").await["id"].as_i64().unwrap();
    let c2 = create_comment(&app, &token, Some(c1), "child").await["id"].as_i64().unwrap();
    let _c3 = create_comment(&app, &token, Some(c2), "grandchild").await;

    let response = delete_auth(
        app.router(),
        &format!("/api/v1/comments/comments/{c2}/"),
        &reader_token(3),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(
        app.router(),
        &format!("/api/v1/comments/comments/{c2}/"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["deleted"], 2);

    let json = body_json(get(app.router(), &list_uri(app.article_id)).await).await;
    assert_eq!(ids(&json), vec![c1]);

    let response = get(app.router(), &format!("/api/v1/comments/comments/{c2}/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Likes and reports
// ---------------------------------------------------------------------------

#[tokio::test]
async fn like_then_unlike_restores_count() {
    let app = build_open_app().await;
    let id = create_comment(&app, &reader_token(2), None, "likeable").await["id"]
        .as_i64()
        .unwrap();
    let token = reader_token(5);
    let like_uri = format!("/api/v1/comments/comments/{id}/like/");
    let unlike_uri = format!("/api/v1/comments/comments/{id}/unlike/");

    let json = body_json(post_auth(app.router(), &like_uri, &token).await).await;
    assert_eq!(json["data"], json!({ "liked": true, "like_count": 1 }));

    let json = body_json(post_auth(app.router(), &like_uri, &token).await).await;
    assert_eq!(json["data"]["like_count"], 1, "liking twice must not double count");

    let liked = body_json(
        get_auth(
            app.router(),
            &format!("/api/v1/comments/articles/{}/likes/", app.article_id),
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(liked["data"], json!([id]));

    let json = body_json(delete_auth(app.router(), &unlike_uri, &token).await).await;
    assert_eq!(json["data"], json!({ "liked": false, "like_count": 0 }));

    let response = post_auth(app.router(), &like_uri, "not-a-token").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn second_report_by_same_user_conflicts() {
    let app = build_open_app().await;
    let id = create_comment(&app, &reader_token(2), None, "rude").await["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/v1/comments/comments/{id}/report/");
    let body = json!({ "reason": "harassment", "description": "not nice" });

    let response = post_json_auth(app.router(), &uri, body.clone(), &reader_token(4)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["reason"], "harassment");
    assert_eq!(json["data"]["is_resolved"], false);

    let response = post_json_auth(app.router(), &uri, body, &reader_token(4)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn report_of_missing_comment_is_404() {
    let app = build_test_app().await;
    let response = post_json_auth(
        app.router(),
        "/api/v1/comments/comments/4242/report/",
        json!({ "reason": "spam" }),
        &reader_token(4),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Single comment visibility
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pending_comment_is_visible_to_author_only() {
    let app = build_test_app().await;
    let id = create_comment(&app, &reader_token(2), None, "awaiting").await["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/v1/comments/comments/{id}/");

    assert_eq!(get(app.router(), &uri).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        get_auth(app.router(), &uri, &reader_token(3)).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        get_auth(app.router(), &uri, &reader_token(2)).await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn spam_comment_rejects_likes_reports_and_replies_from_others() {
    let app = build_open_app().await;
    let id = create_comment(&app, &reader_token(2), None, "buy now").await["id"]
        .as_i64()
        .unwrap();
    let response = post_auth(
        app.router(),
        &format!("/api/v1/comments/comments/{id}/mark_spam/"),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stranger = reader_token(9);
    let response = post_auth(
        app.router(),
        &format!("/api/v1/comments/comments/{id}/like/"),
        &stranger,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        app.router(),
        &format!("/api/v1/comments/comments/{id}/report/"),
        json!({ "reason": "spam" }),
        &stranger,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        app.router(),
        "/api/v1/comments/comments/",
        json!({ "article": app.article_id, "parent": id, "content": "me too" }),
        &stranger,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["parent"].is_array());

    let json = body_json(get(app.router(), &list_uri(app.article_id)).await).await;
    assert!(ids(&json).is_empty(), "no reply may surface as a root");
}
