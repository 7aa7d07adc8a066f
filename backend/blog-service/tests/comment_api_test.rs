mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use blog_service::db::InMemoryStore;
use blog_service::models::AuthorSummary;
use common::{bearer, configure};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

macro_rules! init_app {
    ($store:expr) => {
        test::init_service(App::new().configure(configure($store.clone()))).await
    };
}

macro_rules! create_blog {
    ($app:expr, $author:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/blog")
            .insert_header(bearer($author))
            .set_json(json!({ "title": "Thread host", "category": "Lifestyle" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["blog"]["id"].as_str().unwrap().to_string()
    }};
}

macro_rules! post_comment {
    ($app:expr, $user:expr, $blog_id:expr, $payload:expr) => {{
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/comment/{}/create", $blog_id))
            .insert_header(bearer($user))
            .set_json($payload)
            .to_request();
        test::call_service(&$app, req).await
    }};
}

async fn seed_user(store: &InMemoryStore, first_name: &str) -> Uuid {
    let id = Uuid::new_v4();
    store
        .insert_user(AuthorSummary {
            id,
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            photo_url: None,
        })
        .await;
    id
}

#[actix_web::test]
async fn test_create_comment_and_reply() {
    let store = Arc::new(InMemoryStore::new());
    let app = init_app!(store);
    let author = seed_user(&store, "Grace").await;
    let reader = seed_user(&store, "Linus").await;
    let blog_id = create_blog!(app, author);

    let resp = post_comment!(app, reader, blog_id, json!({ "content": "  Great post  " }));
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Comment added");
    assert_eq!(body["comment"]["content"], "Great post");
    assert_eq!(body["comment"]["author"]["first_name"], "Linus");
    assert_eq!(body["comment"]["number_of_likes"], 0);
    assert!(body["comment"]["parent_comment_id"].is_null());
    let root_id = body["comment"]["id"].as_str().unwrap().to_string();

    let resp = post_comment!(
        app,
        author,
        blog_id,
        json!({ "content": "Thanks!", "parentCommentId": root_id })
    );
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["comment"]["parent_comment_id"], root_id.as_str());
    assert_eq!(body["comment"]["post_id"], blog_id.as_str());
}

#[actix_web::test]
async fn test_create_comment_rejections() {
    let store = Arc::new(InMemoryStore::new());
    let app = init_app!(store);
    let author = Uuid::new_v4();
    let blog_id = create_blog!(app, author);

    let resp = post_comment!(app, author, blog_id, json!({ "content": "   " }));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = post_comment!(app, author, Uuid::new_v4(), json!({ "content": "Hello" }));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Blog not found");

    let resp = post_comment!(
        app,
        author,
        blog_id,
        json!({ "content": "Orphan", "parent_comment_id": Uuid::new_v4() })
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/comment/{}/create", blog_id))
        .set_json(json!({ "content": "Anonymous" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(store.comment_count().await, 0);
}

#[actix_web::test]
async fn test_reply_to_reply_is_rejected() {
    let store = Arc::new(InMemoryStore::new());
    let app = init_app!(store);
    let user = Uuid::new_v4();
    let blog_id = create_blog!(app, user);

    let resp = post_comment!(app, user, blog_id, json!({ "content": "root" }));
    let body: Value = test::read_body_json(resp).await;
    let root_id = body["comment"]["id"].as_str().unwrap().to_string();

    let resp = post_comment!(
        app,
        user,
        blog_id,
        json!({ "content": "reply", "parent_comment_id": root_id })
    );
    let body: Value = test::read_body_json(resp).await;
    let reply_id = body["comment"]["id"].as_str().unwrap().to_string();

    let resp = post_comment!(
        app,
        user,
        blog_id,
        json!({ "content": "too deep", "parent_comment_id": reply_id })
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Parent must belong to the same post
    let other_blog = create_blog!(app, user);
    let resp = post_comment!(
        app,
        user,
        other_blog,
        json!({ "content": "cross-post", "parent_comment_id": root_id })
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(store.comment_count().await, 2);
}

#[actix_web::test]
async fn test_get_comments_thread_shape() {
    let store = Arc::new(InMemoryStore::new());
    let app = init_app!(store);
    let author = seed_user(&store, "Alan").await;
    let blog_id = create_blog!(app, author);

    let resp = post_comment!(app, author, blog_id, json!({ "content": "older root" }));
    let body: Value = test::read_body_json(resp).await;
    let older_root = body["comment"]["id"].as_str().unwrap().to_string();
    post_comment!(app, author, blog_id, json!({ "content": "newer root" }));
    post_comment!(
        app,
        author,
        blog_id,
        json!({ "content": "first reply", "parent_comment_id": older_root })
    );
    post_comment!(
        app,
        author,
        blog_id,
        json!({ "content": "second reply", "parent_comment_id": older_root })
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comment/{}/comment/all", blog_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    let threads = body["comments"].as_array().unwrap();
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0]["content"], "newer root");
    assert_eq!(threads[0]["replies"], json!([]));
    assert_eq!(threads[1]["id"], older_root.as_str());
    assert_eq!(threads[1]["author"]["first_name"], "Alan");
    assert_eq!(threads[1]["number_of_likes"], 0);

    let replies: Vec<&str> = threads[1]["replies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["content"].as_str().unwrap())
        .collect();
    assert_eq!(replies, vec!["first reply", "second reply"]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comment/{}/comment/all", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_edit_comment_permissions() {
    let store = Arc::new(InMemoryStore::new());
    let app = init_app!(store);
    let writer = Uuid::new_v4();
    let blog_id = create_blog!(app, writer);

    let resp = post_comment!(app, writer, blog_id, json!({ "content": "typo" }));
    let body: Value = test::read_body_json(resp).await;
    let comment_id = body["comment"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/comment/{}/edit", comment_id))
        .insert_header(bearer(Uuid::new_v4()))
        .set_json(json!({ "content": "vandalised" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/comment/{}/edit", comment_id))
        .insert_header(bearer(writer))
        .set_json(json!({ "content": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/comment/{}/edit", Uuid::new_v4()))
        .insert_header(bearer(writer))
        .set_json(json!({ "content": "ghost" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/comment/{}/edit", comment_id))
        .insert_header(bearer(writer))
        .set_json(json!({ "content": "fixed" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Comment updated successfully");
    assert_eq!(body["comment"]["content"], "fixed");
}

#[actix_web::test]
async fn test_delete_root_comment_removes_replies() {
    let store = Arc::new(InMemoryStore::new());
    let app = init_app!(store);
    let writer = Uuid::new_v4();
    let replier = Uuid::new_v4();
    let blog_id = create_blog!(app, writer);

    let resp = post_comment!(app, writer, blog_id, json!({ "content": "root" }));
    let body: Value = test::read_body_json(resp).await;
    let root_id = body["comment"]["id"].as_str().unwrap().to_string();
    post_comment!(
        app,
        replier,
        blog_id,
        json!({ "content": "reply", "parent_comment_id": root_id })
    );
    assert_eq!(store.comment_count().await, 2);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/comment/{}/delete", root_id))
        .insert_header(bearer(replier))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/comment/{}/delete", root_id))
        .insert_header(bearer(writer))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Comment deleted successfully");
    assert_eq!(store.comment_count().await, 0);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/comment/{}/delete", root_id))
        .insert_header(bearer(writer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_like_comment_toggles() {
    let store = Arc::new(InMemoryStore::new());
    let app = init_app!(store);
    let writer = Uuid::new_v4();
    let fan = Uuid::new_v4();
    let blog_id = create_blog!(app, writer);

    let resp = post_comment!(app, writer, blog_id, json!({ "content": "likeable" }));
    let body: Value = test::read_body_json(resp).await;
    let comment_id = body["comment"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comment/{}/like", comment_id))
        .insert_header(bearer(fan))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Comment liked");
    assert_eq!(body["liked"], true);
    assert!(body.get("comment").is_none());
    assert_eq!(body["updatedComment"]["id"], comment_id.as_str());
    assert_eq!(body["updatedComment"]["number_of_likes"], 1);
    assert_eq!(body["updatedComment"]["likes"], json!([fan.to_string()]));

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comment/{}/like", comment_id))
        .insert_header(bearer(fan))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Comment unliked");
    assert_eq!(body["liked"], false);
    assert_eq!(body["updatedComment"]["number_of_likes"], 0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comment/{}/like", Uuid::new_v4()))
        .insert_header(bearer(fan))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_blog_discussion_end_to_end() {
    let store = Arc::new(InMemoryStore::new());
    let app = init_app!(store);
    let author = seed_user(&store, "Barbara").await;
    let reader = seed_user(&store, "Ken").await;
    let blog_id = create_blog!(app, author);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/blog/{}/like", blog_id))
        .insert_header(bearer(reader))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = post_comment!(app, reader, blog_id, json!({ "content": "Question?" }));
    let body: Value = test::read_body_json(resp).await;
    let question = body["comment"]["id"].as_str().unwrap().to_string();
    post_comment!(
        app,
        author,
        blog_id,
        json!({ "content": "Answer.", "parent_comment_id": question })
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/blog/{}", blog_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["blog"]["like_count"], 1);
    assert_eq!(body["blog"]["author"]["first_name"], "Barbara");
    // Flat list, newest first
    assert_eq!(body["blog"]["comments"][0]["content"], "Answer.");
    assert_eq!(body["blog"]["comments"][1]["content"], "Question?");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comment/{}/comment/all", blog_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["comments"][0]["author"]["first_name"], "Ken");
    assert_eq!(body["comments"][0]["replies"][0]["author"]["first_name"], "Barbara");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/blog/{}", blog_id))
        .insert_header(bearer(author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.comment_count().await, 0);
}
