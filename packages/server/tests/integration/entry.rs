use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn root_post_requires_title() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("entry_user_1", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Physics I").await;

    let res = app
        .post_with_token(
            routes::POSTS,
            &serde_json::json!({
                "subject_id": subject_id,
                "body": "A post with no title",
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");

    let res = app
        .post_with_token(
            routes::POSTS,
            &serde_json::json!({
                "subject_id": subject_id,
                "title": "   ",
                "body": "Whitespace title",
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
}

#[tokio::test]
async fn root_post_requires_subject() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("entry_user_2", "password123").await;

    let res = app
        .post_with_token(
            routes::POSTS,
            &serde_json::json!({
                "title": "No subject",
                "body": "Where does this go?",
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
}

#[tokio::test]
async fn body_over_configured_limit_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("entry_user_3", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Physics I").await;

    let res = app
        .post_with_token(
            routes::POSTS,
            &serde_json::json!({
                "subject_id": subject_id,
                "title": "Long body",
                "body": "x".repeat(4001),
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn comment_inherits_subject_and_drops_title() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("entry_user_4", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Physics I").await;
    let post_id = app.create_post(&token, subject_id, "Parent post").await;

    let res = app
        .post_with_token(
            routes::POSTS,
            &serde_json::json!({
                "parent_id": post_id,
                // Deliberately wrong subject and a title; both must be ignored.
                "subject_id": subject_id + 999,
                "title": "Comments have no titles",
                "body": "A comment",
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["subject_id"], subject_id);
    assert_eq!(res.body["parent_id"], post_id);
    assert!(res.body["title"].is_null());
}

#[tokio::test]
async fn comment_on_comment_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("entry_user_5", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Physics I").await;
    let post_id = app.create_post(&token, subject_id, "Depth one only").await;
    let comment_id = app.create_comment(&token, post_id, "First level").await;

    let res = app
        .post_with_token(
            routes::POSTS,
            &serde_json::json!({
                "parent_id": comment_id,
                "body": "Second level",
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn comment_on_missing_parent_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("entry_user_6", "password123").await;

    let res = app
        .post_with_token(
            routes::POSTS,
            &serde_json::json!({
                "parent_id": 424242,
                "body": "Orphan comment",
            }),
            &token,
        )
        .await;
    assert_eq!(res.status, 404, "{}", res.text);
}

#[tokio::test]
async fn list_shows_only_roots_newest_first_with_authors() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("lister", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Physics I").await;

    let first = app.create_post(&token, subject_id, "Older post").await;
    let second = app.create_post(&token, subject_id, "Newer post").await;
    app.create_comment(&token, first, "A comment, not a post").await;

    let res = app.get(routes::POSTS).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let data = res.body["data"].as_array().expect("data array");
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], second);
    assert_eq!(data[1]["id"], first);
    assert_eq!(data[0]["author_name"], "lister");
    assert_eq!(data[1]["comment_count"], 1);
}

#[tokio::test]
async fn list_filters_by_subject_and_author() {
    let app = TestApp::spawn().await;
    let alice = app.create_authenticated_user("alice_f", "password123").await;
    let bruno = app.create_authenticated_user("bruno_f", "password123").await;
    let maths = app.seed_subject("Systems Engineering", "Analysis I").await;
    let physics = app.seed_subject("Electronics", "Physics II").await;

    app.create_post(&alice, maths, "Alice on maths").await;
    app.create_post(&bruno, maths, "Bruno on maths").await;
    app.create_post(&bruno, physics, "Bruno on physics").await;

    let res = app
        .get(&format!("{}?subject_id={maths}", routes::POSTS))
        .await;
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);

    let bruno_id = data
        .iter()
        .find(|item| item["author_name"] == "bruno_f")
        .expect("bruno's post in subject listing")["author_id"]
        .as_i64()
        .unwrap();

    let res = app
        .get(&format!("{}?author_id={bruno_id}", routes::POSTS))
        .await;
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    for item in data {
        assert_eq!(item["author_name"], "bruno_f");
    }
}

#[tokio::test]
async fn update_is_author_only_unless_moderator() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("owner_1", "password123").await;
    let other = app.create_authenticated_user("intruder_1", "password123").await;
    let moderator = app
        .create_user_with_role("mod_1", "password123", "moderator")
        .await;
    let subject_id = app.seed_subject("Systems Engineering", "Physics I").await;
    let post_id = app.create_post(&author, subject_id, "Original title").await;

    let res = app
        .put_with_token(
            &routes::post(post_id),
            &serde_json::json!({"title": "Hijacked"}),
            &other,
        )
        .await;
    assert_eq!(res.status, 403, "{}", res.text);
    assert_eq!(res.error_code(), "FORBIDDEN");

    let res = app
        .put_with_token(
            &routes::post(post_id),
            &serde_json::json!({"title": "Fixed by author"}),
            &author,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["title"], "Fixed by author");

    let res = app
        .put_with_token(
            &routes::post(post_id),
            &serde_json::json!({"body": "Cleaned up by a moderator"}),
            &moderator,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
}

#[tokio::test]
async fn update_missing_entry_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("updater_2", "password123").await;

    let res = app
        .put_with_token(
            &routes::post(987_654),
            &serde_json::json!({"body": "ghost"}),
            &token,
        )
        .await;
    assert_eq!(res.status, 404, "{}", res.text);
}

#[tokio::test]
async fn delete_cascades_to_comments_votes_and_files() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("deleter_1", "password123").await;
    let voter = app.create_authenticated_user("deleter_voter", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Physics I").await;

    let attachment = BASE64.encode(b"lecture notes");
    let res = app
        .post_with_token(
            routes::POSTS,
            &serde_json::json!({
                "subject_id": subject_id,
                "title": "Post with everything",
                "body": "Notes attached",
                "attachment": {"filename": "notes.txt", "data": attachment},
            }),
            &author,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let post_id = res.id();

    let comment_id = app.create_comment(&voter, post_id, "Thanks!").await;
    app.cast_vote(&voter, post_id, "up").await;

    let thread = app.get(&routes::post(post_id)).await;
    let file_url = thread.body["file_url"].as_str().expect("file_url").to_string();

    let res = app.delete_with_token(&routes::post(post_id), &author).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["id"], post_id);

    assert_eq!(app.get(&routes::post(post_id)).await.status, 404);
    assert_eq!(app.get(&routes::post(comment_id)).await.status, 404);

    // File rows and bytes are gone with the entry.
    let file_res = app.client.get(&file_url).send().await.unwrap();
    assert_eq!(file_res.status().as_u16(), 404);
}

#[tokio::test]
async fn delete_is_author_only() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("deleter_2", "password123").await;
    let other = app.create_authenticated_user("deleter_3", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Physics I").await;
    let post_id = app.create_post(&author, subject_id, "Keep out").await;

    let res = app.delete_with_token(&routes::post(post_id), &other).await;
    assert_eq!(res.status, 403, "{}", res.text);

    assert_eq!(app.get(&routes::post(post_id)).await.status, 200);
}

#[tokio::test]
async fn attachment_is_stored_and_downloadable() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("attacher", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Physics I").await;

    let payload = b"PDF-ish bytes for the exam";
    let res = app
        .post_with_token(
            routes::POSTS,
            &serde_json::json!({
                "subject_id": subject_id,
                "title": "Exam material",
                "body": "See attachment",
                "attachment": {
                    "filename": "exam.pdf",
                    "data": BASE64.encode(payload),
                    "category": "exam-material",
                },
            }),
            &author,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let thread = app.get(&routes::post(res.id())).await;
    let file_url = thread.body["file_url"].as_str().expect("file_url");
    assert!(file_url.contains("/api/v1/files/exam-material/"));

    let file_res = app.client.get(file_url).send().await.unwrap();
    assert_eq!(file_res.status().as_u16(), 200);
    assert_eq!(file_res.bytes().await.unwrap().as_ref(), payload);
}

#[tokio::test]
async fn invalid_base64_attachment_is_rejected() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("attacher_2", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Physics I").await;

    let res = app
        .post_with_token(
            routes::POSTS,
            &serde_json::json!({
                "subject_id": subject_id,
                "title": "Bad attachment",
                "body": "Corrupt",
                "attachment": {"filename": "x.bin", "data": "!!!not-base64!!!"},
            }),
            &author,
        )
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");

    // The failed create leaves no entry behind.
    let list = app.get(routes::POSTS).await;
    assert_eq!(list.body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn search_requires_a_term() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::SEARCH).await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.error_code(), "VALIDATION_ERROR");

    let res = app
        .post_without_token(routes::SEARCH, &serde_json::json!({"term": "  "}))
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
}

#[tokio::test]
async fn search_matches_titles_case_insensitively() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("searcher", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Physics I").await;

    let hit = app.create_post(&token, subject_id, "Thermodynamics summary").await;
    app.create_post(&token, subject_id, "Unrelated post").await;
    // Comment bodies never match; only root titles are searched.
    app.create_comment(&token, hit, "thermodynamics in a comment").await;

    let res = app.get(&routes::search_with_term("THERMO")).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], hit);
    assert_eq!(data[0]["author_name"], "searcher");

    let res = app
        .post_without_token(routes::SEARCH, &serde_json::json!({"term": "thermo"}))
        .await;
    assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_escapes_like_wildcards() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("searcher_2", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Physics I").await;

    app.create_post(&token, subject_id, "100% legit title").await;
    app.create_post(&token, subject_id, "100 degrees").await;

    let res = app.get(&routes::search_with_term("100%25")).await;
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["title"], "100% legit title");
}
