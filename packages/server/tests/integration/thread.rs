use sea_orm::ConnectionTrait;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn thread_composes_root_author_comments_and_score() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("thread_author", "password123").await;
    let carla = app.create_authenticated_user("carla_t", "password123").await;
    let diego = app.create_authenticated_user("diego_t", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Algorithms").await;
    let post_id = app.create_post(&author, subject_id, "Big-O question").await;

    let first = app.create_comment(&carla, post_id, "It's O(n log n)").await;
    let second = app.create_comment(&diego, post_id, "Proof sketch attached").await;
    app.cast_vote(&diego, first, "up").await;
    app.cast_vote(&carla, post_id, "up").await;

    let res = app.get(&routes::post(post_id)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["author_name"], "thread_author");
    assert_eq!(res.body["upvotes"], 1);
    assert_eq!(res.body["comment_count"], 2);

    let comments = res.body["comments"].as_array().expect("comments array");
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["id"], first);
    assert_eq!(comments[0]["author_name"], "carla_t");
    assert_eq!(comments[0]["upvotes"], 1);
    assert_eq!(comments[1]["id"], second);
    assert_eq!(comments[1]["author_name"], "diego_t");

    // No attachment on this post.
    assert!(res.body["file_url"].is_null());
}

#[tokio::test]
async fn comments_appear_in_creation_order() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("order_author", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Algorithms").await;
    let post_id = app.create_post(&author, subject_id, "Ordering").await;

    let commenter = app.create_authenticated_user("order_commenter", "password123").await;
    let mut expected = Vec::new();
    for i in 0..5 {
        expected.push(app.create_comment(&commenter, post_id, &format!("comment {i}")).await);
    }

    let res = app.get(&routes::post(post_id)).await;
    let got: Vec<i64> = res.body["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    let expected: Vec<i64> = expected.into_iter().map(i64::from).collect();
    assert_eq!(got, expected);
}

#[tokio::test]
async fn fetching_a_comment_yields_an_empty_thread() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("leaf_author", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Algorithms").await;
    let post_id = app.create_post(&author, subject_id, "Leafy").await;
    let comment_id = app.create_comment(&author, post_id, "I am a leaf").await;

    let res = app.get(&routes::post(comment_id)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["parent_id"], post_id);
    assert_eq!(res.body["comment_count"], 0);
    assert!(res.body["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_thread_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::post(31_337)).await;
    assert_eq!(res.status, 404, "{}", res.text);
    assert_eq!(res.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn dangling_author_fails_the_whole_assembly() {
    let app = TestApp::spawn().await;
    let author = app.create_authenticated_user("doomed_author", "password123").await;
    let subject_id = app.seed_subject("Systems Engineering", "Algorithms").await;
    let post_id = app.create_post(&author, subject_id, "Orphaned post").await;

    // Remove the author out from under the entry; assembly must fail loudly
    // rather than omit the name. Replica mode skips FK enforcement so the
    // dangling reference can actually be produced.
    let me = app.get_with_token(routes::ME, &author).await;
    let author_id = me.body["id"].as_i64().unwrap();
    app.db
        .execute_unprepared(&format!(
            "SET session_replication_role = replica; \
             DELETE FROM \"user\" WHERE id = {author_id}; \
             SET session_replication_role = DEFAULT;"
        ))
        .await
        .expect("Failed to delete user row");

    let res = app.get(&routes::post(post_id)).await;
    assert_eq!(res.status, 500, "{}", res.text);
    assert_eq!(res.error_code(), "DATA_INTEGRITY");
}
