use crate::common::{TestApp, routes};

#[tokio::test]
async fn subject_management_requires_permission() {
    let app = TestApp::spawn().await;
    let student = app.create_authenticated_user("subj_student", "password123").await;

    let res = app
        .post_with_token(
            routes::SUBJECTS,
            &serde_json::json!({"name": "Sneaky Subject", "career_id": 1}),
            &student,
        )
        .await;
    assert_eq!(res.status, 403, "{}", res.text);
    assert_eq!(res.error_code(), "FORBIDDEN");
}

#[tokio::test]
async fn moderator_manages_careers_and_subjects() {
    let app = TestApp::spawn().await;
    let moderator = app
        .create_user_with_role("subj_mod", "password123", "moderator")
        .await;

    let res = app
        .post_with_token(
            routes::CAREERS,
            &serde_json::json!({"name": "Chemical Engineering"}),
            &moderator,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let career_id = res.id();

    let res = app
        .post_with_token(
            routes::SUBJECTS,
            &serde_json::json!({"name": "Organic Chemistry", "career_id": career_id}),
            &moderator,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let subject_id = res.id();

    let res = app
        .put_with_token(
            &routes::subject(subject_id),
            &serde_json::json!({"name": "Organic Chemistry I"}),
            &moderator,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["name"], "Organic Chemistry I");

    // Subjects and careers are publicly listable.
    let res = app.get(routes::SUBJECTS).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn subject_with_entries_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let moderator = app
        .create_user_with_role("subj_mod_2", "password123", "moderator")
        .await;
    let subject_id = app.seed_subject("Systems Engineering", "Databases").await;
    app.create_post(&moderator, subject_id, "Normalization question").await;

    let res = app
        .delete_with_token(&routes::subject(subject_id), &moderator)
        .await;
    assert_eq!(res.status, 409, "{}", res.text);
    assert_eq!(res.error_code(), "CONFLICT");
}

#[tokio::test]
async fn empty_subject_deletes_cleanly() {
    let app = TestApp::spawn().await;
    let moderator = app
        .create_user_with_role("subj_mod_3", "password123", "moderator")
        .await;
    let subject_id = app.seed_subject("Systems Engineering", "Short-lived").await;

    let res = app
        .delete_with_token(&routes::subject(subject_id), &moderator)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let res = app.get(&routes::subject(subject_id)).await;
    assert_eq!(res.status, 404, "{}", res.text);
}
