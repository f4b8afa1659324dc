use crate::common::{TestApp, routes};

#[tokio::test]
async fn register_login_me_round_trip() {
    let app = TestApp::spawn().await;

    let body = serde_json::json!({
        "username": "round_tripper",
        "password": "password123",
    });

    let res = app.post_without_token(routes::REGISTER, &body).await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["username"], "round_tripper");

    let res = app.post_without_token(routes::LOGIN, &body).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["role"], "student");
    let token = res.body["token"].as_str().unwrap().to_string();

    let res = app.get_with_token(routes::ME, &token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["username"], "round_tripper");
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = TestApp::spawn().await;

    let body = serde_json::json!({
        "username": "taken_name",
        "password": "password123",
    });

    let first = app.post_without_token(routes::REGISTER, &body).await;
    assert_eq!(first.status, 201, "{}", first.text);

    let second = app.post_without_token(routes::REGISTER, &body).await;
    assert_eq!(second.status, 409, "{}", second.text);
    assert_eq!(second.error_code(), "USERNAME_TAKEN");
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let app = TestApp::spawn().await;
    app.create_authenticated_user("cautious", "password123").await;

    let res = app
        .post_without_token(
            routes::LOGIN,
            &serde_json::json!({"username": "cautious", "password": "password124"}),
        )
        .await;
    assert_eq!(res.status, 401, "{}", res.text);
    assert_eq!(res.error_code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn me_requires_a_token() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::ME).await;
    assert_eq!(res.status, 401, "{}", res.text);
    assert_eq!(res.error_code(), "TOKEN_MISSING");

    let res = app.get_with_token(routes::ME, "not-a-jwt").await;
    assert_eq!(res.status, 401, "{}", res.text);
    assert_eq!(res.error_code(), "TOKEN_INVALID");
}

#[tokio::test]
async fn public_profile_is_readable_without_auth() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("profiled", "password123").await;

    let me = app.get_with_token(routes::ME, &token).await;
    let id = me.body["id"].as_i64().unwrap() as i32;

    let res = app.get(&routes::user(id)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["username"], "profiled");
    // The profile never leaks the password hash.
    assert!(res.body.get("password").is_none());
}

#[tokio::test]
async fn moderator_role_grants_permissions_on_login() {
    let app = TestApp::spawn().await;
    let token = app
        .create_user_with_role("perm_mod", "password123", "moderator")
        .await;

    let res = app.get_with_token(routes::ME, &token).await;
    let perms = res.body["permissions"].as_array().unwrap();
    assert!(perms.iter().any(|p| p == "entry:moderate"));
}
