use crate::helpers::TestApp;

#[tokio::test(flavor = "multi_thread")]
async fn unsubscribe_removes_a_confirmed_subscriber() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_confirmed_subscriber("a@x.com", "Paris").await;

    let response = test_app
        .post_unsubscribe(serde_json::json!({ "email": "a@x.com" }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "Unsubscribed successfully");
    assert_eq!(test_app.subscriber_count().await, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn unsubscribe_removes_a_pending_subscriber() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_unconfirmed_subscriber("a@x.com", "Paris").await;

    let response = test_app
        .post_unsubscribe(serde_json::json!({ "email": "A@X.COM" }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(test_app.subscriber_count().await, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn unsubscribing_twice_fails_the_second_time() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_confirmed_subscriber("a@x.com", "Paris").await;

    let first = test_app
        .post_unsubscribe(serde_json::json!({ "email": "a@x.com" }))
        .await;
    let second = test_app
        .post_unsubscribe(serde_json::json!({ "email": "a@x.com" }))
        .await;

    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 400);
    let body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(body["error"], "Email not found");
}

#[tokio::test(flavor = "multi_thread")]
async fn unsubscribe_returns_400_when_email_is_missing_or_invalid() {
    let test_app = TestApp::spawn_app().await;

    let test_cases = vec![
        (serde_json::json!({}), "missing email"),
        (serde_json::json!({ "email": "" }), "empty email"),
        (serde_json::json!({ "email": "not-an-email" }), "invalid email"),
    ];

    for (invalid_body, description) in test_cases {
        let response = test_app.post_unsubscribe(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            description
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn unsubscribing_one_email_leaves_the_others() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_confirmed_subscriber("a@x.com", "Paris").await;
    test_app.create_confirmed_subscriber("b@x.com", "Berlin").await;

    test_app
        .post_unsubscribe(serde_json::json!({ "email": "a@x.com" }))
        .await
        .error_for_status()
        .unwrap();

    assert_eq!(test_app.subscriber_count().await, 1);
}
