use weather_digest::domain::SubscriberStatus;
use weather_digest::store::SubscriberStore;

use crate::helpers::TestApp;

#[tokio::test(flavor = "multi_thread")]
async fn confirmation_without_token_is_rejected_with_400() {
    let test_app = TestApp::spawn_app().await;

    let response = reqwest::get(&format!("{}/confirm", test_app.address))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "token is required");
}

#[tokio::test(flavor = "multi_thread")]
async fn confirmation_with_unknown_token_is_rejected_and_changes_nothing() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_unconfirmed_subscriber("a@x.com", "Paris").await;

    let response = test_app
        .get_confirmation("0123456789abcdef0123456789abcdef")
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid confirmation token");

    let subscribers = test_app.store.list_all().await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].status, SubscriberStatus::Pending);
}

#[tokio::test(flavor = "multi_thread")]
async fn the_link_returned_by_subscribe_returns_200_if_called() {
    let test_app = TestApp::spawn_app().await;
    let confirmation_link = test_app
        .create_unconfirmed_subscriber("a@x.com", "Paris")
        .await;

    let response = reqwest::get(confirmation_link.html).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "Subscription confirmed");
}

#[tokio::test(flavor = "multi_thread")]
async fn clicking_on_the_confirmation_link_confirms_a_subscriber() {
    let test_app = TestApp::spawn_app().await;
    let confirmation_link = test_app
        .create_unconfirmed_subscriber("a@x.com", "Paris")
        .await;

    reqwest::get(confirmation_link.html)
        .await
        .unwrap()
        .error_for_status()
        .unwrap();

    let subscribers = test_app.store.list_all().await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].email.as_ref(), "a@x.com");
    assert_eq!(subscribers[0].location.as_ref(), "Paris");
    assert_eq!(subscribers[0].status, SubscriberStatus::Confirmed);
}

#[tokio::test(flavor = "multi_thread")]
async fn confirming_twice_with_the_same_token_succeeds_both_times() {
    let test_app = TestApp::spawn_app().await;
    let confirmation_link = test_app
        .create_unconfirmed_subscriber("a@x.com", "Paris")
        .await;

    let first = reqwest::get(confirmation_link.html.clone()).await.unwrap();
    let second = reqwest::get(confirmation_link.html).await.unwrap();

    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 200);
    let subscribers = test_app.store.list_all().await.unwrap();
    assert_eq!(subscribers[0].status, SubscriberStatus::Confirmed);
}

#[tokio::test(flavor = "multi_thread")]
async fn an_old_token_stops_working_after_resubscribing() {
    let test_app = TestApp::spawn_app().await;
    let old_link = test_app
        .create_unconfirmed_subscriber("a@x.com", "Paris")
        .await;
    test_app
        .create_unconfirmed_subscriber("a@x.com", "Berlin")
        .await;

    let response = reqwest::get(old_link.html).await.unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let subscribers = test_app.store.list_all().await.unwrap();
    assert_eq!(subscribers[0].status, SubscriberStatus::Pending);
}
