use weather_digest::domain::SubscriberStatus;
use weather_digest::store::SubscriberStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::TestApp;

const DIGEST_SUBJECT: &str = "Daily Weather Update";

async fn accept_all_emails(test_app: &TestApp) {
    Mock::given(path("/mail/send"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_app.email_server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn confirmed_subscriber_receives_exactly_one_digest() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_confirmed_subscriber("a@x.com", "Paris").await;
    accept_all_emails(&test_app).await;

    let report = test_app.broadcaster.run().await.unwrap();

    assert_eq!(report.sent.len(), 1);
    assert!(report.failed.is_empty());

    let digests = test_app.emails_with_subject(DIGEST_SUBJECT).await;
    assert_eq!(digests.len(), 1);
    assert_eq!(digests[0]["personalizations"][0]["to"][0]["email"], "a@x.com");

    let html = digests[0]["content"][1]["value"].as_str().unwrap();
    assert!(html.contains("Temperature: 21.0°C"));
    for date in ["2024-06-05", "2024-06-06", "2024-06-07"] {
        assert!(html.contains(date), "digest is missing {}", date);
    }
    let plain_text = digests[0]["content"][0]["value"].as_str().unwrap();
    assert!(plain_text.contains("Temperature: 21.0°C"));
}

#[tokio::test(flavor = "multi_thread")]
async fn pending_subscribers_are_not_sent_a_digest() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_unconfirmed_subscriber("a@x.com", "Paris").await;
    test_app.create_confirmed_subscriber("b@x.com", "Berlin").await;
    accept_all_emails(&test_app).await;

    let report = test_app.broadcaster.run().await.unwrap();

    assert_eq!(report.sent.len(), 1);
    assert_eq!(report.sent[0].as_ref(), "b@x.com");
    assert_eq!(test_app.emails_with_subject(DIGEST_SUBJECT).await.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn one_failing_city_does_not_stop_the_other_digests() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_confirmed_subscriber("a@x.com", "Paris").await;
    test_app.create_confirmed_subscriber("b@x.com", "Berlin").await;
    test_app.create_confirmed_subscriber("c@x.com", "Atlantis").await;

    // Atlantis was known when c@x.com subscribed and is unknown by broadcast time.
    test_app.weather_server.reset().await;
    test_app.mount_weather_for("Paris").await;
    test_app.mount_weather_for("Berlin").await;
    test_app.mount_unknown_city("Atlantis").await;
    accept_all_emails(&test_app).await;

    let report = test_app.broadcaster.run().await.unwrap();

    assert_eq!(report.sent.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0.as_ref(), "c@x.com");
    assert_eq!(test_app.emails_with_subject(DIGEST_SUBJECT).await.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_failing_mail_send_is_reported_and_leaves_subscribers_untouched() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_confirmed_subscriber("a@x.com", "Paris").await;

    Mock::given(path("/mail/send"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let report = test_app.broadcaster.run().await.unwrap();

    assert!(report.sent.is_empty());
    assert_eq!(report.failed.len(), 1);

    let subscribers = test_app.store.list_all().await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].status, SubscriberStatus::Confirmed);
}

#[tokio::test(flavor = "multi_thread")]
async fn broadcasting_without_subscribers_sends_nothing() {
    let test_app = TestApp::spawn_app().await;
    accept_all_emails(&test_app).await;

    let report = test_app.broadcaster.run().await.unwrap();

    assert!(report.sent.is_empty());
    assert!(report.failed.is_empty());
    assert!(test_app
        .email_server
        .received_requests()
        .await
        .unwrap()
        .is_empty());
}
