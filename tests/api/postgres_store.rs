use chrono::Utc;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;
use weather_digest::config::get_configuration;
use weather_digest::domain::{NewSubscriber, SubscriberStatus, SubscriptionToken};
use weather_digest::startup::get_connection_db_pool;
use weather_digest::store::{PostgresSubscriberStore, SubscriberStore};

/// Creates a throwaway database, migrates it and hands back a store on top of it, plus a
/// pool for writing rows the store itself would never write.
async fn spawn_store() -> (PostgresSubscriberStore, PgPool) {
    let mut config = get_configuration().expect("Missing configuration file.");
    config.database.set_name(Uuid::new_v4().to_string());

    let mut connection = PgConnection::connect_with(&config.database.get_server_options())
        .await
        .expect("Failed to connect to Postgres.");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database.name).as_str())
        .await
        .expect("Failed to create database.");

    let db_pool = get_connection_db_pool(&config.database);
    let store = PostgresSubscriberStore::new(db_pool.clone());
    store.migrate().await.expect("Failed to migrate the database.");
    (store, db_pool)
}

#[tokio::test]
#[ignore = "needs a running Postgres"]
async fn upsert_confirm_and_delete_round_trip_through_postgres() {
    let (store, _) = spawn_store().await;
    let new_subscriber = NewSubscriber::parse("a@x.com", "Paris").unwrap();
    let token = SubscriptionToken::generate();

    let created = store.upsert_pending(&new_subscriber, &token).await.unwrap();
    assert_eq!(created.status, SubscriberStatus::Pending);
    assert!(store.list_confirmed().await.unwrap().is_empty());

    let confirmed = store.confirm_by_token(&token).await.unwrap();
    assert_eq!(confirmed, Some(new_subscriber.email.clone()));
    assert_eq!(store.list_confirmed().await.unwrap().len(), 1);

    assert!(store.delete_by_email(&new_subscriber.email).await.unwrap());
    assert!(!store.delete_by_email(&new_subscriber.email).await.unwrap());
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "needs a running Postgres"]
async fn upserting_an_existing_email_resets_it_to_pending() {
    let (store, _) = spawn_store().await;
    let first_token = SubscriptionToken::generate();
    let first = NewSubscriber::parse("a@x.com", "Paris").unwrap();
    let created = store.upsert_pending(&first, &first_token).await.unwrap();
    store.confirm_by_token(&first_token).await.unwrap();

    let second_token = SubscriptionToken::generate();
    let second = NewSubscriber::parse("a@x.com", "Berlin").unwrap();
    let updated = store.upsert_pending(&second, &second_token).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.location.as_ref(), "Berlin");
    assert_eq!(updated.status, SubscriberStatus::Pending);
    assert_eq!(store.confirm_by_token(&first_token).await.unwrap(), None);
    assert_eq!(store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "needs a running Postgres"]
async fn an_invalid_confirmed_row_does_not_hide_the_valid_ones() {
    let (store, db_pool) = spawn_store().await;
    let token = SubscriptionToken::generate();
    let valid = NewSubscriber::parse("a@x.com", "Paris").unwrap();
    store.upsert_pending(&valid, &token).await.unwrap();
    store.confirm_by_token(&token).await.unwrap();

    sqlx::query(
        r#"
        INSERT INTO subscribers (id, email, location, token, confirmed, created_at, updated_at)
        VALUES ($1, 'not-an-email', 'Paris', $2, TRUE, $3, $3)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(SubscriptionToken::generate().as_ref())
    .bind(Utc::now())
    .execute(&db_pool)
    .await
    .unwrap();

    let confirmed = store.list_confirmed().await.unwrap();

    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].email.as_ref(), "a@x.com");
}
