use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::domain::{
    NewSubscriber, Subscriber, SubscriberEmail, SubscriberLocation, SubscriberStatus,
    SubscriptionToken,
};
use crate::store::{StoreError, SubscriberStore};

const SUBSCRIBER_COLUMNS: &str = "id, email, location, token, confirmed, created_at, updated_at";

pub struct PostgresSubscriberStore {
    db_pool: PgPool,
}

impl PostgresSubscriberStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    #[tracing::instrument(name = "Running subscriber store migrations", skip(self))]
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.db_pool).await
    }
}

fn subscriber_from_row(row: &PgRow) -> Result<Subscriber, StoreError> {
    let email: String = row.try_get("email")?;
    let location: String = row.try_get("location")?;
    let token: String = row.try_get("token")?;
    let confirmed: bool = row.try_get("confirmed")?;

    Ok(Subscriber {
        id: row.try_get("id")?,
        email: SubscriberEmail::parse(email).map_err(StoreError::InvalidRow)?,
        location: SubscriberLocation::parse(location).map_err(StoreError::InvalidRow)?,
        token: SubscriptionToken::parse(token).map_err(StoreError::InvalidRow)?,
        status: SubscriberStatus::from(confirmed),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl SubscriberStore for PostgresSubscriberStore {
    #[tracing::instrument(
        name = "Upserting a pending subscriber in the database",
        skip(self, new_subscriber, token),
        fields(subscriber_email = %new_subscriber.email)
    )]
    async fn upsert_pending(
        &self,
        new_subscriber: &NewSubscriber,
        token: &SubscriptionToken,
    ) -> Result<Subscriber, StoreError> {
        let query = format!(
            r#"
            INSERT INTO subscribers (id, email, location, token, confirmed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, FALSE, $5, $5)
            ON CONFLICT (email) DO UPDATE
            SET location = EXCLUDED.location,
                token = EXCLUDED.token,
                confirmed = FALSE,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            SUBSCRIBER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(new_subscriber.email.as_ref())
            .bind(new_subscriber.location.as_ref())
            .bind(token.as_ref())
            .bind(Utc::now())
            .fetch_one(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                err
            })?;

        subscriber_from_row(&row)
    }

    #[tracing::instrument(name = "Confirming a subscriber in the database", skip(self, token))]
    async fn confirm_by_token(
        &self,
        token: &SubscriptionToken,
    ) -> Result<Option<SubscriberEmail>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE subscribers
            SET confirmed = TRUE, updated_at = $2
            WHERE token = $1
            RETURNING email
            "#,
        )
        .bind(token.as_ref())
        .bind(Utc::now())
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        match row {
            Some(row) => {
                let email: String = row.try_get("email")?;
                let email = SubscriberEmail::parse(email).map_err(StoreError::InvalidRow)?;
                Ok(Some(email))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(name = "Deleting a subscriber from the database", skip(self))]
    async fn delete_by_email(&self, email: &SubscriberEmail) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM subscribers WHERE email = $1")
            .bind(email.as_ref())
            .execute(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                err
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Rows that no longer pass validation are logged and left out, so one bad row never
    /// keeps the rest from getting their digest.
    #[tracing::instrument(name = "Fetching confirmed subscribers from the database", skip(self))]
    async fn list_confirmed(&self) -> Result<Vec<Subscriber>, StoreError> {
        let query = format!(
            "SELECT {} FROM subscribers WHERE confirmed = TRUE",
            SUBSCRIBER_COLUMNS
        );

        let rows = sqlx::query(&query).fetch_all(&self.db_pool).await?;

        Ok(rows
            .iter()
            .filter_map(|row| match subscriber_from_row(row) {
                Ok(subscriber) => Some(subscriber),
                Err(err) => {
                    let id: Option<Uuid> = row.try_get("id").ok();
                    tracing::error!(
                        subscriber_id = ?id,
                        error.cause_chain = ?err,
                        error.message = %err,
                        "Skipping a confirmed subscriber whose row is not valid"
                    );
                    None
                }
            })
            .collect())
    }

    #[tracing::instrument(name = "Fetching all subscribers from the database", skip(self))]
    async fn list_all(&self) -> Result<Vec<Subscriber>, StoreError> {
        let query = format!(
            "SELECT {} FROM subscribers ORDER BY created_at",
            SUBSCRIBER_COLUMNS
        );

        let rows = sqlx::query(&query).fetch_all(&self.db_pool).await?;

        rows.iter().map(subscriber_from_row).collect()
    }
}
