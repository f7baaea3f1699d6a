//! Persistence for subscriber rows.
//!
//! Every method is a single atomic operation keyed by email or token, so callers never
//! read a row and write it back in two steps.

mod memory;
mod postgres;

pub use memory::InMemorySubscriberStore;
pub use postgres::PostgresSubscriberStore;

use async_trait::async_trait;

use crate::domain::{NewSubscriber, Subscriber, SubscriberEmail, SubscriptionToken};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to reach the subscriber store.")]
    Database(#[from] sqlx::Error),
    #[error("Stored subscriber row is not valid: {0}")]
    InvalidRow(String),
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Creates a pending subscriber, or resets an existing one (same email) back to pending
    /// with the new location and token.
    async fn upsert_pending(
        &self,
        new_subscriber: &NewSubscriber,
        token: &SubscriptionToken,
    ) -> Result<Subscriber, StoreError>;

    /// Marks the subscriber currently holding `token` as confirmed and returns its email.
    /// `None` when no subscriber holds that token.
    async fn confirm_by_token(
        &self,
        token: &SubscriptionToken,
    ) -> Result<Option<SubscriberEmail>, StoreError>;

    /// Returns false when there was nothing to delete.
    async fn delete_by_email(&self, email: &SubscriberEmail) -> Result<bool, StoreError>;

    async fn list_confirmed(&self) -> Result<Vec<Subscriber>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Subscriber>, StoreError>;
}
