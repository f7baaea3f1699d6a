use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    NewSubscriber, Subscriber, SubscriberEmail, SubscriberStatus, SubscriptionToken,
};
use crate::store::{StoreError, SubscriberStore};

#[derive(Default)]
struct Tables {
    by_email: HashMap<SubscriberEmail, Subscriber>,
    // token -> email of the subscriber currently holding it
    by_token: HashMap<SubscriptionToken, SubscriberEmail>,
}

/// Process-local store with the same contract as the Postgres one. Each operation takes the
/// write (or read) lock once, which keeps it atomic with respect to the others.
#[derive(Default)]
pub struct InMemorySubscriberStore {
    tables: RwLock<Tables>,
}

impl InMemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberStore for InMemorySubscriberStore {
    async fn upsert_pending(
        &self,
        new_subscriber: &NewSubscriber,
        token: &SubscriptionToken,
    ) -> Result<Subscriber, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        let subscriber = match tables.by_email.remove(&new_subscriber.email) {
            Some(existing) => {
                tables.by_token.remove(&existing.token);
                Subscriber {
                    location: new_subscriber.location.clone(),
                    token: token.clone(),
                    status: SubscriberStatus::Pending,
                    updated_at: now,
                    ..existing
                }
            }
            None => Subscriber {
                id: Uuid::new_v4(),
                email: new_subscriber.email.clone(),
                location: new_subscriber.location.clone(),
                token: token.clone(),
                status: SubscriberStatus::Pending,
                created_at: now,
                updated_at: now,
            },
        };

        tables
            .by_token
            .insert(token.clone(), subscriber.email.clone());
        tables
            .by_email
            .insert(subscriber.email.clone(), subscriber.clone());

        Ok(subscriber)
    }

    async fn confirm_by_token(
        &self,
        token: &SubscriptionToken,
    ) -> Result<Option<SubscriberEmail>, StoreError> {
        let mut tables = self.tables.write().await;

        let email = match tables.by_token.get(token) {
            Some(email) => email.clone(),
            None => return Ok(None),
        };

        match tables.by_email.get_mut(&email) {
            Some(subscriber) => {
                subscriber.status = SubscriberStatus::Confirmed;
                subscriber.updated_at = Utc::now();
                Ok(Some(email))
            }
            None => Err(StoreError::InvalidRow(format!(
                "token index points at missing subscriber {}",
                email
            ))),
        }
    }

    async fn delete_by_email(&self, email: &SubscriberEmail) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;

        match tables.by_email.remove(email) {
            Some(subscriber) => {
                tables.by_token.remove(&subscriber.token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_confirmed(&self) -> Result<Vec<Subscriber>, StoreError> {
        let tables = self.tables.read().await;

        Ok(tables
            .by_email
            .values()
            .filter(|subscriber| subscriber.status.is_confirmed())
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Subscriber>, StoreError> {
        let tables = self.tables.read().await;
        let mut subscribers: Vec<Subscriber> = tables.by_email.values().cloned().collect();

        subscribers.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.email.as_ref().cmp(b.email.as_ref()))
        });

        Ok(subscribers)
    }
}
