//! Subscription lifecycle: `Pending -> Confirmed`, either of them `-> deleted`, and any
//! state back to `Pending` through a fresh subscribe.

use std::sync::Arc;

use crate::domain::new_subscriber::parse_email;
use crate::domain::{
    NewSubscriber, Subscriber, SubscriberEmail, SubscriptionToken, ValidationError,
};
use crate::store::{StoreError, SubscriberStore};

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid confirmation token")]
    TokenNotFound,
    #[error("Email not found")]
    NotFound(SubscriberEmail),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Holds no subscriber state of its own; every call is one round-trip to the store.
pub struct SubscriptionManager {
    store: Arc<dyn SubscriberStore>,
}

impl SubscriptionManager {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        Self { store }
    }

    /// Validates the input and registers it, see [`SubscriptionManager::register`].
    pub async fn subscribe(
        &self,
        email: &str,
        location: &str,
    ) -> Result<SubscriptionToken, SubscriptionError> {
        let new_subscriber = NewSubscriber::parse(email, location)?;

        self.register(&new_subscriber).await
    }

    /// Creates the subscriber or restarts its opt-in: a fresh token, the new location and
    /// `Pending`, even if it was confirmed before. Returns the token to mail out.
    #[tracing::instrument(
        name = "Registering a pending subscription",
        skip(self, new_subscriber),
        fields(
            subscriber_email = %new_subscriber.email,
            subscriber_location = %new_subscriber.location
        )
    )]
    pub async fn register(
        &self,
        new_subscriber: &NewSubscriber,
    ) -> Result<SubscriptionToken, SubscriptionError> {
        let token = SubscriptionToken::generate();

        self.store.upsert_pending(new_subscriber, &token).await?;

        Ok(token)
    }

    /// Confirming again with the token still on file succeeds again. The token stays stored
    /// until the next subscribe for that email replaces it.
    #[tracing::instrument(name = "Confirming a subscription", skip(self, token))]
    pub async fn confirm(&self, token: &str) -> Result<SubscriberEmail, SubscriptionError> {
        let token = SubscriptionToken::parse(token.to_string())
            .map_err(|_| ValidationError::Missing { field: "token" })?;

        match self.store.confirm_by_token(&token).await? {
            Some(email) => {
                tracing::info!(subscriber_email = %email, "Subscription confirmed");
                Ok(email)
            }
            None => Err(SubscriptionError::TokenNotFound),
        }
    }

    #[tracing::instrument(name = "Removing a subscription", skip(self))]
    pub async fn unsubscribe(&self, email: &str) -> Result<(), SubscriptionError> {
        let email = parse_email(email)?;

        if self.store.delete_by_email(&email).await? {
            Ok(())
        } else {
            Err(SubscriptionError::NotFound(email))
        }
    }

    pub async fn list_confirmed(&self) -> Result<Vec<Subscriber>, SubscriptionError> {
        Ok(self.store.list_confirmed().await?)
    }
}
