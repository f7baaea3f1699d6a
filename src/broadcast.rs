//! The daily fan-out: one fetch -> render -> send pipeline per confirmed subscriber.
//!
//! Pipelines run as separate tasks, at most `concurrency` at a time, and every task is
//! awaited. A failure (or panic) in one pipeline is logged against that subscriber and
//! never reaches the others. Subscriber rows are only read here.

use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

use crate::digest;
use crate::domain::{Subscriber, SubscriberEmail};
use crate::email_client::{MailSender, SendEmailError};
use crate::subscriptions::{SubscriptionError, SubscriptionManager};
use crate::weather_client::{WeatherError, WeatherProvider};

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Failed to fetch the weather for {location}.")]
    Weather {
        location: String,
        #[source]
        source: WeatherError,
    },
    #[error("Failed to send the digest.")]
    Send(#[source] SendEmailError),
    #[error("Delivery task did not complete: {0}")]
    Aborted(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    #[error("A broadcast is already in progress.")]
    AlreadyRunning,
    #[error("Failed to list confirmed subscribers.")]
    ListSubscribers(#[source] SubscriptionError),
}

/// What happened in one run.
#[derive(Debug, Default)]
pub struct BroadcastReport {
    pub sent: Vec<SubscriberEmail>,
    pub failed: Vec<(SubscriberEmail, DeliveryError)>,
}

pub struct Broadcaster {
    subscriptions: Arc<SubscriptionManager>,
    weather: Arc<dyn WeatherProvider>,
    mailer: Arc<dyn MailSender>,
    subject: String,
    concurrency: usize,
    in_progress: Mutex<()>,
}

impl Broadcaster {
    pub fn new(
        subscriptions: Arc<SubscriptionManager>,
        weather: Arc<dyn WeatherProvider>,
        mailer: Arc<dyn MailSender>,
        subject: String,
        concurrency: usize,
    ) -> Self {
        Self {
            subscriptions,
            weather,
            mailer,
            subject,
            concurrency: concurrency.max(1),
            in_progress: Mutex::new(()),
        }
    }

    /// Runs one broadcast. Only listing the subscribers can fail the run as a whole.
    #[tracing::instrument(name = "Broadcasting the daily weather digest", skip(self))]
    pub async fn run(&self) -> Result<BroadcastReport, BroadcastError> {
        let _guard = self
            .in_progress
            .try_lock()
            .map_err(|_| BroadcastError::AlreadyRunning)?;

        let subscribers = self
            .subscriptions
            .list_confirmed()
            .await
            .map_err(BroadcastError::ListSubscribers)?;

        tracing::info!(subscribers = subscribers.len(), "Starting broadcast");

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let handles: Vec<_> = subscribers
            .into_iter()
            .map(|subscriber| {
                let permits = permits.clone();
                let weather = self.weather.clone();
                let mailer = self.mailer.clone();
                let subject = self.subject.clone();
                let email = subscriber.email.clone();

                let handle = tokio::spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|err| DeliveryError::Aborted(err.to_string()))?;

                    deliver_digest(&subscriber, weather.as_ref(), mailer.as_ref(), &subject).await
                });

                (email, handle)
            })
            .collect();

        let mut report = BroadcastReport::default();
        for (email, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(DeliveryError::Aborted(join_error.to_string())),
            };

            match outcome {
                Ok(()) => report.sent.push(email),
                Err(err) => {
                    tracing::error!(
                        subscriber_email = %email,
                        error.cause_chain = ?err,
                        error.message = %err,
                        "Failed to deliver the daily digest"
                    );
                    report.failed.push((email, err));
                }
            }
        }

        tracing::info!(
            sent = report.sent.len(),
            failed = report.failed.len(),
            "Broadcast finished"
        );

        Ok(report)
    }

    /// Resolves once no broadcast is in flight, so shutting down never cuts a run short.
    pub async fn wait_idle(&self) {
        let _guard = self.in_progress.lock().await;
    }
}

#[tracing::instrument(
    name = "Delivering a digest",
    skip(subscriber, weather, mailer, subject),
    fields(
        subscriber_email = %subscriber.email,
        subscriber_location = %subscriber.location
    )
)]
async fn deliver_digest(
    subscriber: &Subscriber,
    weather: &dyn WeatherProvider,
    mailer: &dyn MailSender,
    subject: &str,
) -> Result<(), DeliveryError> {
    let report = weather
        .fetch(subscriber.location.as_ref())
        .await
        .map_err(|source| {
            if source.is_schema_error() {
                tracing::warn!("Weather payload no longer matches the expected shape");
            }
            DeliveryError::Weather {
                location: subscriber.location.to_string(),
                source,
            }
        })?;

    let digest = digest::render(&report);

    mailer
        .send_email(
            &subscriber.email,
            subject,
            &digest.html(),
            &digest.plain_text(),
        )
        .await
        .map_err(DeliveryError::Send)?;

    tracing::info!("Daily digest sent");

    Ok(())
}
