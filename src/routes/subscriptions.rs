use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;

use crate::{
    domain::{NewSubscriber, SubscriberEmail, SubscriptionToken},
    email_client::{MailSender, SendEmailError},
    routes::{error_chain_fmt, error_response},
    startup::ApplicationBaseUrl,
    subscriptions::{SubscriptionError, SubscriptionManager},
    weather_client::{WeatherError, WeatherProvider},
};

#[derive(Deserialize, Debug)]
pub struct SubscribeBody {
    pub email: Option<String>,
    pub city: Option<String>,
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
    #[error("Failed to fetch the weather for the requested city.")]
    Weather(#[source] WeatherError),
    #[error("Error sending confirmation email")]
    SendEmail(#[source] SendEmailError),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::Subscription(err) => err.status_code(),
            SubscribeError::Weather(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SubscribeError::SendEmail(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        match self {
            SubscribeError::Subscription(err) => err.error_response(),
            other => error_response(other.status_code(), other.to_string()),
        }
    }
}

/// Validates the request, checks that the provider knows the city, (re)registers the
/// subscriber and mails the confirmation link. The row is only written once the city
/// resolved, so a bad city leaves nothing behind.
#[tracing::instrument(
    name = "Subscribing to daily weather updates",
    skip(body, subscriptions, weather, email_client, base_url),
    fields(
        subscriber_email = ?body.email,
        subscriber_city = ?body.city
    )
)]
pub async fn handle_subscribe(
    body: web::Json<SubscribeBody>,
    subscriptions: web::Data<SubscriptionManager>,
    weather: web::Data<dyn WeatherProvider>,
    email_client: web::Data<dyn MailSender>,
    base_url: web::Data<ApplicationBaseUrl>,
) -> Result<HttpResponse, SubscribeError> {
    let body = body.into_inner();
    let new_subscriber = NewSubscriber::parse(
        body.email.as_deref().unwrap_or_default(),
        body.city.as_deref().unwrap_or_default(),
    )
    .map_err(SubscriptionError::from)?;

    weather
        .fetch(new_subscriber.location.as_ref())
        .await
        .map_err(SubscribeError::Weather)?;

    let token = subscriptions.register(&new_subscriber).await?;

    send_confirmation_email(
        email_client.get_ref(),
        &new_subscriber.email,
        base_url.0.as_str(),
        &token,
    )
    .await
    .map_err(SubscribeError::SendEmail)?;

    Ok(HttpResponse::Ok().body("Confirmation email sent"))
}

#[tracing::instrument(
    name = "Send a confirmation email to a new subscriber",
    fields(base_url = %base_url),
    skip(email_client, recipient, subscription_token)
)]
async fn send_confirmation_email(
    email_client: &dyn MailSender,
    recipient: &SubscriberEmail,
    base_url: &str,
    subscription_token: &SubscriptionToken,
) -> Result<(), SendEmailError> {
    let confirmation_link = format!("{}/confirm?token={}", base_url, subscription_token);
    let html_body = format!(
        r#"
            <div>
                <h1>Daily weather updates</h1>
                <p>Click <a href="{}">here</a> to confirm your subscription.</p>
            </div>
        "#,
        confirmation_link
    );
    let text_body = format!(
        "Please confirm your subscription by clicking on the following link: {}",
        confirmation_link
    );

    email_client
        .send_email(
            recipient,
            "Confirm your subscription",
            html_body.as_str(),
            text_body.as_str(),
        )
        .await
}
