use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::subscriptions::{SubscriptionError, SubscriptionManager};

#[derive(Deserialize, Debug)]
pub struct UnsubscribeBody {
    pub email: Option<String>,
}

#[tracing::instrument(
    name = "Unsubscribing from daily weather updates",
    skip(body, subscriptions),
    fields(subscriber_email = ?body.email)
)]
pub async fn handle_unsubscribe(
    body: web::Json<UnsubscribeBody>,
    subscriptions: web::Data<SubscriptionManager>,
) -> Result<HttpResponse, SubscriptionError> {
    subscriptions
        .unsubscribe(body.email.as_deref().unwrap_or_default())
        .await?;

    Ok(HttpResponse::Ok().body("Unsubscribed successfully"))
}
