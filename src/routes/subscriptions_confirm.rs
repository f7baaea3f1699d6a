use actix_web::{
    web::{self, Query},
    HttpResponse,
};
use serde::Deserialize;

use crate::subscriptions::{SubscriptionError, SubscriptionManager};

#[derive(Deserialize, Debug)]
pub struct Parameters {
    pub token: Option<String>,
}

#[tracing::instrument(
  name = "Confirm a weather digest subscription",
  skip(subscriptions, parameters)
)]
pub async fn handle_confirm_subscription(
    subscriptions: web::Data<SubscriptionManager>,
    parameters: Query<Parameters>,
) -> Result<HttpResponse, SubscriptionError> {
    let token = parameters.token.as_deref().unwrap_or_default();

    subscriptions.confirm(token).await?;

    Ok(HttpResponse::Ok().body("Subscription confirmed"))
}
