mod health_check;
mod subscriptions;
mod subscriptions_confirm;
mod unsubscribe;

pub use health_check::*;
pub use subscriptions::*;
pub use subscriptions_confirm::*;
pub use unsubscribe::*;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::subscriptions::SubscriptionError;

/// Prints an error followed by every error in its `source()` chain.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody { error: message })
}

impl ResponseError for SubscriptionError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscriptionError::Validation(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::TokenNotFound => StatusCode::BAD_REQUEST,
            SubscriptionError::NotFound(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            SubscriptionError::Store(_) => String::from("Internal Server Error"),
            other => other.to_string(),
        };

        error_response(self.status_code(), message)
    }
}
