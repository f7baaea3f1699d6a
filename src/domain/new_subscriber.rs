use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_location::SubscriberLocation;

/// Rejected input, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub location: SubscriberLocation,
}

impl NewSubscriber {
    /// Email is checked before location, so a request missing both reports the email.
    pub fn parse(email: &str, location: &str) -> Result<NewSubscriber, ValidationError> {
        let email = parse_email(email)?;

        if location.trim().is_empty() {
            return Err(ValidationError::Missing { field: "location" });
        }
        let location = SubscriberLocation::parse(location.to_string()).map_err(|reason| {
            ValidationError::Invalid {
                field: "location",
                reason,
            }
        })?;

        Ok(NewSubscriber { email, location })
    }
}

pub fn parse_email(email: &str) -> Result<SubscriberEmail, ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::Missing { field: "email" });
    }

    SubscriberEmail::parse(email.to_string())
        .map_err(|reason| ValidationError::Invalid { field: "email", reason })
}
