pub mod new_subscriber;
pub mod subscriber;
pub mod subscriber_email;
pub mod subscriber_location;
pub mod subscriber_status;
pub mod subscription_token;
pub mod weather_report;

pub use new_subscriber::{NewSubscriber, ValidationError};
pub use subscriber::Subscriber;
pub use subscriber_email::SubscriberEmail;
pub use subscriber_location::SubscriberLocation;
pub use subscriber_status::SubscriberStatus;
pub use subscription_token::SubscriptionToken;
pub use weather_report::{CurrentConditions, ForecastDay, WeatherReport};
