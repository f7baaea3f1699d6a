pub mod broadcast;
pub mod config;
pub mod digest;
pub mod domain;
pub mod email_client;
pub mod routes;
pub mod scheduler;
pub mod startup;
pub mod store;
pub mod subscriptions;
pub mod telemetry;
pub mod weather_client;
