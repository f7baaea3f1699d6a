use weather_digest::config::get_configuration;
use weather_digest::startup::Application;
use weather_digest::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber(
        String::from("weather_digest"),
        String::from("info"),
        std::io::stdout,
    );

    init_subscriber(subscriber).map_err(|err| anyhow::anyhow!(err))?;

    let config = get_configuration()?;
    let application = Application::build(config).await?;

    application.run_until_stop().await
}
