use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::net::TcpListener;
use std::sync::Arc;
use tokio_cron_scheduler::JobScheduler;
use tracing_actix_web::TracingLogger;

use crate::broadcast::Broadcaster;
use crate::config::{DatabaseSettings, Settings};
use crate::email_client::{EmailClient, MailSender};
use crate::routes::{
    handle_confirm_subscription, handle_subscribe, handle_unsubscribe, health_check,
};
use crate::scheduler::start_broadcast_scheduler;
use crate::store::{PostgresSubscriberStore, SubscriberStore};
use crate::subscriptions::SubscriptionManager;
use crate::weather_client::{WeatherClient, WeatherProvider};

/// Public URL of the service, used to build confirmation links.
pub struct ApplicationBaseUrl(pub String);

pub struct Application {
    port: u16,
    server: Server,
    scheduler: JobScheduler,
    broadcaster: Arc<Broadcaster>,
}

impl Application {
    /// Postgres-backed application; pending migrations are applied first.
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let store = PostgresSubscriberStore::new(get_connection_db_pool(&config.database));
        store.migrate().await?;

        Self::build_with_store(config, Arc::new(store)).await
    }

    pub async fn build_with_store(
        config: Settings,
        store: Arc<dyn SubscriberStore>,
    ) -> Result<Self, anyhow::Error> {
        let sender_email = config
            .get_email_client_sender()
            .map_err(|err| anyhow::anyhow!("Sender email is not valid: {}", err))?;
        let email_client: Arc<dyn MailSender> = Arc::new(EmailClient::new(
            config.email_client.base_url.clone(),
            sender_email,
            config.email_client.api_key.clone(),
            Some(config.email_client.get_timeout()),
        )?);
        let weather_client: Arc<dyn WeatherProvider> = Arc::new(WeatherClient::new(
            config.weather_client.base_url.clone(),
            config.weather_client.api_key.clone(),
            Some(config.weather_client.get_timeout()),
            Some(config.weather_client.forecast_days),
        )?);
        let subscriptions = Arc::new(SubscriptionManager::new(store));

        let broadcaster = Arc::new(Broadcaster::new(
            subscriptions.clone(),
            weather_client.clone(),
            email_client.clone(),
            config.broadcast.subject.clone(),
            config.broadcast.concurrency,
        ));
        let scheduler = start_broadcast_scheduler(broadcaster.clone(), &config.broadcast.schedule)
            .await
            .map_err(|err| anyhow::anyhow!("Failed to start the broadcast scheduler: {:?}", err))?;

        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            subscriptions,
            weather_client,
            email_client,
            config.get_app_base_url(),
        )?;

        tracing::info!("Server listening on {}:{}", config.application.host, port);

        Ok(Self {
            port,
            server,
            scheduler,
            broadcaster,
        })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    /// The same broadcaster the scheduler triggers, for running a broadcast on demand.
    pub fn broadcaster(&self) -> Arc<Broadcaster> {
        self.broadcaster.clone()
    }

    pub async fn run_until_stop(self) -> Result<(), anyhow::Error> {
        let Application {
            server,
            mut scheduler,
            broadcaster,
            ..
        } = self;

        let served = server.await;
        scheduler
            .shutdown()
            .await
            .map_err(|err| anyhow::anyhow!("Failed to stop the broadcast scheduler: {:?}", err))?;

        tracing::info!("Waiting for any running broadcast to finish");
        broadcaster.wait_idle().await;

        Ok(served?)
    }
}

pub fn run(
    listener: TcpListener,
    subscriptions: Arc<SubscriptionManager>,
    weather_client: Arc<dyn WeatherProvider>,
    email_client: Arc<dyn MailSender>,
    base_url: String,
) -> Result<Server, std::io::Error> {
    let subscriptions = web::Data::from(subscriptions);
    let weather_client: web::Data<dyn WeatherProvider> = web::Data::from(weather_client);
    let email_client: web::Data<dyn MailSender> = web::Data::from(email_client);
    let base_url = web::Data::new(ApplicationBaseUrl(base_url));

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/subscribe", web::post().to(handle_subscribe))
            .route("/confirm", web::get().to(handle_confirm_subscription))
            .route("/unsubscribe", web::post().to(handle_unsubscribe))
            .app_data(subscriptions.clone())
            .app_data(weather_client.clone())
            .app_data(email_client.clone())
            .app_data(base_url.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> Pool<Postgres> {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}
