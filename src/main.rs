use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod auth;
mod clock;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
#[cfg(test)]
mod test_util;

use clock::Clock;
use config::Config;
use db::init_db;
use service::notify::{Notifier, StoredNotifier};

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Shiftgate"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections).await;

    let clock = Clock::from_offset_minutes(config.tz_offset_minutes);

    // Single delivery capability for the whole process; the scheduler and the
    // check-in fan-out share it.
    let notifier: Arc<dyn Notifier> = Arc::new(StoredNotifier::new(pool.clone()));

    service::scheduler::spawn(
        pool.clone(),
        notifier.clone(),
        clock,
        config.reminder_hour,
        config.report_day,
        config.report_hour,
    );

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();
    let notifier_data: Data<dyn Notifier> = Data::from(notifier);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(clock))
            .app_data(notifier_data.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
