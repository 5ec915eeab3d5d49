use actix_web::{web, App, HttpServer};
use log::info;

use csv_depot::api::{download, healthcheck, home, list_files, upload};
use csv_depot::app_state::AppState;
use csv_depot::config::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load().expect("Failed to load configuration");

    log4rs::init_file(&config.logging.config_file, Default::default())
        .expect("Failed to initialize logging");

    let state = AppState::from_config(config.clone())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    info!(
        "Starting server on {}:{}",
        config.server.host, config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PayloadConfig::default().limit(state.config.server.max_payload_size))
            .service(home)
            .service(healthcheck)
            .service(upload)
            .service(download)
            .service(list_files)
    })
    .workers(config.server.workers)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
