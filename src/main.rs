// src/main.rs

mod app_state;
mod config;
mod diagnostics;
mod encoder;
mod error;
mod models;
mod store;
mod tasks;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::info;

use crate::app_state::AppState;
use crate::diagnostics::{root, test_database};
use crate::error::json_error_handler;
use crate::store::DocumentStore;
use crate::tasks::{create_task, list_tasks};

/// Route table shared by the server and the handler tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/", web::get().to(root))
        .route("/test", web::get().to(test_database))
        .service(
            web::scope("/api/tasks")
                .route("", web::get().to(list_tasks))
                .route("", web::post().to(create_task)),
        );
}

fn cors(allowed_origin: Option<&str>) -> Cors {
    let cors = match allowed_origin {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };
    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            http::header::CONTENT_TYPE,
            http::header::ACCEPT,
            http::header::AUTHORIZATION,
        ])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = config::Config::from_env();
    let store = DocumentStore::connect(&config).await;
    if !store.is_available() {
        info!("Starting in degraded mode: task endpoints will answer 500");
    }

    let (host, port) = config.bind_address();
    info!("Server running at http://{}:{}", host, port);
    match &config.cors_allowed_origin {
        Some(origin) => info!("Allowed CORS Origin: {}", origin),
        None => info!("Allowed CORS Origin: any"),
    }

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors(config.cors_allowed_origin.as_deref()))
            .app_data(web::Data::new(AppState {
                store: store.clone(),
                config: config.clone(),
            }))
            .configure(routes)
    })
        .bind((host, port))?
        .run()
        .await
}
