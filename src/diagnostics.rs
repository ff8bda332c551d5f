// src/diagnostics.rs

use actix_web::{web, HttpResponse, Responder};
use log::warn;
use serde::Serialize;
use serde_json::json;

use crate::app_state::AppState;
use crate::error::truncate;

const RUNNING: &str = "✅ Running";
const CONNECTED: &str = "✅ Connected";
const NOT_CONNECTED: &str = "❌ Not Connected";
const SET: &str = "✅ Set";
const NOT_SET: &str = "❌ Not Set";

/// Longest error text shown in the collections list.
const MAX_ERROR_CHARS: usize = 80;

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub collections: Vec<String>,
}

/// GET /
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "Supply Chain Task & Workflow API running" }))
}

/// GET /test
/// Reports whether the store is usable. Always 200, failures are described in the body.
pub async fn test_database(data: web::Data<AppState>) -> impl Responder {
    let store = &data.store;

    let database_url = if data.config.database_url.is_some() { SET } else { NOT_SET };
    let (database, database_name, collections) = match store.database_name() {
        Some(name) => {
            let collections = match store.collection_names().await {
                Ok(names) => names,
                Err(e) => {
                    warn!("Error listing collections: {}", e);
                    vec![format!("error: {}", truncate(&e.to_string(), MAX_ERROR_CHARS))]
                }
            };
            (CONNECTED, name.to_string(), collections)
        }
        None => (NOT_CONNECTED, NOT_SET.to_string(), Vec::new()),
    };

    HttpResponse::Ok().json(DatabaseStatus {
        backend: RUNNING.to_string(),
        database: database.to_string(),
        database_url: database_url.to_string(),
        database_name,
        collections,
    })
}
