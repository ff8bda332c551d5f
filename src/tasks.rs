// src/tasks.rs

use actix_web::{web, HttpResponse};
use log::{debug, error, info};
use serde_json::json;

use crate::app_state::AppState;
use crate::encoder::{encode_document, to_json};
use crate::error::ApiError;
use crate::models::{Task, TASK_COLLECTION};
use crate::store::Filter;

/// GET /api/tasks
/// Lists every task, each document encoded for the response.
pub async fn list_tasks(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let documents = match data.store.list(TASK_COLLECTION, Filter::all(), None).await {
        Ok(docs) => docs,
        Err(e) => {
            error!("Error fetching tasks: {}", e);
            return Err(e.into());
        }
    };

    let tasks: Vec<serde_json::Value> = documents
        .into_iter()
        .map(|doc| to_json(encode_document(doc)))
        .collect();
    debug!("Listed {} tasks", tasks.len());
    Ok(HttpResponse::Ok().json(tasks))
}

/// POST /api/tasks
/// Creates a task and returns its new id.
pub async fn create_task(
    data: web::Data<AppState>,
    payload: web::Json<Task>,
) -> Result<HttpResponse, ApiError> {
    let task = payload.into_inner();
    task.validate().map_err(ApiError::Validation)?;

    match data.store.create(TASK_COLLECTION, &task).await {
        Ok(id) => {
            info!("Task created: {}", id);
            Ok(HttpResponse::Created().json(json!({ "id": id.to_string() })))
        }
        Err(e) => {
            error!("Error inserting task: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{
        http::{header, StatusCode},
        test, web, App,
    };
    use serde_json::{json, Value};

    use crate::app_state::AppState;
    use crate::config::Config;
    use crate::routes;
    use crate::store::tests::FailingBackend;
    use crate::store::{DocumentStore, MemoryBackend};

    fn state(store: DocumentStore) -> web::Data<AppState> {
        web::Data::new(AppState {
            store,
            config: Config::from_lookup(|_| None),
        })
    }

    fn memory_store() -> DocumentStore {
        DocumentStore::with_backend(MemoryBackend::new("test_db"))
    }

    #[actix_web::test]
    async fn create_then_list_round_trips() {
        let app = test::init_service(App::new().app_data(state(memory_store())).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .set_json(json!({"title": "Ship order", "assigned_to": "Alice"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

        let req = test::TestRequest::get().uri("/api/tasks").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let tasks: Vec<Value> = test::read_body_json(resp).await;
        assert_eq!(tasks.len(), 1);

        let task = &tasks[0];
        assert_eq!(task["id"], id.as_str());
        assert_eq!(task["title"], "Ship order");
        assert_eq!(task["assigned_to"], "Alice");
        assert_eq!(task["priority"], "Medium");
        assert_eq!(task["status"], "Pending");
        assert_eq!(task["recurring"], "none");
        assert_eq!(task["description"], Value::Null);
        assert!(task.get("_id").is_none());
        assert!(task["created_at"].is_string());
    }

    #[actix_web::test]
    async fn list_on_empty_collection_is_empty_array() {
        let app = test::init_service(App::new().app_data(state(memory_store())).configure(routes)).await;
        let req = test::TestRequest::get().uri("/api/tasks").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let tasks: Value = test::read_body_json(resp).await;
        assert_eq!(tasks, json!([]));
    }

    #[actix_web::test]
    async fn missing_required_field_is_422_and_not_stored() {
        let store = memory_store();
        let app = test::init_service(App::new().app_data(state(store.clone())).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .set_json(json!({"title": "X"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["detail"].as_array().is_some_and(|d| !d.is_empty()));

        let req = test::TestRequest::get().uri("/api/tasks").to_request();
        let tasks: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert!(tasks.is_empty());
    }

    #[actix_web::test]
    async fn invalid_enum_and_empty_title_are_422() {
        let app = test::init_service(App::new().app_data(state(memory_store())).configure(routes)).await;

        for body in [
            json!({"title": "X", "assigned_to": "Alice", "priority": "Urgent"}),
            json!({"title": "", "assigned_to": "Alice"}),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/tasks")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[actix_web::test]
    async fn whitespace_title_is_accepted() {
        let app = test::init_service(App::new().app_data(state(memory_store())).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .set_json(json!({"title": "  ", "assigned_to": "A"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/api/tasks").to_request();
        let tasks: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["title"], "  ");
    }

    #[actix_web::test]
    async fn non_json_content_type_is_415() {
        let app = test::init_service(App::new().app_data(state(memory_store())).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload(r#"{"title": "Ship order", "assigned_to": "Alice"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"][0]["type"], "content_type_error");
    }

    #[actix_web::test]
    async fn oversized_body_is_413() {
        let app = test::init_service(App::new().app_data(state(memory_store())).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .set_json(json!({"title": "x".repeat(64 * 1024), "assigned_to": "Alice"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let req = test::TestRequest::get().uri("/api/tasks").to_request();
        let tasks: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert!(tasks.is_empty());
    }

    #[actix_web::test]
    async fn unavailable_store_yields_500_with_detail() {
        let store = DocumentStore::unavailable("DATABASE_URL is not set");
        let app = test::init_service(App::new().app_data(state(store)).configure(routes)).await;

        let req = test::TestRequest::get().uri("/api/tasks").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(!body["detail"].as_str().unwrap().is_empty());

        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .set_json(json!({"title": "Ship order", "assigned_to": "Alice"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn rejected_store_operations_yield_500() {
        let store = DocumentStore::with_backend(FailingBackend);
        let app = test::init_service(App::new().app_data(state(store)).configure(routes)).await;

        let req = test::TestRequest::get().uri("/api/tasks").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["detail"].as_str().unwrap().contains("connection reset"));

        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .set_json(json!({"title": "Ship order", "assigned_to": "Alice"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
