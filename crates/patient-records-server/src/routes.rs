//! Route handlers.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use patient_records_core::{
    NewPatient, Patient, PatientCollection, PatientUpdate, RecordResult, RecordService, RecordStore,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

pub type SharedService = Arc<RecordService<Box<dyn RecordStore>>>;

// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    pub service: SharedService,
}

impl AppState {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self {
            service: Arc::new(RecordService::new(store)),
        }
    }
}

/// Run a blocking service call on the blocking pool.
async fn blocking<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&RecordService<Box<dyn RecordStore>>) -> RecordResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(&state.service);
    Ok(tokio::task::spawn_blocking(move || op(service.as_ref())).await??)
}

#[derive(Debug, Deserialize)]
pub struct SortQuery {
    pub sort_by: String,
    #[serde(default = "default_order")]
    pub order: String,
}

fn default_order() -> String {
    "asc".to_string()
}

async fn home() -> Json<Value> {
    Json(json!({ "message": "Patient Management System" }))
}

async fn about() -> Json<Value> {
    Json(json!({ "message": "A fully functional API for managing patients." }))
}

async fn view(State(state): State<AppState>) -> Result<Json<PatientCollection>, ApiError> {
    let records = blocking(&state, |service| service.list_all()).await?;
    Ok(Json(records))
}

async fn view_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let patient = blocking(&state, move |service| service.get(&id)).await?;
    Ok(Json(patient))
}

async fn sort_patients(
    State(state): State<AppState>,
    query: Result<Query<SortQuery>, QueryRejection>,
) -> Result<Json<PatientCollection>, ApiError> {
    let Query(query) = query?;
    let records =
        blocking(&state, move |service| service.sort(&query.sort_by, &query.order)).await?;
    Ok(Json(records))
}

async fn create_patient(
    State(state): State<AppState>,
    payload: Result<Json<NewPatient>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) = payload?;
    blocking(&state, move |service| service.create(payload)).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Patient created successfully" })),
    ))
}

async fn edit_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    update: Result<Json<PatientUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(update) = update?;
    let patient = blocking(&state, move |service| service.update(&id, &update)).await?;
    Ok(Json(json!({
        "message": "Patient data updated successfully",
        "patient": patient,
    })))
}

async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    blocking(&state, move |service| service.delete(&id)).await?;
    Ok(Json(json!({ "message": "Patient data deleted successfully" })))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/view", get(view))
        .route("/patient/:id", get(view_patient))
        .route("/sort", get(sort_patients))
        .route("/create", post(create_patient))
        .route("/edit/:id", put(edit_patient))
        .route("/delete/:id", delete(delete_patient))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
