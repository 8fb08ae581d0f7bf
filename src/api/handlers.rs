//! HTTP request handlers for the Payroll Generation Engine API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! request gets a correlation id that is attached to its log lines.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::GenerationRequest;
use crate::error::EngineError;
use crate::models::PayrollMonth;
use crate::store::PayrollStore;

use super::request::{
    DeleteAttendanceRequest, DeleteAttendanceResponse, ImportAttendanceRequest,
    PendingAttendanceQuery, WorkingDaysQuery,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S>(state: AppState<S>) -> Router
where
    S: PayrollStore + 'static,
{
    Router::new()
        .route("/payroll/generate", post(generate_handler::<S>))
        .route(
            "/payroll/:employee_id/:year/:month",
            get(get_payroll_handler::<S>),
        )
        .route("/attendance/delete", post(delete_attendance_handler::<S>))
        .route("/attendance/import", post(import_attendance_handler::<S>))
        .route("/attendance/pending", get(pending_attendance_handler::<S>))
        .route("/calendar/working-days", get(working_days_handler::<S>))
        .with_state(state)
}

/// Handler for POST /payroll/generate.
///
/// Runs a generation batch and returns the per-employee report. Individual
/// employee failures are part of a 200 response.
async fn generate_handler<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Response
where
    S: PayrollStore + 'static,
{
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll generation request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match state.engine().generate(request).await {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                run_id = %report.run_id,
                succeeded = report.succeeded,
                failed = report.failed,
                duration_us = start_time.elapsed().as_micros(),
                "Payroll generation completed"
            );
            json_ok(report)
        }
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /payroll/:employee_id/:year/:month.
async fn get_payroll_handler<S>(
    State(state): State<AppState<S>>,
    path: Result<Path<(String, i32, u32)>, PathRejection>,
) -> Response
where
    S: PayrollStore + 'static,
{
    let correlation_id = Uuid::new_v4();

    let (employee_id, year, month) = match path {
        Ok(Path(parts)) => parts,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid path");
            return ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
                .into_response();
        }
    };
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        year,
        month,
        "Fetching payroll record"
    );

    let result = match PayrollMonth::new(year, month) {
        Ok(period) => state.engine().get_payroll_record(&employee_id, period).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(record) => json_ok(record),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for POST /attendance/delete.
///
/// Deletes a month of attendance and the matching unpaid payroll records.
async fn delete_attendance_handler<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<DeleteAttendanceRequest>, JsonRejection>,
) -> Response
where
    S: PayrollStore + 'static,
{
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        year = request.year,
        month = request.month,
        employee_id = request.employee_id.as_deref().unwrap_or("*"),
        "Deleting attendance"
    );

    let result = match request.period() {
        Ok(period) => {
            state
                .engine()
                .delete_attendance(period, request.employee_id.as_deref())
                .await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(deleted_records) => json_ok(DeleteAttendanceResponse { deleted_records }),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for POST /attendance/import.
///
/// Invalid rows are reported in the response body; the valid ones are
/// stored.
async fn import_attendance_handler<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<ImportAttendanceRequest>, JsonRejection>,
) -> Response
where
    S: PayrollStore + 'static,
{
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        rows = request.rows.len(),
        "Importing attendance"
    );

    match state.engine().import_punches(request.rows).await {
        Ok(report) => json_ok(report),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /attendance/pending.
async fn pending_attendance_handler<S>(
    State(state): State<AppState<S>>,
    query: Result<Query<PendingAttendanceQuery>, QueryRejection>,
) -> Response
where
    S: PayrollStore + 'static,
{
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };

    let result = match query.period() {
        Ok(period) => {
            state
                .engine()
                .pending_attendance(&query.employee_id, period)
                .await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(pending) => json_ok(pending),
        Err(err) => engine_error(correlation_id, err),
    }
}

/// Handler for GET /calendar/working-days.
async fn working_days_handler<S>(
    State(state): State<AppState<S>>,
    query: Result<Query<WorkingDaysQuery>, QueryRejection>,
) -> Response
where
    S: PayrollStore + 'static,
{
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };

    let result = match query.period() {
        Ok(period) => {
            state
                .engine()
                .working_days(period, query.office_id.as_deref())
                .await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(summary) => json_ok(summary),
        Err(err) => engine_error(correlation_id, err),
    }
}

fn json_ok<T: Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn engine_error(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        code = err.code(),
        error = %err,
        "Request failed"
    );
    ApiErrorResponse::from(err).into_response()
}

fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error).into_response()
}

fn query_rejection(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
    ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text())).into_response()
}
