use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use serde::Serialize;
use tower::ServiceBuilder;

use crate::data::{SectionRequest, TimetableEntry, TimetableRequest};
use crate::error::ScheduleError;
use crate::model::SolveOptions;
use crate::sequential;
use crate::solver;

/// How many solves may run at once; the rest of the requests queue.
const MAX_CONCURRENT_SOLVES: usize = 2;

#[derive(Debug, Serialize)]
struct TimetableResponse {
    timetable: Vec<TimetableEntry>,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct FailResponse {
    error: String,
    status: &'static str,
}

fn success(timetable: Vec<TimetableEntry>) -> Json<TimetableResponse> {
    Json(TimetableResponse {
        timetable,
        status: "success",
    })
}

fn failure(code: StatusCode, err: &ScheduleError) -> (StatusCode, Json<FailResponse>) {
    (
        code,
        Json(FailResponse {
            error: err.to_string(),
            status: "fail",
        }),
    )
}

async fn generate_timetable(
    State(options): State<SolveOptions>,
    Json(request): Json<TimetableRequest>,
) -> Result<Json<TimetableResponse>, (StatusCode, Json<FailResponse>)> {
    match solver::build_timetable(&request, options) {
        Ok(timetable) => Ok(success(timetable)),
        Err(err) => Err(failure(StatusCode::INTERNAL_SERVER_ERROR, &err)),
    }
}

async fn generate_section_timetable(
    State(options): State<SolveOptions>,
    Json(request): Json<SectionRequest>,
) -> Result<Json<TimetableResponse>, (StatusCode, Json<FailResponse>)> {
    let result = sequential::schedule_sections(
        std::slice::from_ref(&request.section),
        &request.teachers,
        &request.rooms,
        &request.subjects,
        &request.lecture_slots,
        options,
    );
    match result {
        Ok(timetable) => Ok(success(timetable)),
        Err(err @ ScheduleError::InvalidInput(_)) => {
            Err(failure(StatusCode::BAD_REQUEST, &err))
        }
        Err(err) => Err(failure(StatusCode::INTERNAL_SERVER_ERROR, &err)),
    }
}

pub async fn run_server() {
    let options = SolveOptions {
        time_limit: std::env::var("SOLVER_TIME_LIMIT_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok()),
    };

    let app = Router::new()
        .route("/generate_timetable", post(generate_timetable))
        .route("/generate_section_timetable", post(generate_section_timetable))
        .layer(ServiceBuilder::new().concurrency_limit(MAX_CONCURRENT_SOLVES))
        .with_state(options);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    println!("Server running at http://{}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
