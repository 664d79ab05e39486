// handlers/jobs.rs - /jobs routes

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::payload::{json_body, parse_id, validate_fields, validate_into, QueryParams, JOB_NEW, JOB_UPDATE};
use crate::database::models::{JobFilter, NewJob};
use crate::database::JobRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /jobs - admin only
///
/// Body: `{ title, salary?, equity?, companyHandle }`
pub async fn create_job(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let data: NewJob = validate_into(json_body(body)?, &JOB_NEW)?;

    let job = JobRepository::new(&state.pool, &state.operators).create(&data).await?;

    Ok(ApiResponse::created(json!({ "job": job })))
}

/// GET /jobs?title=&minSalary=&hasEquity=
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let filter = job_filter(params)?;

    let jobs = JobRepository::new(&state.pool, &state.operators).find_all(&filter).await?;

    Ok(ApiResponse::success(json!({ "jobs": jobs })))
}

/// GET /jobs/:id - includes the owning company
pub async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;

    let job = JobRepository::new(&state.pool, &state.operators).get(id).await?;

    Ok(ApiResponse::success(json!({ "job": job })))
}

/// PATCH /jobs/:id - admin only
///
/// Body: any of `{ title, salary, equity }`
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let fields = validate_fields(&json_body(body)?, &JOB_UPDATE)?;

    let job = JobRepository::new(&state.pool, &state.operators).update(id, &fields).await?;

    Ok(ApiResponse::success(json!({ "job": job })))
}

/// DELETE /jobs/:id - admin only
pub async fn delete_job(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;

    JobRepository::new(&state.pool, &state.operators).remove(id).await?;

    Ok(ApiResponse::success(json!({ "deleted": id })))
}

fn job_filter(params: HashMap<String, String>) -> Result<JobFilter, ApiError> {
    let mut query = QueryParams::new(params, &["title", "minSalary", "hasEquity"]);

    let filter = JobFilter {
        title: query.text("title"),
        min_salary: query.non_negative_int("minSalary"),
        has_equity: query.boolean("hasEquity"),
    };

    query.finish()?;
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_all_filters() {
        let filter = job_filter(params(&[("title", "eng"), ("minSalary", "1000"), ("hasEquity", "true")])).unwrap();

        assert_eq!(filter.title.as_deref(), Some("eng"));
        assert_eq!(filter.min_salary, Some(1000));
        assert_eq!(filter.has_equity, Some(true));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(job_filter(params(&[("hasEquity", "yes")])).is_err());
        assert!(job_filter(params(&[("minSalary", "-5")])).is_err());
        assert!(job_filter(params(&[("companyHandle", "c1")])).is_err());
    }
}
