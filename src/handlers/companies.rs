// handlers/companies.rs - /companies routes

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::payload::{json_body, validate_fields, validate_into, QueryParams, COMPANY_NEW, COMPANY_UPDATE};
use crate::database::models::{CompanyFilter, NewCompany};
use crate::database::CompanyRepository;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /companies - admin only
///
/// Body: `{ handle, name, description, numEmployees?, logoUrl? }`
pub async fn create_company(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let data: NewCompany = validate_into(json_body(body)?, &COMPANY_NEW)?;

    let company = CompanyRepository::new(&state.pool, &state.operators).create(&data).await?;

    Ok(ApiResponse::created(json!({ "company": company })))
}

/// GET /companies?name=&minEmployees=&maxEmployees=
pub async fn list_companies(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let filter = company_filter(params)?;

    let companies = CompanyRepository::new(&state.pool, &state.operators).find_all(&filter).await?;

    Ok(ApiResponse::success(json!({ "companies": companies })))
}

/// GET /companies/:handle - includes the company's jobs
pub async fn get_company(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<Value> {
    let company = CompanyRepository::new(&state.pool, &state.operators).get(&handle).await?;

    Ok(ApiResponse::success(json!({ "company": company })))
}

/// PATCH /companies/:handle - admin only
///
/// Body: any of `{ name, description, numEmployees, logoUrl }`
pub async fn update_company(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let fields = validate_fields(&json_body(body)?, &COMPANY_UPDATE)?;

    let company = CompanyRepository::new(&state.pool, &state.operators)
        .update(&handle, &fields)
        .await?;

    Ok(ApiResponse::success(json!({ "company": company })))
}

/// DELETE /companies/:handle - admin only
pub async fn delete_company(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<Value> {
    CompanyRepository::new(&state.pool, &state.operators).remove(&handle).await?;

    Ok(ApiResponse::success(json!({ "deleted": handle })))
}

fn company_filter(params: HashMap<String, String>) -> Result<CompanyFilter, crate::error::ApiError> {
    let mut query = QueryParams::new(params, &["name", "minEmployees", "maxEmployees"]);

    let filter = CompanyFilter {
        name: query.text("name"),
        min_employees: query.non_negative_int("minEmployees"),
        max_employees: query.non_negative_int("maxEmployees"),
    };

    if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
        if min > max {
            query.reject("minEmployees", "cannot be greater than maxEmployees");
        }
    }

    query.finish()?;
    Ok(filter)
}
