//! Activity-record handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::auth_middleware;
use crate::api::AppState;
use crate::config::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::domain::{ActivityPatch, ActivityRecord, Location, NewActivity, User};
use crate::errors::{AppError, AppResult};
use crate::services::WeeklyReport;
use crate::types::{NoContent, PageParams};

/// Create-record request; `location` uses the `"LAT LONG"` wire format
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateResultRequest {
    /// Activity date as YYYY-MM-DD
    #[schema(example = "2015-06-20")]
    pub date: String,
    /// Distance in meters, positive
    #[schema(example = 2000)]
    pub distance: i32,
    /// Duration in seconds, positive
    #[schema(example = 405)]
    pub time: i32,
    /// Decimal-degree coordinates
    #[schema(example = "32.0853 34.7818")]
    pub location: String,
}

/// Partial update of a record
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateResultRequest {
    #[schema(example = "2015-06-21")]
    pub date: Option<String>,
    #[schema(example = 2100)]
    pub distance: Option<i32>,
    #[schema(example = 410)]
    pub time: Option<i32>,
    #[schema(example = "32.0853 34.7818")]
    pub location: Option<String>,
}

/// Identifier of a freshly created record
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateResultResponse {
    pub result_id: Uuid,
}

/// Record as returned to clients
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub distance: i32,
    pub time: i32,
    /// `"LAT LONG"` wire format
    pub location: String,
    /// Weather snapshot captured at write time
    #[schema(value_type = Object)]
    pub condition: serde_json::Value,
    pub iso_year: i32,
    pub iso_week: i32,
}

impl From<ActivityRecord> for ActivityResponse {
    fn from(record: ActivityRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.owner_id,
            date: record.date,
            distance: record.distance,
            time: record.duration,
            location: record.location.to_string(),
            condition: record.condition.into_value(),
            iso_year: record.iso_year,
            iso_week: record.iso_week,
        }
    }
}

/// Listing query: paging plus the optional filter expression.
///
/// Flattened by hand because the query-string deserializer does not support
/// `#[serde(flatten)]` for non-string fields.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListResultsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_count")]
    pub count: u64,
    /// Filter expression, e.g. `date eq '2019-07-15'`
    pub filter: Option<String>,
}

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_count() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl ListResultsQuery {
    fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            count: self.count,
        }
    }
}

/// Create activity routes (all require an authenticated actor)
pub fn activity_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_result).get(list_results))
        .route("/reports/weekly", get(weekly_report))
        .route(
            "/:id",
            get(get_result).patch(update_result).delete(delete_result),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::validation("invalid date (should be 'YYYY-MM-DD')"))
}

/// Create an activity record
#[utoipa::path(
    post,
    path = "/results",
    tag = "Results",
    security(("bearer_auth" = [])),
    request_body = CreateResultRequest,
    responses(
        (status = 201, description = "Record created", body = CreateResultResponse),
        (status = 400, description = "Malformed payload or failed weather lookup"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_result(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    ValidatedJson(payload): ValidatedJson<CreateResultRequest>,
) -> AppResult<(StatusCode, Json<CreateResultResponse>)> {
    let input = NewActivity {
        date: parse_date(&payload.date)?,
        distance: payload.distance,
        duration: payload.time,
        location: Location::parse(&payload.location)?,
    };

    let result_id = state.activity_service.create(&actor, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateResultResponse { result_id }),
    ))
}

/// List the actor's records
#[utoipa::path(
    get,
    path = "/results",
    tag = "Results",
    security(("bearer_auth" = [])),
    params(ListResultsQuery),
    responses(
        (status = 200, description = "Records ordered by date", body = [ActivityResponse]),
        (status = 400, description = "Invalid paging or rejected filter")
    )
)]
pub async fn list_results(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Query(query): Query<ListResultsQuery>,
) -> AppResult<Json<Vec<ActivityResponse>>> {
    let records = state
        .activity_service
        .list(&actor, query.filter.as_deref(), &query.page_params())
        .await?;

    Ok(Json(records.into_iter().map(ActivityResponse::from).collect()))
}

/// Fetch one record
#[utoipa::path(
    get,
    path = "/results/{id}",
    tag = "Results",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The record", body = ActivityResponse),
        (status = 400, description = "Invalid or missing id"),
        (status = 403, description = "Record belongs to another user")
    )
)]
pub async fn get_result(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ActivityResponse>> {
    let record = state.activity_service.get(&actor, id).await?;
    Ok(Json(ActivityResponse::from(record)))
}

/// Partially update one record
#[utoipa::path(
    patch,
    path = "/results/{id}",
    tag = "Results",
    security(("bearer_auth" = [])),
    request_body = UpdateResultRequest,
    responses(
        (status = 200, description = "Updated record", body = ActivityResponse),
        (status = 400, description = "Invalid id or fields"),
        (status = 403, description = "Record belongs to another user")
    )
)]
pub async fn update_result(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateResultRequest>,
) -> AppResult<Json<ActivityResponse>> {
    let patch = ActivityPatch {
        date: payload.date.as_deref().map(parse_date).transpose()?,
        distance: payload.distance,
        duration: payload.time,
        location: payload.location.as_deref().map(Location::parse).transpose()?,
    };

    let record = state.activity_service.update(&actor, id, patch).await?;
    Ok(Json(ActivityResponse::from(record)))
}

/// Delete one record
#[utoipa::path(
    delete,
    path = "/results/{id}",
    tag = "Results",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 400, description = "Invalid id or record already deleted"),
        (status = 403, description = "Record belongs to another user")
    )
)]
pub async fn delete_result(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.activity_service.delete(&actor, id).await?;
    Ok(NoContent)
}

/// Weekly report over the actor's records
#[utoipa::path(
    get,
    path = "/results/reports/weekly",
    tag = "Results",
    security(("bearer_auth" = [])),
    params(PageParams),
    responses(
        (status = 200, description = "Per-year, per-week pace and distance summary"),
        (status = 400, description = "Invalid paging")
    )
)]
pub async fn weekly_report(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<WeeklyReport>> {
    let report = state.activity_service.weekly_report(&actor, &params).await?;
    Ok(Json(report))
}
