use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    AppState,
    api::{
        handlers::{not_found, or_not_found},
        models::staff::{ListStaffQuery, StaffInput, StaffListResponse, StaffResponse},
        validation::extract_validated_json,
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        handlers::{Repository, Staff, staff::StaffFilter},
        models::staff::StaffCreateDBRequest,
    },
    errors::{Error, Result},
    types::StaffId,
};

const STAFF: &str = "Staff member";

#[utoipa::path(
    get,
    path = "/staff",
    tag = "staff",
    summary = "List staff",
    params(ListStaffQuery),
    responses(
        (status = 200, description = "Page of staff members", body = StaffListResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_staff(
    State(state): State<AppState>,
    Query(query): Query<ListStaffQuery>,
    _: RequiresPermission<resource::Staff, operation::ReadAll>,
) -> Result<Json<StaffListResponse>> {
    let (skip, limit) = query.pagination.params();
    let filter = StaffFilter::new(skip, limit).with_search(query.search);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Staff::new(&mut conn);
    let staff = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(StaffListResponse {
        staff: staff.into_iter().map(StaffResponse::from).collect(),
        total_count,
    }))
}

#[utoipa::path(
    post,
    path = "/staff",
    tag = "staff",
    summary = "Create staff member",
    request_body = StaffInput,
    responses(
        (status = 201, description = "Staff member created", body = StaffResponse),
        (status = 400, description = "Invalid request"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_staff(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Staff, operation::CreateAll>,
    body: std::result::Result<Json<StaffInput>, JsonRejection>,
) -> Result<(StatusCode, Json<StaffResponse>)> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let staff = Staff::new(&mut conn).create(&StaffCreateDBRequest::from(&request)).await?;

    Ok((StatusCode::CREATED, Json(StaffResponse::from(staff))))
}

#[utoipa::path(
    get,
    path = "/staff/{id}",
    tag = "staff",
    summary = "Get staff member",
    params(("id" = i32, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff member", body = StaffResponse),
        (status = 404, description = "Staff member not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_staff(
    State(state): State<AppState>,
    Path(id): Path<StaffId>,
    _: RequiresPermission<resource::Staff, operation::ReadAll>,
) -> Result<Json<StaffResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let staff = Staff::new(&mut conn).get_by_id(id).await?.ok_or_else(|| not_found(STAFF, id))?;

    Ok(Json(StaffResponse::from(staff)))
}

#[utoipa::path(
    put,
    path = "/staff/{id}",
    tag = "staff",
    summary = "Update staff member",
    request_body = StaffInput,
    params(("id" = i32, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Updated staff member", body = StaffResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Staff member not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<StaffId>,
    _: RequiresPermission<resource::Staff, operation::UpdateAll>,
    body: std::result::Result<Json<StaffInput>, JsonRejection>,
) -> Result<Json<StaffResponse>> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let staff = Staff::new(&mut conn)
        .update(id, &request)
        .await
        .map_err(or_not_found(STAFF, id))?;

    Ok(Json(StaffResponse::from(staff)))
}

#[utoipa::path(
    delete,
    path = "/staff/{id}",
    tag = "staff",
    summary = "Delete staff member",
    params(("id" = i32, Path, description = "Staff ID")),
    responses(
        (status = 204, description = "Staff member deleted"),
        (status = 404, description = "Staff member not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_staff(
    State(state): State<AppState>,
    Path(id): Path<StaffId>,
    _: RequiresPermission<resource::Staff, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Staff::new(&mut conn).delete(id).await? {
        return Err(not_found(STAFF, id));
    }

    Ok(StatusCode::NO_CONTENT)
}
