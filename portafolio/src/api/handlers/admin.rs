use axum::{
    Json,
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};
use tracing::info;

use crate::{
    AppState,
    api::models::imports::ImportResponse,
    auth::permissions::{RequiresPermission, operation, resource},
    csv_import::{self, PROYECTOS_HEADERS, PROYECTOS_TEMPLATE_FILENAME, STAFF_HEADERS, STAFF_TEMPLATE_FILENAME},
    db::handlers::{Proyectos, Staff},
    errors::{Error, Result},
};

fn csv_attachment(filename: &str, headers: &[&str]) -> Result<impl IntoResponse> {
    let body = csv_import::template(headers).map_err(|e| Error::Other(e.into()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    ))
}

/// Read the `file` field of a multipart upload, enforcing the configured size limit.
async fn read_upload(mut multipart: Multipart, max_file_size: usize) -> Result<Vec<u8>> {
    let mut file: Option<Vec<u8>> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read file chunk: {e}"),
        })? {
            if data.len() + chunk.len() > max_file_size {
                tracing::warn!(max_file_size, "Upload exceeds the size limit");
                return Err(Error::BadRequest {
                    message: format!("File size exceeds maximum allowed size of {max_file_size} bytes"),
                });
            }
            data.extend_from_slice(&chunk);
        }
        file = Some(data);
    }

    file.ok_or_else(|| Error::BadRequest {
        message: "No se ha subido ningún archivo.".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/admin/proyectos/template",
    tag = "admin",
    summary = "Download the proyectos CSV template",
    responses(
        (status = 200, description = "Header-only CSV", content_type = "text/csv", body = String),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn proyectos_template(_: RequiresPermission<resource::Imports, operation::ReadAll>) -> Result<impl IntoResponse> {
    csv_attachment(PROYECTOS_TEMPLATE_FILENAME, &PROYECTOS_HEADERS)
}

#[utoipa::path(
    post,
    path = "/admin/proyectos/import",
    tag = "admin",
    summary = "Import proyectos from CSV",
    request_body(content_type = "multipart/form-data", description = "CSV file in the `file` field"),
    responses(
        (status = 200, description = "Every row imported", body = ImportResponse),
        (status = 400, description = "No file, or file too large"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Import failed and nothing was written"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn import_proyectos(
    State(state): State<AppState>,
    current_user: RequiresPermission<resource::Imports, operation::CreateAll>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>> {
    let data = read_upload(multipart, state.config.import.max_file_size).await?;
    let rows = csv_import::parse_proyectos(&data).map_err(|e| Error::ImportFailed(e.into()))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Proyectos::new(&mut conn)
        .create_many(&rows)
        .await
        .map_err(|e| Error::ImportFailed(e.into()))?;

    info!(user_id = current_user.id, created, "Imported proyectos from CSV");
    Ok(Json(ImportResponse::proyectos(created)))
}

#[utoipa::path(
    get,
    path = "/admin/staff/template",
    tag = "admin",
    summary = "Download the staff CSV template",
    responses(
        (status = 200, description = "Header-only CSV", content_type = "text/csv", body = String),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn staff_template(_: RequiresPermission<resource::Imports, operation::ReadAll>) -> Result<impl IntoResponse> {
    csv_attachment(STAFF_TEMPLATE_FILENAME, &STAFF_HEADERS)
}

#[utoipa::path(
    post,
    path = "/admin/staff/import",
    tag = "admin",
    summary = "Import staff from CSV",
    request_body(content_type = "multipart/form-data", description = "CSV file in the `file` field"),
    responses(
        (status = 200, description = "Every row imported", body = ImportResponse),
        (status = 400, description = "No file, or file too large"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Import failed and nothing was written"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn import_staff(
    State(state): State<AppState>,
    current_user: RequiresPermission<resource::Imports, operation::CreateAll>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>> {
    let data = read_upload(multipart, state.config.import.max_file_size).await?;
    let rows = csv_import::parse_staff(&data).map_err(|e| Error::ImportFailed(e.into()))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Staff::new(&mut conn)
        .create_many(&rows)
        .await
        .map_err(|e| Error::ImportFailed(e.into()))?;

    info!(user_id = current_user.id, created, "Imported staff from CSV");
    Ok(Json(ImportResponse::staff(created)))
}
