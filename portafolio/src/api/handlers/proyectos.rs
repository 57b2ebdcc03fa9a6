use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use sqlx::PgConnection;

use crate::{
    AppState,
    api::{
        handlers::{not_found, or_not_found},
        models::{
            clientes::{ClienteInput, ClienteResponse},
            detalles::{BackendDetailsInput, FrontendDetailsInput, InfraestructuraInput, LicenciasInput},
            enums,
            integraciones::IntegracionResponse,
            proyectos::{
                LinkIntegracionRequest, LinkStaffRequest, ListProyectosQuery, ProyectoInput, ProyectoResponse, ProyectosListResponse,
            },
            staff::StaffResponse,
            tecnologias::{TecnologiasProfile, TecnologiasResponse},
        },
        validation::{Validate, extract_validated_json},
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        handlers::{
            Clientes, Detalles, Integraciones, Proyectos, Repository, Staff, Tecnologias, detalles::DetailRow,
            proyectos::ProyectoFilter,
        },
        models::{
            detalles::{BackendDetailsDBResponse, FrontendDetailsDBResponse, InfraestructuraDBResponse, LicenciasDBResponse},
            proyectos::{ProyectoCreateDBRequest, ProyectoDBResponse},
        },
    },
    errors::{Error, Result},
    types::{IntegracionId, ProyectoId, StaffId},
};

const PROYECTO: &str = "Proyecto";

/// Attach every relation to a batch of project rows, preserving their order.
async fn load_relations(conn: &mut PgConnection, rows: Vec<ProyectoDBResponse>) -> Result<Vec<ProyectoResponse>> {
    let ids: Vec<ProyectoId> = rows.iter().map(|p| p.id).collect();
    let cliente_ids: Vec<i32> = rows.iter().filter_map(|p| p.cliente_id).collect();

    let mut staff = Proyectos::new(&mut *conn).staff_for(&ids).await?;
    let mut integraciones = Proyectos::new(&mut *conn).integraciones_for(&ids).await?;
    let clientes = Clientes::new(&mut *conn).get_bulk(cliente_ids).await?;
    let mut tecnologias = Tecnologias::new(&mut *conn).get_by_proyectos(&ids).await?;

    let mut detalles = Detalles::new(&mut *conn);
    let mut backend = detalles.get_by_proyectos::<BackendDetailsDBResponse>(&ids).await?;
    let mut frontend = detalles.get_by_proyectos::<FrontendDetailsDBResponse>(&ids).await?;
    let mut infraestructura = detalles.get_by_proyectos::<InfraestructuraDBResponse>(&ids).await?;
    let mut licencias = detalles.get_by_proyectos::<LicenciasDBResponse>(&ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            let cliente = row.cliente_id.and_then(|cid| clientes.get(&cid).cloned());
            let mut proyecto = ProyectoResponse::from(row);
            proyecto.staff = staff.remove(&id).unwrap_or_default().into_iter().map(StaffResponse::from).collect();
            proyecto.integraciones = integraciones
                .remove(&id)
                .unwrap_or_default()
                .into_iter()
                .map(IntegracionResponse::from)
                .collect();
            proyecto.cliente = cliente.map(ClienteResponse::from);
            proyecto.tecnologias = tecnologias.remove(&id).map(TecnologiasResponse::from);
            proyecto.backend_details = backend.remove(&id);
            proyecto.frontend_details = frontend.remove(&id);
            proyecto.infraestructura = infraestructura.remove(&id);
            proyecto.licencias = licencias.remove(&id);
            proyecto
        })
        .collect())
}

async fn load_one(conn: &mut PgConnection, id: ProyectoId) -> Result<ProyectoResponse> {
    let row = Proyectos::new(&mut *conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(PROYECTO, id))?;

    load_relations(conn, vec![row])
        .await?
        .pop()
        .ok_or_else(|| not_found(PROYECTO, id))
}

async fn ensure_proyecto(conn: &mut PgConnection, id: ProyectoId) -> Result<()> {
    if Proyectos::new(conn).exists(id).await? {
        Ok(())
    } else {
        Err(not_found(PROYECTO, id))
    }
}

#[utoipa::path(
    get,
    path = "/proyectos/enums",
    tag = "proyectos",
    summary = "List enum values",
    responses(
        (status = 200, description = "Every enum keyed by name", body = BTreeMap<String, Vec<String>>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_enums(_: RequiresPermission<resource::Proyectos, operation::ReadAll>) -> Json<BTreeMap<&'static str, Vec<&'static str>>> {
    Json(enums::catalog())
}

#[utoipa::path(
    get,
    path = "/proyectos",
    tag = "proyectos",
    summary = "List proyectos",
    params(ListProyectosQuery),
    responses(
        (status = 200, description = "Page of proyectos with relations", body = ProyectosListResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_proyectos(
    State(state): State<AppState>,
    Query(query): Query<ListProyectosQuery>,
    _: RequiresPermission<resource::Proyectos, operation::ReadAll>,
) -> Result<Json<ProyectosListResponse>> {
    let (skip, limit) = query.pagination.params();
    let filter = ProyectoFilter::new(skip, limit).with_search(query.search);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let rows = Proyectos::new(&mut conn).list(&filter).await?;
    let total_count = Proyectos::new(&mut conn).count(&filter).await?;
    let proyectos = load_relations(&mut conn, rows).await?;

    Ok(Json(ProyectosListResponse { proyectos, total_count }))
}

#[utoipa::path(
    post,
    path = "/proyectos",
    tag = "proyectos",
    summary = "Create proyecto",
    request_body = ProyectoInput,
    responses(
        (status = 201, description = "Proyecto created", body = ProyectoResponse),
        (status = 400, description = "Invalid request or unknown clienteId"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_proyecto(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Proyectos, operation::CreateAll>,
    body: std::result::Result<Json<ProyectoInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ProyectoResponse>)> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let row = Proyectos::new(&mut conn).create(&ProyectoCreateDBRequest::from(&request)).await?;
    let proyecto = load_one(&mut conn, row.id).await?;

    Ok((StatusCode::CREATED, Json(proyecto)))
}

#[utoipa::path(
    get,
    path = "/proyectos/{id}",
    tag = "proyectos",
    summary = "Get proyecto",
    params(("id" = i32, Path, description = "Proyecto ID")),
    responses(
        (status = 200, description = "Proyecto with relations", body = ProyectoResponse),
        (status = 404, description = "Proyecto not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_proyecto(
    State(state): State<AppState>,
    Path(id): Path<ProyectoId>,
    _: RequiresPermission<resource::Proyectos, operation::ReadAll>,
) -> Result<Json<ProyectoResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Ok(Json(load_one(&mut conn, id).await?))
}

#[utoipa::path(
    put,
    path = "/proyectos/{id}",
    tag = "proyectos",
    summary = "Update proyecto",
    request_body = ProyectoInput,
    params(("id" = i32, Path, description = "Proyecto ID")),
    responses(
        (status = 200, description = "Updated proyecto", body = ProyectoResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Proyecto not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_proyecto(
    State(state): State<AppState>,
    Path(id): Path<ProyectoId>,
    _: RequiresPermission<resource::Proyectos, operation::UpdateAll>,
    body: std::result::Result<Json<ProyectoInput>, JsonRejection>,
) -> Result<Json<ProyectoResponse>> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Proyectos::new(&mut conn)
        .update(id, &request)
        .await
        .map_err(or_not_found(PROYECTO, id))?;

    Ok(Json(load_one(&mut conn, id).await?))
}

#[utoipa::path(
    delete,
    path = "/proyectos/{id}",
    tag = "proyectos",
    summary = "Delete proyecto",
    params(("id" = i32, Path, description = "Proyecto ID")),
    responses(
        (status = 204, description = "Proyecto deleted"),
        (status = 404, description = "Proyecto not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_proyecto(
    State(state): State<AppState>,
    Path(id): Path<ProyectoId>,
    _: RequiresPermission<resource::Proyectos, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Proyectos::new(&mut conn).delete(id).await? {
        return Err(not_found(PROYECTO, id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/proyectos/{id}/cliente",
    tag = "proyectos",
    summary = "Create or update the proyecto's cliente",
    request_body = ClienteInput,
    params(("id" = i32, Path, description = "Proyecto ID")),
    responses(
        (status = 200, description = "Stored cliente", body = ClienteResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Proyecto not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upsert_cliente(
    State(state): State<AppState>,
    Path(id): Path<ProyectoId>,
    _: RequiresPermission<resource::Proyectos, operation::UpdateAll>,
    body: std::result::Result<Json<ClienteInput>, JsonRejection>,
) -> Result<Json<ClienteResponse>> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let cliente = Proyectos::new(&mut conn)
        .upsert_cliente(id, &request)
        .await
        .map_err(or_not_found(PROYECTO, id))?;

    Ok(Json(ClienteResponse::from(cliente)))
}

#[utoipa::path(
    put,
    path = "/proyectos/{id}/tecnologias",
    tag = "proyectos",
    summary = "Create or update the proyecto's technology profile",
    request_body = TecnologiasProfile,
    params(("id" = i32, Path, description = "Proyecto ID")),
    responses(
        (status = 200, description = "Stored profile", body = TecnologiasResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Proyecto not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upsert_tecnologias(
    State(state): State<AppState>,
    Path(id): Path<ProyectoId>,
    _: RequiresPermission<resource::Proyectos, operation::UpdateAll>,
    body: std::result::Result<Json<TecnologiasProfile>, JsonRejection>,
) -> Result<Json<TecnologiasResponse>> {
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    ensure_proyecto(&mut conn, id).await?;
    let tecnologias = Tecnologias::new(&mut conn).upsert_for_proyecto(id, &request).await?;

    Ok(Json(TecnologiasResponse::from(tecnologias)))
}

async fn upsert_detail<R>(state: &AppState, id: ProyectoId, body: std::result::Result<Json<R::Input>, JsonRejection>) -> Result<Json<R>>
where
    R: DetailRow + Serialize,
    R::Input: Validate,
{
    let request = extract_validated_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    ensure_proyecto(&mut conn, id).await?;
    let row = Detalles::new(&mut conn).upsert::<R>(id, &request).await?;

    Ok(Json(row))
}

#[utoipa::path(
    put,
    path = "/proyectos/{id}/infraestructura",
    tag = "proyectos",
    summary = "Create or replace the proyecto's infrastructure details",
    request_body = InfraestructuraInput,
    params(("id" = i32, Path, description = "Proyecto ID")),
    responses(
        (status = 200, description = "Stored row", body = InfraestructuraDBResponse),
        (status = 404, description = "Proyecto not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upsert_infraestructura(
    State(state): State<AppState>,
    Path(id): Path<ProyectoId>,
    _: RequiresPermission<resource::Proyectos, operation::UpdateAll>,
    body: std::result::Result<Json<InfraestructuraInput>, JsonRejection>,
) -> Result<Json<InfraestructuraDBResponse>> {
    upsert_detail(&state, id, body).await
}

#[utoipa::path(
    put,
    path = "/proyectos/{id}/licencias",
    tag = "proyectos",
    summary = "Create or replace the proyecto's licence details",
    request_body = LicenciasInput,
    params(("id" = i32, Path, description = "Proyecto ID")),
    responses(
        (status = 200, description = "Stored row", body = LicenciasDBResponse),
        (status = 404, description = "Proyecto not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upsert_licencias(
    State(state): State<AppState>,
    Path(id): Path<ProyectoId>,
    _: RequiresPermission<resource::Proyectos, operation::UpdateAll>,
    body: std::result::Result<Json<LicenciasInput>, JsonRejection>,
) -> Result<Json<LicenciasDBResponse>> {
    upsert_detail(&state, id, body).await
}

#[utoipa::path(
    put,
    path = "/proyectos/{id}/backend-details",
    tag = "proyectos",
    summary = "Create or replace the proyecto's backend details",
    request_body = BackendDetailsInput,
    params(("id" = i32, Path, description = "Proyecto ID")),
    responses(
        (status = 200, description = "Stored row", body = BackendDetailsDBResponse),
        (status = 404, description = "Proyecto not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upsert_backend_details(
    State(state): State<AppState>,
    Path(id): Path<ProyectoId>,
    _: RequiresPermission<resource::Proyectos, operation::UpdateAll>,
    body: std::result::Result<Json<BackendDetailsInput>, JsonRejection>,
) -> Result<Json<BackendDetailsDBResponse>> {
    upsert_detail(&state, id, body).await
}

#[utoipa::path(
    put,
    path = "/proyectos/{id}/frontend-details",
    tag = "proyectos",
    summary = "Create or replace the proyecto's frontend details",
    request_body = FrontendDetailsInput,
    params(("id" = i32, Path, description = "Proyecto ID")),
    responses(
        (status = 200, description = "Stored row", body = FrontendDetailsDBResponse),
        (status = 404, description = "Proyecto not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn upsert_frontend_details(
    State(state): State<AppState>,
    Path(id): Path<ProyectoId>,
    _: RequiresPermission<resource::Proyectos, operation::UpdateAll>,
    body: std::result::Result<Json<FrontendDetailsInput>, JsonRejection>,
) -> Result<Json<FrontendDetailsDBResponse>> {
    upsert_detail(&state, id, body).await
}

/// Check both ends of a staff link exist.
async fn ensure_staff_link(conn: &mut PgConnection, id: ProyectoId, staff_id: StaffId) -> Result<()> {
    ensure_proyecto(&mut *conn, id).await?;
    if !Staff::new(conn).exists(staff_id).await? {
        return Err(not_found("Staff member", staff_id));
    }
    Ok(())
}

async fn ensure_integracion_link(conn: &mut PgConnection, id: ProyectoId, integracion_id: IntegracionId) -> Result<()> {
    ensure_proyecto(&mut *conn, id).await?;
    if !Integraciones::new(conn).exists(integracion_id).await? {
        return Err(not_found("Integration", integracion_id));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/proyectos/{id}/staff",
    tag = "proyectos",
    summary = "Link a staff member",
    request_body = LinkStaffRequest,
    params(("id" = i32, Path, description = "Proyecto ID")),
    responses(
        (status = 204, description = "Linked"),
        (status = 404, description = "Proyecto or staff member not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn link_staff(
    State(state): State<AppState>,
    Path(id): Path<ProyectoId>,
    _: RequiresPermission<resource::Proyectos, operation::UpdateAll>,
    body: std::result::Result<Json<LinkStaffRequest>, JsonRejection>,
) -> Result<StatusCode> {
    let Json(request) = crate::api::validation::extract_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    ensure_staff_link(&mut conn, id, request.staff_id).await?;
    Proyectos::new(&mut conn).link_staff(id, request.staff_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/proyectos/{id}/staff/{staff_id}",
    tag = "proyectos",
    summary = "Unlink a staff member",
    params(
        ("id" = i32, Path, description = "Proyecto ID"),
        ("staff_id" = i32, Path, description = "Staff ID"),
    ),
    responses(
        (status = 204, description = "Unlinked"),
        (status = 404, description = "Proyecto or staff member not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn unlink_staff(
    State(state): State<AppState>,
    Path((id, staff_id)): Path<(ProyectoId, StaffId)>,
    _: RequiresPermission<resource::Proyectos, operation::UpdateAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    ensure_staff_link(&mut conn, id, staff_id).await?;
    Proyectos::new(&mut conn).unlink_staff(id, staff_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/proyectos/{id}/integraciones",
    tag = "proyectos",
    summary = "Link an integracion",
    request_body = LinkIntegracionRequest,
    params(("id" = i32, Path, description = "Proyecto ID")),
    responses(
        (status = 204, description = "Linked"),
        (status = 404, description = "Proyecto or integracion not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn link_integracion(
    State(state): State<AppState>,
    Path(id): Path<ProyectoId>,
    _: RequiresPermission<resource::Proyectos, operation::UpdateAll>,
    body: std::result::Result<Json<LinkIntegracionRequest>, JsonRejection>,
) -> Result<StatusCode> {
    let Json(request) = crate::api::validation::extract_json(body)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    ensure_integracion_link(&mut conn, id, request.integracion_id).await?;
    Proyectos::new(&mut conn).link_integracion(id, request.integracion_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/proyectos/{id}/integraciones/{integracion_id}",
    tag = "proyectos",
    summary = "Unlink an integracion",
    params(
        ("id" = i32, Path, description = "Proyecto ID"),
        ("integracion_id" = i32, Path, description = "Integracion ID"),
    ),
    responses(
        (status = 204, description = "Unlinked"),
        (status = 404, description = "Proyecto or integracion not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn unlink_integracion(
    State(state): State<AppState>,
    Path((id, integracion_id)): Path<(ProyectoId, IntegracionId)>,
    _: RequiresPermission<resource::Proyectos, operation::UpdateAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    ensure_integracion_link(&mut conn, id, integracion_id).await?;
    Proyectos::new(&mut conn).unlink_integracion(id, integracion_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
