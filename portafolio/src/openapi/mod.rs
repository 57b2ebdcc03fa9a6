//! OpenAPI document for the `/api` surface, served with Scalar at `/api/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::handlers;

/// Registers the `BearerAuth` scheme referenced by every protected path.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.security_schemes.insert(
            "BearerAuth".to_string(),
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token returned by `POST /api/auth/login` or `POST /api/auth/register`:\n\n\
                        ```\nAuthorization: Bearer <token>\n```",
                    ))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    servers((url = "/api")),
    paths(
        handlers::health::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::proyectos::list_enums,
        handlers::proyectos::list_proyectos,
        handlers::proyectos::create_proyecto,
        handlers::proyectos::get_proyecto,
        handlers::proyectos::update_proyecto,
        handlers::proyectos::delete_proyecto,
        handlers::proyectos::upsert_cliente,
        handlers::proyectos::upsert_tecnologias,
        handlers::proyectos::upsert_infraestructura,
        handlers::proyectos::upsert_licencias,
        handlers::proyectos::upsert_backend_details,
        handlers::proyectos::upsert_frontend_details,
        handlers::proyectos::link_staff,
        handlers::proyectos::unlink_staff,
        handlers::proyectos::link_integracion,
        handlers::proyectos::unlink_integracion,
        handlers::staff::list_staff,
        handlers::staff::create_staff,
        handlers::staff::get_staff,
        handlers::staff::update_staff,
        handlers::staff::delete_staff,
        handlers::integraciones::list_integraciones,
        handlers::integraciones::create_integracion,
        handlers::integraciones::get_integracion,
        handlers::integraciones::update_integracion,
        handlers::integraciones::delete_integracion,
        handlers::clientes::list_clientes,
        handlers::clientes::create_cliente,
        handlers::clientes::get_cliente,
        handlers::clientes::update_cliente,
        handlers::clientes::delete_cliente,
        handlers::tecnologias::list_tecnologias,
        handlers::tecnologias::create_tecnologias,
        handlers::tecnologias::get_tecnologias,
        handlers::tecnologias::update_tecnologias,
        handlers::tecnologias::delete_tecnologias,
        handlers::dashboard::data_types,
        handlers::dashboard::counts,
        handlers::dashboard::projects_by_category,
        handlers::dashboard::projects_by_status,
        handlers::dashboard::staff_by_role,
        handlers::dashboard_config::list_charts,
        handlers::dashboard_config::create_chart,
        handlers::dashboard_config::update_chart,
        handlers::dashboard_config::delete_chart,
        handlers::admin::proyectos_template,
        handlers::admin::import_proyectos,
        handlers::admin::staff_template,
        handlers::admin::import_staff,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Account management"),
        (name = "proyectos", description = "Projects and their relations"),
        (name = "staff", description = "Staff members"),
        (name = "integraciones", description = "External integrations"),
        (name = "clientes", description = "Clients"),
        (name = "tecnologias", description = "Technology profiles"),
        (name = "dashboard", description = "Aggregate statistics"),
        (name = "dashboard-config", description = "Dashboard chart configuration"),
        (name = "admin", description = "CSV templates and imports"),
    ),
    info(
        title = "Portafolio API",
        description = "Administrative backend for projects, staff, clients and integrations.",
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_surface() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/proyectos/{id}/backend-details"));
        assert!(paths.contains_key("/admin/staff/import"));
        assert!(paths.contains_key("/dashboard-config/{id}"));
        assert!(paths.contains_key("/health"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerAuth"));
    }
}
