//! # portafolio: administrative backend for a project portfolio
//!
//! `portafolio` is a REST service for tracking an organization's projects
//! together with the staff assigned to them, their clients, the external
//! integrations they use and a technology profile per project. It also serves
//! dashboard statistics, a persisted chart configuration and CSV bulk import.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum); all state lives
//! in PostgreSQL behind SQLx.
//!
//! ### Request Flow
//!
//! Every route is mounted under `/api`. A request passes the CORS and trace
//! layers and reaches its handler, whose
//! [`RequiresPermission`](auth::permissions::RequiresPermission) extractor
//! verifies the bearer token and checks the caller's role for the resource and
//! operation. The handler validates the JSON body, runs repository calls on a
//! pooled connection and shapes the response. Failures surface as
//! [`errors::Error`], which renders the JSON error body with the right status.
//!
//! ### Core Components
//!
//! - The **API layer** ([`api`]) holds handlers, request/response models and
//!   body validation.
//! - The **authentication layer** ([`auth`]) covers Argon2 password hashing,
//!   JWT session tokens and role checks.
//! - The **database layer** ([`db`]) uses the repository pattern; each table
//!   family has a repository borrowing a connection.
//! - [`csv_import`] builds the CSV templates and maps uploaded rows.
//! - [`telemetry`] and [`error_log`] set up tracing and persist ERROR events
//!   into the `logs` table.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use portafolio::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = portafolio::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     let error_log = portafolio::telemetry::init_telemetry(&config)?;
//!
//!     let app = Application::new(config, error_log).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod auth;
pub mod config;
pub mod csv_import;
pub mod db;
pub mod error_log;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::models::{dashboard::default_charts, users::Role},
    auth::password::{self, Argon2Params},
    config::{CorsOrigin, DatabaseConfig},
    db::handlers::{Charts, Repository, Users},
    db::models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    error_log::ErrorLogReceiver,
    openapi::ApiDoc,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{self, HeaderName, HeaderValue, Method},
    routing::{get, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{ChartId, ClienteId, IntegracionId, ProyectoId, StaffId, TecnologiasId, UserId};

/// Headroom over `import.max_file_size` for multipart boundaries and headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder().db(pool).config(config).build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the portafolio database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Ensure the configured initial account exists as SUPERADMIN.
///
/// An existing account with this email gets the password reset and the role
/// raised to SUPERADMIN; otherwise the account is created.
#[instrument(skip_all, fields(email = %email))]
pub async fn create_initial_admin_user(email: &str, password: &str, config: &Config, db: &PgPool) -> anyhow::Result<UserId> {
    let password_hash = password::hash_password(password.to_string(), Argon2Params::from(&config.auth.password)).await?;

    let mut tx = db.begin().await?;
    let mut users = Users::new(&mut tx);

    let user = match users.get_user_by_email(email).await? {
        Some(existing) => {
            users
                .update(
                    existing.id,
                    &UserUpdateDBRequest {
                        password_hash: Some(password_hash),
                        role: Some(Role::Superadmin),
                        ..Default::default()
                    },
                )
                .await?
        }
        None => {
            users
                .create(&UserCreateDBRequest {
                    nombre: email.split('@').next().unwrap_or(email).to_string(),
                    email: email.to_string(),
                    password_hash,
                    role: Role::Superadmin,
                })
                .await?
        }
    };

    tx.commit().await?;
    info!(user_id = user.id, "Initial admin user ensured");
    Ok(user.id)
}

/// Insert the default dashboard charts for data types that have none yet.
#[instrument(skip_all)]
pub async fn seed_dashboard_charts(db: &PgPool) -> anyhow::Result<usize> {
    let mut conn = db.acquire().await?;
    let inserted = Charts::new(&mut conn).seed(&default_charts()).await?;
    if inserted > 0 {
        info!(inserted, "Seeded default dashboard charts");
    } else {
        debug!("Dashboard charts already configured, skipping seed");
    }
    Ok(inserted)
}

fn seconds_or_none(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

async fn connect_pool(database: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let settings = &database.pool;
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(seconds_or_none(settings.idle_timeout_secs))
        .max_lifetime(seconds_or_none(settings.max_lifetime_secs))
        .connect(&database.url)
        .await?;
    Ok(pool)
}

/// Run migrations and the startup data steps on a connected pool.
async fn setup_database(config: &Config, pool: &PgPool) -> anyhow::Result<()> {
    migrator().run(pool).await?;

    if let (Some(email), Some(password)) = (config.admin_email.as_deref(), config.admin_password.as_deref()) {
        create_initial_admin_user(email, password, config, pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;
    }

    if config.seed_dashboard_charts {
        seed_dashboard_charts(pool).await?;
    }

    Ok(())
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    // tower-http rejects `*` inside an origin list, so a wildcard entry allows any origin
    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        if cors_config.allow_credentials {
            anyhow::bail!("CORS wildcard origin cannot be combined with allow_credentials");
        }
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut exposed = vec![http::header::LOCATION];
    for name in &cors_config.exposed_headers {
        exposed.push(HeaderName::from_bytes(name.as_bytes())?);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials)
        .expose_headers(exposed);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router: every `/api` route, the docs, `/healthz`,
/// CORS and request tracing.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    use api::handlers::{
        admin, auth, clientes, dashboard, dashboard_config, health, integraciones, proyectos, staff, tecnologias, users,
    };

    let upload_limit = DefaultBodyLimit::max(state.config.import.max_file_size + MULTIPART_OVERHEAD);

    let api_routes = Router::new()
        .route("/health", get(health::health))
        // Authentication (no token required)
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Accounts
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        // Proyectos and their relations
        .route("/proyectos/enums", get(proyectos::list_enums))
        .route("/proyectos", get(proyectos::list_proyectos).post(proyectos::create_proyecto))
        .route(
            "/proyectos/{id}",
            get(proyectos::get_proyecto)
                .put(proyectos::update_proyecto)
                .delete(proyectos::delete_proyecto),
        )
        .route("/proyectos/{id}/cliente", put(proyectos::upsert_cliente))
        .route("/proyectos/{id}/tecnologias", put(proyectos::upsert_tecnologias))
        .route("/proyectos/{id}/infraestructura", put(proyectos::upsert_infraestructura))
        .route("/proyectos/{id}/licencias", put(proyectos::upsert_licencias))
        .route("/proyectos/{id}/backend-details", put(proyectos::upsert_backend_details))
        .route("/proyectos/{id}/frontend-details", put(proyectos::upsert_frontend_details))
        .route("/proyectos/{id}/staff", post(proyectos::link_staff))
        .route("/proyectos/{id}/staff/{staff_id}", axum::routing::delete(proyectos::unlink_staff))
        .route("/proyectos/{id}/integraciones", post(proyectos::link_integracion))
        .route(
            "/proyectos/{id}/integraciones/{integracion_id}",
            axum::routing::delete(proyectos::unlink_integracion),
        )
        // Staff
        .route("/staff", get(staff::list_staff).post(staff::create_staff))
        .route(
            "/staff/{id}",
            get(staff::get_staff).put(staff::update_staff).delete(staff::delete_staff),
        )
        // Integraciones
        .route(
            "/integraciones",
            get(integraciones::list_integraciones).post(integraciones::create_integracion),
        )
        .route(
            "/integraciones/{id}",
            get(integraciones::get_integracion)
                .put(integraciones::update_integracion)
                .delete(integraciones::delete_integracion),
        )
        // Clientes
        .route("/clientes", get(clientes::list_clientes).post(clientes::create_cliente))
        .route(
            "/clientes/{id}",
            get(clientes::get_cliente)
                .put(clientes::update_cliente)
                .delete(clientes::delete_cliente),
        )
        // Tecnologias
        .route(
            "/tecnologias",
            get(tecnologias::list_tecnologias).post(tecnologias::create_tecnologias),
        )
        .route(
            "/tecnologias/{id}",
            get(tecnologias::get_tecnologias)
                .put(tecnologias::update_tecnologias)
                .delete(tecnologias::delete_tecnologias),
        )
        // Dashboard
        .route("/dashboard/data-types", get(dashboard::data_types))
        .route("/dashboard/counts", get(dashboard::counts))
        .route("/dashboard/projects-by-category", get(dashboard::projects_by_category))
        .route("/dashboard/projects-by-status", get(dashboard::projects_by_status))
        .route("/dashboard/staff-by-role", get(dashboard::staff_by_role))
        .route(
            "/dashboard-config",
            get(dashboard_config::list_charts).post(dashboard_config::create_chart),
        )
        .route(
            "/dashboard-config/{id}",
            put(dashboard_config::update_chart).delete(dashboard_config::delete_chart),
        )
        // CSV templates and imports
        .route("/admin/proyectos/template", get(admin::proyectos_template))
        .route(
            "/admin/proyectos/import",
            post(admin::import_proyectos).layer(upload_limit.clone()),
        )
        .route("/admin/staff/template", get(admin::staff_template))
        .route("/admin/staff/import", post(admin::import_staff).layer(upload_limit))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/api/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Background tasks running alongside the HTTP server.
///
/// Dropping the struct cancels the shutdown token through `drop_guard`;
/// [`shutdown`](BackgroundServices::shutdown) also waits for the tasks.
pub struct BackgroundServices {
    background_tasks: Vec<tokio::task::JoinHandle<()>>,
    shutdown_token: tokio_util::sync::CancellationToken,
    // Pub so that we can disarm it if we want to
    pub drop_guard: Option<tokio_util::sync::DropGuard>,
}

impl BackgroundServices {
    fn start(pool: &PgPool, config: &Config, error_log: Option<ErrorLogReceiver>) -> Self {
        let shutdown_token = tokio_util::sync::CancellationToken::new();
        let mut background_tasks = Vec::new();

        if let Some(receiver) = error_log {
            info!("Starting error log writer");
            background_tasks.push(error_log::spawn_writer(
                pool.clone(),
                receiver,
                &config.error_log,
                shutdown_token.clone(),
            ));
        }

        Self {
            background_tasks,
            drop_guard: Some(shutdown_token.clone().drop_guard()),
            shutdown_token,
        }
    }

    /// Gracefully shutdown all background tasks
    pub async fn shutdown(self) {
        self.shutdown_token.cancel();

        for handle in self.background_tasks {
            if let Err(e) = handle.await {
                tracing::warn!("Background task ended abnormally: {e}");
            }
        }
    }
}

/// The assembled service.
///
/// 1. **Create**: [`Application::new`] connects, migrates, runs the startup
///    data steps and starts background services
/// 2. **Serve**: [`Application::serve`] binds the listener and handles requests
/// 3. **Shutdown**: when the shutdown future resolves, the server drains, the
///    error log flushes and the pool closes
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
    bg_services: BackgroundServices,
}

impl Application {
    /// Connect to the configured database and build the application.
    pub async fn new(config: Config, error_log: Option<ErrorLogReceiver>) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None, error_log).await
    }

    /// Build the application on an existing pool, or connect when `pool` is `None`.
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>, error_log: Option<ErrorLogReceiver>) -> anyhow::Result<Self> {
        debug!("Starting portafolio with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => pool,
            None => connect_pool(&config.database).await?,
        };
        setup_database(&config, &pool).await?;

        let bg_services = BackgroundServices::start(&pool, &config, error_log);

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(app_state)?;

        Ok(Self {
            router,
            config,
            pool,
            bg_services,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> (axum_test::TestServer, BackgroundServices) {
        let server = axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server");
        (server, self.bg_services)
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Portafolio listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Stopping background services...");
        self.bg_services.shutdown().await;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{create_cors_layer, create_initial_admin_user, seed_dashboard_charts};
    use crate::{
        api::models::users::Role,
        config::{CorsOrigin, ErrorLogConfig},
        db::handlers::Users,
        test_utils::*,
    };
    use axum::http::StatusCode;
    use serde_json::Value;
    use sqlx::PgPool;
    use std::time::Duration;

    #[sqlx::test]
    #[test_log::test]
    async fn test_initial_admin_is_created_and_promoted(pool: PgPool) {
        let config = create_test_config();

        let id = create_initial_admin_user("root@example.com", "first-password", &config, &pool)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let user = Users::new(&mut conn).get_user_by_email("root@example.com").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Superadmin);
        assert_eq!(user.nombre, "root");

        // Running again keeps the same row and resets the password
        let again = create_initial_admin_user("root@example.com", "second-password", &config, &pool)
            .await
            .unwrap();
        assert_eq!(again, id);

        let (server, _bg) = create_test_app(pool.clone()).await;
        server
            .post("/api/auth/login")
            .json(&serde_json::json!({"email": "root@example.com", "password": "first-password"}))
            .await
            .assert_status_unauthorized();
        login_token(&server, "root@example.com", "second-password").await;
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_existing_user_is_promoted(pool: PgPool) {
        let existing = create_test_user(&pool, "lead@example.com", Role::User).await;

        let id = create_initial_admin_user("lead@example.com", TEST_PASSWORD, &create_test_config(), &pool)
            .await
            .unwrap();
        assert_eq!(id, existing.id);

        let mut conn = pool.acquire().await.unwrap();
        let user = Users::new(&mut conn).get_user_by_email("lead@example.com").await.unwrap().unwrap();
        assert_eq!(user.role, Role::Superadmin);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_chart_seed_is_idempotent(pool: PgPool) {
        assert_eq!(seed_dashboard_charts(&pool).await.unwrap(), 3);
        assert_eq!(seed_dashboard_charts(&pool).await.unwrap(), 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_startup_with_admin_config(pool: PgPool) {
        let mut config = create_test_config();
        config.admin_email = Some("owner@example.com".to_string());
        config.admin_password = Some("owner-password".to_string());

        let (server, _bg) = create_test_app_with_config(pool, config).await;
        let token = login_token(&server, "owner@example.com", "owner-password").await;

        let response = server.get("/api/users").authorization_bearer(&token).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["totalCount"], 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_error_log_writer_runs_with_app(pool: PgPool) {
        let mut config = create_test_config();
        config.error_log = ErrorLogConfig {
            enabled: true,
            buffer_size: 8,
            batch_size: 1,
            flush_interval: Duration::from_millis(50),
        };
        let (_layer, receiver) = crate::error_log::channel(config.error_log.buffer_size);

        let app = crate::Application::new_with_pool(config, Some(pool), Some(receiver)).await.unwrap();
        let (server, bg) = app.into_test_server();
        server.get("/healthz").await.assert_status_ok();

        // Shutdown returns once the writer has drained
        bg.shutdown().await;
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_docs_and_unknown_routes(pool: PgPool) {
        let (server, _bg) = create_test_app(pool).await;

        server.get("/api/docs").await.assert_status_ok();
        server.get("/api/nothing-here").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cors_layer_accepts_configured_origins() {
        let mut config = create_test_config();
        config.auth.security.cors.allowed_origins = vec![CorsOrigin::Url("http://localhost:5173".parse().unwrap())];
        config.auth.security.cors.allow_credentials = true;
        assert!(create_cors_layer(&config).is_ok());

        config.auth.security.cors.exposed_headers = vec!["not a header".to_string()];
        assert!(create_cors_layer(&config).is_err());
    }

    #[test]
    fn test_cors_layer_wildcard_origin() {
        let mut config = create_test_config();
        assert!(matches!(
            config.auth.security.cors.allowed_origins.as_slice(),
            [CorsOrigin::Wildcard]
        ));
        assert!(create_cors_layer(&config).is_ok());

        config.auth.security.cors.allow_credentials = true;
        assert!(create_cors_layer(&config).is_err());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_default_cors_allows_any_origin(pool: PgPool) {
        let (server, _bg) = create_test_app(pool).await;

        let response = server
            .get("/api/health")
            .add_header("origin", "https://somewhere.example")
            .await;
        response.assert_status_ok();
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }
}
