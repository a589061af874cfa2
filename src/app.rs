use async_trait::async_trait;
use axum::Router as AXRouter;
use loco_rs::{
    app::{AppContext, Hooks},
    boot::{create_app, BootResult, StartMode},
    controller::AppRoutes,
    environment::Environment,
    task::Tasks,
    worker::Processor,
    Result,
};
use migration::Migrator;
use sea_orm::DatabaseConnection;

use crate::{app_state, config::AppSettings, controllers, middleware::cors_middleware, sockets, workers};

pub struct App;

#[async_trait]
impl Hooks for App {
    fn app_name() -> &'static str {
        env!("CARGO_CRATE_NAME")
    }

    fn app_version() -> String {
        format!(
            "{} ({})",
            env!("CARGO_PKG_VERSION"),
            option_env!("BUILD_SHA")
                .or(option_env!("GITHUB_SHA"))
                .unwrap_or("dev")
        )
    }

    async fn boot(mode: StartMode, environment: &Environment) -> Result<BootResult> {
        let boot_result = create_app::<Self, Migrator>(mode, environment).await?;

        let settings = AppSettings::from_config(&boot_result.app_context.config)?;
        app_state::init(settings);

        Ok(boot_result)
    }

    async fn truncate(db: &DatabaseConnection) -> Result<()> {
        use crate::seeders::DatabaseSeeder;

        DatabaseSeeder::clear_all(db).await?;
        Ok(())
    }

    async fn seed(db: &DatabaseConnection, _base: &std::path::Path) -> Result<()> {
        use crate::seeders::DatabaseSeeder;

        if std::env::var("LOCO_ENV").unwrap_or_else(|_| "development".to_string()) == "development" {
            if !DatabaseSeeder::is_seeded(db).await? {
                tracing::info!("Seeding development database...");
                DatabaseSeeder::seed_development(db).await?;
                tracing::info!("Database seeding completed");
            } else {
                tracing::info!("Database already seeded, skipping");
            }
        }

        Ok(())
    }

    fn routes(_ctx: &AppContext) -> AppRoutes {
        AppRoutes::with_default_routes()
            .prefix("/api")
            .add_route(controllers::auth::routes())
            .add_route(controllers::data::routes())
            .add_route(controllers::vitals::routes())
            .add_route(controllers::alerts::routes())
            .add_route(controllers::location::routes())
            .add_route(controllers::attendance::routes())
            .add_route(controllers::compliance::routes())
            .add_route(controllers::system::routes())
    }

    /// Merges the raw `/ws` upgrade route onto loco's router (loco's
    /// `Routes` DSL has no websocket-upgrade primitive) and layers the
    /// single-origin CORS middleware over the whole surface, since both
    /// apply process-wide rather than per-route.
    async fn after_routes(router: AXRouter<AppContext>, _ctx: &AppContext) -> Result<AXRouter<AppContext>> {
        Ok(router.merge(sockets::router()).layer(axum::middleware::from_fn(cors_middleware)))
    }

    fn connect_workers<'a>(p: &'a mut Processor, ctx: &'a AppContext) {
        p.register(workers::attendance_sweep::AttendanceSweepWorker::build(ctx));
        p.register(workers::connection_reaper::ConnectionReaperWorker::build(ctx));
    }

    fn register_tasks(_tasks: &mut Tasks) {
        // Database management commands are handled through CLI
        // Use: cargo loco task database --help
    }
}
