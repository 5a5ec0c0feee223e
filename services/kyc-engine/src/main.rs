use actix_cors::Cors;
use actix_web::{middleware, App, HttpServer};
use anyhow::{anyhow, Context};
use dotenv::dotenv;
use kyc_engine::{
    config::{Config, StorageBackend},
    database, handlers,
    repository::PostgresProvider,
    security_middleware::{JwtAuth, RateLimiter},
    services::{KycServices, Storage},
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false);

    // LOG_FORMAT=json for log shippers, human-readable otherwise
    if std::env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    info!("Starting KYC Engine...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    let services = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = database::create_pool(&config.database)
                .await
                .context("Failed to connect to database")?;
            info!("Database connected successfully");

            if config.database.run_migrations {
                database::run_migrations(&pool)
                    .await
                    .context("Failed to run migrations")?;
            }

            KycServices::build(
                &PostgresProvider::new(pool.clone()),
                &config.compliance,
                Storage::Postgres(pool),
            )?
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; records are lost on restart");
            KycServices::in_memory(&config.compliance)?
        }
    };

    if !config.auth.enabled {
        warn!("JWT authentication is disabled");
    }

    let auth_enabled = config.auth.enabled;
    let jwt_secret = config.auth.jwt_secret.clone();
    let rate_limit_enabled = config.rate_limit.enabled;
    let rate_limiter = RateLimiter::new(config.rate_limit.requests_per_minute);

    info!(
        "KYC Engine listening on {}:{} ({} storage)",
        config.server.host,
        config.server.port,
        services.storage.name()
    );

    HttpServer::new(move || {
        let services = services.clone();

        App::new()
            .wrap(middleware::Condition::new(
                auth_enabled,
                JwtAuth::new(jwt_secret.clone()),
            ))
            .wrap(middleware::Condition::new(
                rate_limit_enabled,
                rate_limiter.clone(),
            ))
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .wrap(middleware::NormalizePath::trim())
            .configure(move |cfg| handlers::configure_app(cfg, &services))
    })
    .workers(config.server.workers)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
