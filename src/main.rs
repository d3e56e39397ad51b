use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use mbti_match::config::{LoggingSettings, Settings, StoreKind};
use mbti_match::routes::{self, AppState};
use mbti_match::{CandidateSelector, JwtAuth, MatchLedger, MatchStore, MemoryStore, PostgresStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }
}

async fn serve<S>(settings: Settings, store: S) -> std::io::Result<()>
where
    S: MatchStore + Send + Sync + 'static,
{
    let auth = web::Data::new(JwtAuth::new(
        &settings.auth.jwt_secret,
        settings.auth.leeway_secs,
        settings.auth.token_ttl_secs,
    ));

    let selector = CandidateSelector::new(
        settings.matching.shortlist_size,
        settings.matching.candidate_pool_size,
    );
    let ledger = MatchLedger::new(
        settings.matching.accept_policy(),
        settings.matching.reject_policy(),
    );

    info!(
        "Matching core initialized (shortlist: {}, pool: {}, accept policy: {:?}, reject policy: {:?})",
        settings.matching.shortlist_size,
        settings.matching.candidate_pool_size,
        settings.matching.accept_policy(),
        settings.matching.reject_policy()
    );

    let app_state = web::Data::new(AppState {
        store: Arc::new(store),
        selector,
        ledger,
    });

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(app_state.clone())
            .app_data(auth.clone())
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes::<S>)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(&LoggingSettings::default());
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    init_tracing(&settings.logging);

    info!("Starting MBTI matching service...");

    if settings.auth.jwt_secret == "change-me" {
        warn!("Using the placeholder JWT secret; set JWT_SECRET in production");
    }

    match settings.matching.store {
        StoreKind::Postgres => {
            let db = &settings.database;
            let store = PostgresStore::from_settings(
                &db.url,
                db.max_connections,
                db.min_connections,
                db.acquire_timeout_secs,
                db.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e)
            })?;

            info!(
                "PostgreSQL store initialized (max: {} connections)",
                db.max_connections.unwrap_or(10)
            );

            serve(settings, store).await
        }
        StoreKind::Memory => {
            warn!("Running with the in-memory store; state is lost on restart");
            serve(settings, MemoryStore::new()).await
        }
    }
}
