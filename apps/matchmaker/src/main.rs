use actix_web::{web, App, HttpServer};
use matchmaker::config::db::{DbKind, RuntimeEnv};
use matchmaker::config::matchmaking::MatchmakingSettings;
use matchmaker::infra::state::build_state;
use matchmaker::middleware::request_trace::RequestTrace;
use matchmaker::{routes, telemetry};

fn parse_db_kind(raw: &str) -> Option<DbKind> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "postgres" => Some(DbKind::Postgres),
        "sqlite-file" => Some(DbKind::SqliteFile),
        "sqlite-memory" => Some(DbKind::SqliteMemory),
        _ => None,
    }
}

fn parse_env(raw: &str) -> Option<RuntimeEnv> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "prod" => Some(RuntimeEnv::Prod),
        "test" => Some(RuntimeEnv::Test),
        _ => None,
    }
}

fn fail(message: &str) -> ! {
    tracing::error!("{message}");
    eprintln!("❌ {message}");
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment.
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "8081".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| fail("BACKEND_PORT must be a valid port number"));

    let db_kind = parse_db_kind(
        &std::env::var("MATCHMAKER_DB").unwrap_or_else(|_| "postgres".to_string()),
    )
    .unwrap_or_else(|| fail("MATCHMAKER_DB must be one of postgres, sqlite-file, sqlite-memory"));
    let runtime_env = parse_env(
        &std::env::var("MATCHMAKER_ENV").unwrap_or_else(|_| "prod".to_string()),
    )
    .unwrap_or_else(|| fail("MATCHMAKER_ENV must be prod or test"));

    let settings = MatchmakingSettings::from_env()
        .unwrap_or_else(|e| fail(&format!("Invalid matchmaking settings: {e}")));

    let app_state = build_state()
        .with_env(runtime_env)
        .with_db(db_kind)
        .with_settings(settings)
        .build()
        .await
        .unwrap_or_else(|e| fail(&format!("Failed to build application state: {e}")));

    tracing::info!(
        %host,
        port,
        ?db_kind,
        sample_size = settings.sample_size,
        "matchmaker listening"
    );

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
