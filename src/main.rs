use anyhow::{Context, Result};
use checkin_scorer::checkin::CheckInService;
use checkin_scorer::db::{establish_pool, run_migrations};
use checkin_scorer::scoring::{Analyzer, EmotionCapability, MLHandle, NeutralSentiment};
use checkin_scorer::server::build_router;
use checkin_scorer::settings::{settings, watch_settings};
use checkin_scorer::transcribe::HttpTranscriber;
use checkin_scorer::utils::{
    log_db_ready, log_db_status, log_ml_disabled, log_ml_step, log_server_starting,
    log_startup_config,
};
use std::sync::Arc;
use tracing::subscriber::set_global_default;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("checkin_scorer=info".parse()?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    let s = settings();
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(s.server.port);
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| s.server.database_url.clone());

    let transcriber = HttpTranscriber::from_settings()?;
    log_startup_config(
        port,
        &database_url,
        s.ml.enabled,
        transcriber.as_ref().map(|t| t.endpoint()),
    );

    let _watcher = match watch_settings() {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            warn!("settings hot-reload disabled: {e}");
            None
        }
    };

    log_db_status("Initializing SQLite connection pool...");
    let pool = establish_pool(&database_url, s.server.pool_size)?;
    let applied = {
        let mut conn = pool.get().context("Failed to get initial connection")?;
        run_migrations(&mut conn)?
    };
    log_db_ready(applied);

    let analyzer = if s.ml.enabled {
        log_ml_step("Spawning model worker thread...");
        log_ml_step("Models will load in background (this may take a while on first run)");
        let ml_handle = MLHandle::spawn()?;
        Analyzer::new(
            EmotionCapability::Available(Arc::new(ml_handle.clone())),
            Arc::new(ml_handle),
        )
    } else {
        log_ml_disabled();
        Analyzer::new(EmotionCapability::Unavailable, Arc::new(NeutralSentiment))
    };

    let service = CheckInService::new(pool, analyzer, transcriber);
    let app = build_router(service);

    log_server_starting(port);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
