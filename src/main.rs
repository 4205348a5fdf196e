use std::sync::Arc;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use survey_unlock::config::Config;
use survey_unlock::db::{AppState, create_pool, init_db, queries};
use survey_unlock::handlers;
use survey_unlock::models::{CreateSurvey, SurveyDuration};
use survey_unlock::payments::{StripeClient, StripeWebhookVerifier, UnlockPrice};

#[derive(Parser, Debug)]
#[command(name = "survey-unlock")]
#[command(about = "Anonymous surveys with a one-time paid unlock of the responses")]
struct Cli {
    /// Seed the database with a dev user, session and survey
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only)
    #[arg(long)]
    ephemeral: bool,
}

/// Seeds the database with dev data. Only runs in dev mode and when the
/// database has no users.
fn seed_dev_data(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let conn = state.db.get()?;

    if queries::count_users(&conn)? > 0 {
        tracing::info!("Database already has data, skipping seed");
        return Ok(());
    }

    let user = queries::create_user(&conn, "dev@survey-unlock.local")?;
    let token = queries::create_session(&conn, &user.id)?;

    let input = CreateSurvey {
        title: Some("Team lunch feedback".into()),
        duration_hours: Some(SurveyDuration::TwoDays.hours()),
        questions: vec![
            "What did you think of the food?".into(),
            "What should we change next time?".into(),
        ],
        unlock_deadline: None,
    }
    .validate()?;
    let survey = queries::create_survey(&conn, &user.id, &input)?;

    tracing::info!("============================================");
    tracing::info!("DEV DATA SEEDED");
    tracing::info!("User: {} ({})", user.email, user.id);
    tracing::info!("Survey: {} ({})", survey.title, survey.id);
    tracing::info!("============================================");

    println!();
    println!("--- COPY FROM HERE ---");
    println!("  session_token: {}", token);
    println!("  survey_id: {}", survey.id);
    println!("--- END COPY ---");
    println!();

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "survey_unlock=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        checkout: Arc::new(StripeClient::new(&config.stripe_secret_key)),
        webhook_verifier: Arc::new(StripeWebhookVerifier::new(&config.stripe_webhook_secret)),
        site_url: config.site_url.clone(),
        unlock_price: UnlockPrice {
            amount_cents: config.unlock_price_cents,
            currency: config.unlock_currency.clone(),
            ..UnlockPrice::default()
        },
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set APP_ENV=dev)");
        } else if let Err(e) = seed_dev_data(&state) {
            tracing::error!("Failed to seed dev data: {}", e);
        }
    }

    let app = handlers::app_router(config.rate_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!(
        "Survey unlock server listening on {} (unlock price {} {})",
        addr,
        config.unlock_price_cents,
        config.unlock_currency
    );

    // Connect info is needed for per-IP rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    if cleanup_on_exit {
        let db_path = &config.database_path;
        if let Err(e) = std::fs::remove_file(db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
