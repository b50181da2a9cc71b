use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use tasknotify::cli::{self, Commands, NotificationCommands};
use tasknotify::config::{self, Config};
use tasknotify::engine::ledger;
use tasknotify::notification::EmailRelay;
use tasknotify::store::postgres::PgStore;
use tasknotify::{api, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "tasknotify=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(Commands::Migrate) => {
            let db = PgStore::connect(&cfg.database_url).await?;
            db.migrate().await?;
            tracing::info!("Migrations applied");
            Ok(())
        }
        Some(Commands::Notifications { command }) => {
            let db = PgStore::connect(&cfg.database_url).await?;
            handle_notification_command(&db, command).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    let relay = EmailRelay::from_config(&cfg);
    if relay.is_enabled() {
        relay
            .cooldown()
            .spawn_sweeper(relay.cooldown().window().max(Duration::from_secs(1)));
    } else {
        tracing::info!("TASKNOTIFY_EMAIL_WEBHOOK_URL not set, email alerts disabled");
    }

    let state = Arc::new(AppState {
        db,
        relay,
        config: cfg,
    });

    let app = axum::Router::new()
        .route("/healthz", axum::routing::get(api::handlers::health))
        .nest("/api/v1", api::api_router())
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("tasknotify listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Middleware: injects a unique X-Request-Id into every response.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

/// Middleware: notification listings are per-user and must not be cached.
async fn security_headers_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));
    resp
}

async fn handle_notification_command(
    db: &PgStore,
    cmd: NotificationCommands,
) -> anyhow::Result<()> {
    let mut conn = db.pool().acquire().await?;
    match cmd {
        NotificationCommands::List { user_id } => {
            let user_id = Uuid::parse_str(&user_id).context("invalid user id")?;
            let notifs = ledger::list_for_user(&mut *conn, user_id).await?;
            if notifs.is_empty() {
                println!("No notifications.");
            }
            for n in notifs {
                let marker = if n.notification.is_read { " " } else { "*" };
                println!(
                    "{} {} {:<18} {}",
                    marker,
                    n.notification.created_at.format("%Y-%m-%d %H:%M"),
                    n.notification.kind.as_str(),
                    n.message
                );
            }
        }
        NotificationCommands::Unread { user_id } => {
            let user_id = Uuid::parse_str(&user_id).context("invalid user id")?;
            let count = ledger::unread_count(&mut *conn, user_id).await?;
            println!("{}", count);
        }
    }
    Ok(())
}
