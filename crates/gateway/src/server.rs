use std::{net::SocketAddr, sync::Arc, time::Duration};

use {
    anyhow::Context,
    axum::{
        Json, Router,
        extract::State,
        response::IntoResponse,
        routing::{get, post},
    },
    dailybot_config::BotConfig,
    dailybot_cron::service::CronService,
    dailybot_line::LineClient,
    tower_http::trace::TraceLayer,
    tracing::{info, warn},
};

use crate::{
    jobs::{Feeds, JobContext, register_jobs},
    state::GatewayState,
    webhook_routes::callback_handler,
};

/// Upper bound on any single outbound API call.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}

/// Build the router with every route. Split out from [`start_gateway`] so
/// tests can serve it on an ephemeral port.
pub fn build_app(state: Arc<GatewayState>) -> Router {
    let app_state = AppState { gateway: state };

    Router::new()
        .route("/callback", post(callback_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Construct the outbound clients and the job context from configuration.
pub fn job_context(config: &BotConfig) -> anyhow::Result<Arc<JobContext>> {
    let http = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    let line = LineClient::new(http.clone(), config.channel_access_token.clone())
        .with_base_url(config.endpoints.line_api.clone());
    let feeds = Feeds::from_config(http, config);

    Ok(Arc::new(JobContext::new(
        Arc::new(line),
        feeds,
        config.user_id.clone(),
        config.timezone,
    )))
}

/// Start the scheduler and serve HTTP until Ctrl-C or SIGTERM.
pub async fn start_gateway(config: BotConfig) -> anyhow::Result<()> {
    let ctx = job_context(&config)?;

    let cron = CronService::new();
    let job_count = register_jobs(&cron, Arc::clone(&ctx)).await?;
    cron.start().await;

    let state = GatewayState::new(
        config.channel_secret.clone(),
        ctx.outbound(),
        Arc::clone(&cron),
    );
    let app = build_app(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        addr = %listener.local_addr()?,
        jobs = job_count,
        timezone = %config.timezone,
        "dailybot listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    cron.stop().await;
    info!("dailybot stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let cron = state.gateway.cron.status().await;
    Json(serde_json::json!({
        "status": "ok",
        "version": state.gateway.version,
        "jobs": cron.job_count,
        "schedulerRunning": cron.running,
    }))
}
