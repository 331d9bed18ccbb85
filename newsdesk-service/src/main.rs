use newsdesk_service::{Config, create_app};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing; `LOG_FORMAT=pretty` switches from JSON to human-readable output
fn init_tracing(log_format: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "newsdesk_service=debug,newsdesk=debug,tower_http=debug".into());

    match log_format {
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_format);

    if config.naver_credentials().is_none() {
        warn!("NAVER_CLIENT_ID / NAVER_CLIENT_SECRET not set; searches will fail");
    }
    if config.openrouter_api_key.is_none() {
        warn!("OPENROUTER_API_KEY not set; AI processing will fail");
    }

    let port = config.port;
    let app = create_app(config);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    let addr = listener.local_addr()?;

    info!("Newsdesk dashboard starting on http://{}", addr);
    info!("Health check endpoint: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
