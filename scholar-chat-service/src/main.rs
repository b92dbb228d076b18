use prompt_flow::OpenRouterModel;
use scholar_chat_service::{LogFormat, ServiceConfig, create_app};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(log_format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "scholar_chat_service=debug,prompt_flow=debug,tower_http=debug".into()
    });

    match log_format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        LogFormat::Json => {
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
    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);

    let api_key = match config.api_key() {
        Ok(key) => key,
        Err(e) => {
            error!(error = %e, "Missing model credentials");
            std::process::exit(1);
        }
    };

    let model = Arc::new(OpenRouterModel::new(api_key, config.model.clone()));
    info!(
        model = %model.model(),
        keywords = config.capabilities.keywords,
        eli5 = config.capabilities.eli5,
        "Model client ready"
    );

    let app = create_app(model, config.capabilities);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    let addr = listener.local_addr()?;

    info!("Scholar Chat Service starting on {}", addr);
    info!("API Documentation available at http://{}/", addr);
    info!("Health check endpoint: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
