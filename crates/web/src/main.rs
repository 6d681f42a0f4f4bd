use tracing::info;

use vyconsole_web::WebConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = WebConfig::from_env()?;

    info!(
        "Starting vyconsole web on http://{} (backend: {}, session: {:?})",
        config.listen,
        config.backend_origin(),
        config.session.provider
    );

    vyconsole_web::server::serve(config).await
}
