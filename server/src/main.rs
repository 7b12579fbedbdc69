use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use vsf_server::config::Config;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vsf_server=debug,tower_http=info")),
        )
        .init();

    let result = match Config::from_env() {
        Ok(config) => vsf_server::run(config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!(error = ?e, "Server failed");
        std::process::exit(1);
    }
}
