use eyre::{Result, WrapErr};
use tracing::info;

use estimate_core::{Estimator, PriceBook};
use estimate_server::telemetry::{init_tracing, install_color_eyre};
use estimate_server::{router, serve, AppState, Config, FromEnv};

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env().wrap_err("Failed to load server configuration")?;
    init_tracing(&config.environment);

    let prices = match &config.price_book {
        Some(path) => {
            info!(path = %path.display(), "Loading price book");
            PriceBook::from_toml_file(path)
                .wrap_err_with(|| format!("Failed to load price book from {}", path.display()))?
        }
        None => PriceBook::standard(),
    };
    let estimator = Estimator::with_checked_prices(prices).wrap_err("Price book rejected")?;

    let app = router(AppState::new(estimator), config.request_timeout);
    serve(app, &config).await?;

    info!("Server stopped");
    Ok(())
}
