#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use product_pricing::{
        FileRateSource, Overrides, PricingSettings, RateTableCache, http_api, load_products,
    };
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("product_pricing=info")),
        )
        .init();

    let settings = PricingSettings::load()?;
    let addr: SocketAddr = settings.http_addr.parse()?;
    let products = load_products(&settings.catalog_path)?;
    let rates = RateTableCache::new(FileRateSource::new(settings.rates_path.clone()));

    let mut state = http_api::AppState::new(products, rates);
    if let Some(copper) = settings.copper_rate.clone() {
        state = state.with_default_overrides(Overrides::with_copper(copper));
    }

    tracing::info!("product pricing HTTP API on http://{addr}");
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
