use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{
    CatalogError, CostBreakdown, Numeric, Overrides, PricingContext, PricingEngine, Product,
    Quote, QuotedProduct, RateTableCache, RawMaterialRate, cost_breakdown,
};

#[derive(Clone)]
pub struct AppState {
    products: Arc<RwLock<Vec<Product>>>,
    rates: Arc<RateTableCache>,
    engine: Arc<PricingEngine>,
    default_overrides: Overrides,
}

impl AppState {
    pub fn new(products: Vec<Product>, rates: RateTableCache) -> Self {
        Self {
            products: Arc::new(RwLock::new(products)),
            rates: Arc::new(rates),
            engine: Arc::new(PricingEngine::new()),
            default_overrides: Overrides::new(),
        }
    }

    /// Overrides used by `/quotes` when the request names no copper rate.
    pub fn with_default_overrides(mut self, overrides: Overrides) -> Self {
        self.default_overrides = overrides;
        self
    }

    pub fn replace_products(&self, products: Vec<Product>) {
        *self.products.write() = products;
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

/// Failure to load the rate table; pricing itself never fails.
#[derive(Debug)]
struct ApiError(String);

impl From<CatalogError> for ApiError {
    fn from(value: CatalogError) -> Self {
        error!(%value, "rate table unavailable");
        ApiError(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: "internal_error",
            message: self.0,
        });
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct QuotesQuery {
    copper: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuoteRequest {
    product: Product,
    #[serde(default)]
    overrides: Overrides,
}

#[derive(Debug, Serialize)]
struct QuoteResponse {
    quote: Quote,
    display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<CostBreakdown>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rates", get(list_rates))
        .route("/products", get(list_products))
        .route("/quotes", get(list_quotes))
        .route("/quote", post(quote_product))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "pricing HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_rates(State(state): State<AppState>) -> Result<Json<Vec<RawMaterialRate>>, ApiError> {
    let rates = state.rates.get_or_load()?;
    Ok(Json(rates.entries().to_vec()))
}

async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    let products = state.products.read().clone();
    Json(products)
}

async fn list_quotes(
    State(state): State<AppState>,
    Query(query): Query<QuotesQuery>,
) -> Result<Json<Vec<QuotedProduct>>, ApiError> {
    let rates = state.rates.get_or_load()?;
    let overrides = match query.copper {
        Some(copper) => Overrides::with_copper(Numeric::Text(copper)),
        None => state.default_overrides.clone(),
    };
    let context = PricingContext::new(&rates, &overrides);
    let quotes = {
        let guard = state.products.read();
        state.engine.quote_catalog(&guard, &context)
    };
    Ok(Json(quotes))
}

async fn quote_product(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let rates = state.rates.get_or_load()?;
    let context = PricingContext::new(&rates, &request.overrides);
    let quote = state.engine.quote(&request.product, &context);
    let breakdown = cost_breakdown(&request.product, &rates, &request.overrides);
    Ok(Json(QuoteResponse {
        display: quote.display(),
        quote,
        breakdown,
    }))
}
