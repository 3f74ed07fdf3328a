pub mod legacy;
pub mod structured;

pub use legacy::{LegacyRate, calculate_legacy_rate};
pub use structured::{CostBreakdown, calculate_structured_rate, cost_breakdown};

use crate::material::RateTable;
use crate::numeric::{Numeric, to_fixed_2dp};
use crate::overrides::Overrides;
use crate::product::Product;
use serde::Serialize;
use tracing::debug;

/// Inputs shared by every product priced in one recompute.
#[derive(Debug, Clone, Copy)]
pub struct PricingContext<'a> {
    pub rates: &'a RateTable,
    pub overrides: &'a Overrides,
}

impl<'a> PricingContext<'a> {
    pub fn new(rates: &'a RateTable, overrides: &'a Overrides) -> Self {
        Self { rates, overrides }
    }
}

/// Outcome of pricing one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Quote {
    /// Whole-unit price from the raw-material breakdown. May be NaN or
    /// infinite when the inputs are malformed.
    Structured { price: f64 },
    Legacy { rate: LegacyRate },
    Unpriced,
}

impl Quote {
    /// The price to show, or `None` when a placeholder should be shown
    /// instead: no price, a non-finite price, or a structured price of zero.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Quote::Structured { price } if price.is_finite() && *price != 0.0 => Some(*price),
            Quote::Legacy { rate } => Some(rate.value()).filter(|value| value.is_finite()),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        self.amount()
            .map(to_fixed_2dp)
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn is_priced(&self) -> bool {
        !matches!(self, Quote::Unpriced)
    }
}

/// One way of pricing a product record. Strategies are tried in order and
/// the first that accepts a product prices it.
pub trait PricingStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn accepts(&self, product: &Product) -> bool;
    fn price(&self, product: &Product, context: &PricingContext<'_>) -> Quote;
}

/// Raw-material breakdown pricing for new-schema records.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredStrategy;

impl PricingStrategy for StructuredStrategy {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn accepts(&self, product: &Product) -> bool {
        product.has_raw_materials()
    }

    fn price(&self, product: &Product, context: &PricingContext<'_>) -> Quote {
        calculate_structured_rate(product, context.rates, context.overrides)
            .map_or(Quote::Unpriced, |price| Quote::Structured { price })
    }
}

/// Copper formula for records that only carry `net_rate` and `ratio`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyStrategy;

impl PricingStrategy for LegacyStrategy {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn accepts(&self, product: &Product) -> bool {
        product.has_legacy_fields()
    }

    fn price(&self, product: &Product, context: &PricingContext<'_>) -> Quote {
        let field = |value: &Option<Numeric>| value.clone().unwrap_or_default();
        let copper = context.overrides.copper().cloned().unwrap_or_default();
        calculate_legacy_rate(copper, field(&product.net_rate), field(&product.ratio))
            .map_or(Quote::Unpriced, |rate| Quote::Legacy { rate })
    }
}

pub struct PricingEngine {
    strategies: Vec<Box<dyn PricingStrategy>>,
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingEngine {
    /// Structured pricing first, then the legacy formula.
    pub fn new() -> Self {
        Self {
            strategies: vec![Box::new(StructuredStrategy), Box::new(LegacyStrategy)],
        }
    }

    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: impl PricingStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn strategy_for(&self, product: &Product) -> Option<&dyn PricingStrategy> {
        self.strategies
            .iter()
            .find(|strategy| strategy.accepts(product))
            .map(|strategy| strategy.as_ref())
    }

    pub fn quote(&self, product: &Product, context: &PricingContext<'_>) -> Quote {
        match self.strategy_for(product) {
            Some(strategy) => {
                let quote = strategy.price(product, context);
                debug!(
                    product = %product.description,
                    strategy = strategy.name(),
                    ?quote,
                    "priced product"
                );
                quote
            }
            None => Quote::Unpriced,
        }
    }

    pub fn quote_catalog(
        &self,
        products: &[Product],
        context: &PricingContext<'_>,
    ) -> Vec<QuotedProduct> {
        products
            .iter()
            .enumerate()
            .map(|(idx, product)| QuotedProduct {
                position: idx + 1,
                description: product.description.clone(),
                packing: product.packing.clone(),
                quote: self.quote(product, context),
            })
            .collect()
    }
}

/// A catalog row ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotedProduct {
    pub position: usize,
    pub description: String,
    pub packing: String,
    pub quote: Quote,
}

/// Prices one product with the standard strategies.
pub fn select_pricing_strategy(
    product: &Product,
    rates: &RateTable,
    overrides: &Overrides,
) -> Quote {
    PricingEngine::new().quote(product, &PricingContext::new(rates, overrides))
}

/// Prices a whole catalog with one override map applied to every product.
pub fn quote_catalog(
    products: &[Product],
    rates: &RateTable,
    overrides: &Overrides,
) -> Vec<QuotedProduct> {
    PricingEngine::new().quote_catalog(products, &PricingContext::new(rates, overrides))
}
