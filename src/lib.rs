pub mod cache;
pub mod costing;
pub mod engine;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod lint;
pub mod material;
pub mod numeric;
pub mod overrides;
pub mod persistence;
pub mod product;
pub mod settings;

pub use cache::{FileRateSource, RateSource, RateTableCache};
pub use costing::CostSheet;
pub use engine::{
    CostBreakdown, LegacyRate, LegacyStrategy, PricingContext, PricingEngine, PricingStrategy,
    Quote, QuotedProduct, StructuredStrategy, calculate_legacy_rate, calculate_structured_rate,
    cost_breakdown, quote_catalog, select_pricing_strategy,
};
pub use lint::{CatalogLint, LintIssue, LintProblem, lint_catalog, lint_product, lint_rates};
pub use material::{MaterialId, MaterialMap, RateTable, RawMaterialRate};
pub use numeric::Numeric;
pub use overrides::Overrides;
pub use persistence::{
    CatalogError, CatalogResult, DataKind, FileFormat, convert_file, load_products,
    load_products_from_csv, load_products_from_json, load_rates, load_rates_from_csv,
    load_rates_from_json, save_products_to_csv, save_products_to_json, save_rates_to_csv,
    save_rates_to_json,
};
pub use product::{MaterialUsage, PackingSize, PackingSpec, Product};
pub use settings::{PricingSettings, SettingsError};
