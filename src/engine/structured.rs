use crate::costing::CostSheet;
use crate::material::RateTable;
use crate::numeric::round_half_up;
use crate::overrides::Overrides;
use crate::product::Product;
use serde::Serialize;
use tracing::debug;

/// Intermediate aggregates of a structured price, in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub material_cost: f64,
    pub additional_cost: f64,
    pub manufacturing_cost: f64,
    pub manufacturing_multiplier: f64,
    pub total_cost: f64,
    pub packing_multiplier: f64,
    pub package_cost: f64,
    pub margin_percent: f64,
    pub final_cost: f64,
    /// `final_cost` rounded to a whole price unit.
    pub price: f64,
}

pub fn cost_breakdown(
    product: &Product,
    rates: &RateTable,
    overrides: &Overrides,
) -> Option<CostBreakdown> {
    let sheet = CostSheet::from_product(product)?;

    let material_cost: f64 = sheet
        .materials
        .iter()
        .map(|line| {
            let id = line.id.as_str();
            let rate = overrides
                .rate_for(id)
                .unwrap_or_else(|| rates.rate_or_zero(id));
            line.usage * rate * (1.0 + line.wastage_percent / 100.0)
        })
        .sum();

    let additional_cost: f64 = sheet.additional_costs.iter().sum();

    let manufacturing_cost: f64 = sheet
        .materials
        .iter()
        .filter_map(|line| line.manufacturing_cost.map(|per_unit| line.usage * per_unit))
        .sum();

    let total_cost =
        material_cost + additional_cost + (manufacturing_cost * sheet.manufacturing_multiplier);
    let package_cost = total_cost * sheet.packing_multiplier;
    // Margin is a share of the sale price, not a markup on cost.
    let final_cost = package_cost / (1.0 - (sheet.margin_percent / 100.0));

    let breakdown = CostBreakdown {
        material_cost,
        additional_cost,
        manufacturing_cost,
        manufacturing_multiplier: sheet.manufacturing_multiplier,
        total_cost,
        packing_multiplier: sheet.packing_multiplier,
        package_cost,
        margin_percent: sheet.margin_percent,
        final_cost,
        price: round_half_up(final_cost),
    };
    debug!(
        product = %product.description,
        material_cost,
        additional_cost,
        manufacturing_cost = manufacturing_cost * sheet.manufacturing_multiplier,
        total_cost,
        package_cost,
        margin_percent = sheet.margin_percent,
        final_cost,
        "structured cost breakdown"
    );
    Some(breakdown)
}

/// Prices a new-schema record. `None` when the product has no raw materials.
///
/// Unparsable numbers are not rejected: they become NaN and the returned
/// price is NaN (or infinite for a margin of 100). Callers must check
/// `is_finite` before displaying the price.
pub fn calculate_structured_rate(
    product: &Product,
    rates: &RateTable,
    overrides: &Overrides,
) -> Option<f64> {
    cost_breakdown(product, rates, overrides).map(|breakdown| breakdown.price)
}
