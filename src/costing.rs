use crate::material::MaterialId;
use crate::numeric::Numeric;
use crate::product::Product;

pub const DEFAULT_WASTAGE_PERCENT: f64 = 0.0;
pub const DEFAULT_MANUFACTURING_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_PACKING_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_MARGIN_PERCENT: f64 = 0.0;

/// A structured product with every optional field resolved to a number.
///
/// Optional scalars (wastage, multipliers, margin) fall back to their default
/// when absent or falsy, so an explicit `0` multiplier behaves like `1`.
/// Usage, add-on and manufacturing values are parsed leniently and may be NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct CostSheet<'a> {
    pub materials: Vec<MaterialLine<'a>>,
    pub additional_costs: Vec<f64>,
    pub manufacturing_multiplier: f64,
    pub packing_multiplier: f64,
    pub margin_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialLine<'a> {
    pub id: &'a MaterialId,
    pub usage: f64,
    pub wastage_percent: f64,
    /// Per-unit manufacturing surcharge, only for materials listed in
    /// `manufacturingCost`.
    pub manufacturing_cost: Option<f64>,
}

impl<'a> CostSheet<'a> {
    /// Resolves a new-schema product; `None` when it has no raw materials.
    pub fn from_product(product: &'a Product) -> Option<Self> {
        let raw_materials = product
            .raw_materials
            .as_ref()
            .filter(|materials| !materials.is_empty())?;

        let materials = raw_materials
            .iter()
            .map(|(id, usage)| MaterialLine {
                id,
                usage: usage.usage.parse_float(),
                wastage_percent: product
                    .wastage
                    .as_ref()
                    .and_then(|wastage| wastage.get(id))
                    .map_or(DEFAULT_WASTAGE_PERCENT, |value| {
                        truthy_or(value, DEFAULT_WASTAGE_PERCENT)
                    }),
                manufacturing_cost: product
                    .manufacturing_cost
                    .as_ref()
                    .and_then(|costs| costs.get(id))
                    .map(Numeric::parse_float),
            })
            .collect();

        let additional_costs = product
            .additional_costing
            .iter()
            .flat_map(|costs| costs.values())
            .map(Numeric::parse_float)
            .collect();

        Some(Self {
            materials,
            additional_costs,
            manufacturing_multiplier: optional_or(
                product.manufacturing_multiplier.as_ref(),
                DEFAULT_MANUFACTURING_MULTIPLIER,
            ),
            packing_multiplier: optional_or(
                product.packing_size.as_ref().and_then(|size| size.multiplier()),
                DEFAULT_PACKING_MULTIPLIER,
            ),
            margin_percent: optional_or(product.margin.as_ref(), DEFAULT_MARGIN_PERCENT),
        })
    }
}

fn truthy_or(value: &Numeric, default: f64) -> f64 {
    if value.is_truthy() {
        value.parse_float()
    } else {
        default
    }
}

fn optional_or(value: Option<&Numeric>, default: f64) -> f64 {
    value.map_or(default, |value| truthy_or(value, default))
}
