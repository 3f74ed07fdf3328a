//! Opt-in checks for catalog values that would make a price meaningless.
//!
//! Pricing never consults these checks; an unparsable value still flows
//! through the engine as NaN. Lint exists so an operator can find and fix such
//! records before they show up as placeholders.

use crate::material::RateTable;
use crate::numeric::Numeric;
use crate::product::Product;
use serde::Serialize;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LintProblem {
    NotANumber,
    MarginNotBelowHundred,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintIssue {
    pub field: String,
    pub value: String,
    pub problem: LintProblem,
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            LintProblem::NotANumber => {
                write!(f, "{} is not a number ('{}')", self.field, self.value)
            }
            LintProblem::MarginNotBelowHundred => write!(
                f,
                "{} of {} leaves no cost share of the sale price",
                self.field, self.value
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogLint {
    pub position: usize,
    pub description: String,
    pub issue: LintIssue,
}

pub fn lint_product(product: &Product) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    if !product.has_raw_materials() {
        if product.has_legacy_fields() {
            for (field, value) in [("net_rate", &product.net_rate), ("ratio", &product.ratio)] {
                if let Some(value) = value {
                    check_strict(&mut issues, field.to_string(), value);
                }
            }
        }
        return issues;
    }

    for (id, usage) in product.raw_materials.iter().flatten() {
        check_lenient(&mut issues, format!("rawMaterials.{id}.usage"), &usage.usage);
    }
    for (id, percent) in product.wastage.iter().flatten() {
        if percent.is_truthy() {
            check_lenient(&mut issues, format!("wastage.{id}"), percent);
        }
    }
    for (label, cost) in product.additional_costing.iter().flatten() {
        check_lenient(&mut issues, format!("additonalCosting.{label}"), cost);
    }
    for (id, cost) in product.manufacturing_cost.iter().flatten() {
        if product
            .raw_materials
            .as_ref()
            .is_some_and(|materials| materials.contains_key(id))
        {
            check_lenient(&mut issues, format!("manufacturingCost.{id}"), cost);
        }
    }
    if let Some(multiplier) = product.manufacturing_multiplier.as_ref().filter(|v| v.is_truthy()) {
        check_lenient(&mut issues, "manufacturingMultiplier".into(), multiplier);
    }
    if let Some(multiplier) = product
        .packing_size
        .as_ref()
        .and_then(|size| size.multiplier())
        .filter(|v| v.is_truthy())
    {
        check_lenient(&mut issues, "packingSize.multiplier".into(), multiplier);
    }
    if let Some(margin) = product.margin.as_ref().filter(|v| v.is_truthy()) {
        let parsed = margin.parse_float();
        if parsed.is_nan() {
            check_lenient(&mut issues, "margin".into(), margin);
        } else if parsed >= 100.0 {
            issues.push(LintIssue {
                field: "margin".into(),
                value: margin.to_string(),
                problem: LintProblem::MarginNotBelowHundred,
            });
        }
    }
    issues
}

pub fn lint_rates(rates: &RateTable) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    for entry in rates.entries() {
        check_strict(&mut issues, format!("rates.{}", entry.id), &entry.rate);
    }
    issues
}

/// Lints every product and logs each finding.
pub fn lint_catalog(products: &[Product]) -> Vec<CatalogLint> {
    let mut findings = Vec::new();
    for (idx, product) in products.iter().enumerate() {
        for issue in lint_product(product) {
            warn!(position = idx + 1, product = %product.description, %issue, "catalog lint");
            findings.push(CatalogLint {
                position: idx + 1,
                description: product.description.clone(),
                issue,
            });
        }
    }
    findings
}

fn check_lenient(issues: &mut Vec<LintIssue>, field: String, value: &Numeric) {
    if value.parse_float().is_nan() {
        issues.push(not_a_number(field, value));
    }
}

fn check_strict(issues: &mut Vec<LintIssue>, field: String, value: &Numeric) {
    if value.to_number().is_nan() {
        issues.push(not_a_number(field, value));
    }
}

fn not_a_number(field: String, value: &Numeric) -> LintIssue {
    LintIssue {
        field,
        value: value.to_string(),
        problem: LintProblem::NotANumber,
    }
}
