use crate::numeric::{Numeric, to_fixed_2dp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Legacy copper-driven rate, kept in its two-decimal text form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyRate(String);

impl LegacyRate {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> f64 {
        self.0.parse::<f64>().unwrap_or(f64::NAN)
    }
}

impl fmt::Display for LegacyRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prices an old-schema record from the copper commodity rate.
///
/// Returns `None` when any input is falsy (`0`, NaN, empty text, `null`).
/// The arithmetic runs in the historical order, even though `ratio` cancels
/// out, so results stay identical to previously published prices.
pub fn calculate_legacy_rate(
    copper_rate: impl Into<Numeric>,
    net_rate: impl Into<Numeric>,
    ratio: impl Into<Numeric>,
) -> Option<LegacyRate> {
    let (copper_rate, net_rate, ratio) = (copper_rate.into(), net_rate.into(), ratio.into());
    if !copper_rate.is_truthy() || !net_rate.is_truthy() || !ratio.is_truthy() {
        return None;
    }
    let (copper, net, ratio) = (copper_rate.to_number(), net_rate.to_number(), ratio.to_number());

    let base = copper * ((((((net * 100.0) / 105.0) * (ratio / 100.0)) / 913.0) / ratio) * 100.0);
    let result = base * 1.05;
    Some(LegacyRate(to_fixed_2dp(result)))
}
