use crate::numeric::Numeric;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// Identifies a raw material consistently across a product's usage,
/// wastage and manufacturing maps, the rate table and the override map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(String);

impl MaterialId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MaterialId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MaterialId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MaterialId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-material values in catalog order.
pub type MaterialMap<V> = IndexMap<MaterialId, V>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMaterialRate {
    pub id: MaterialId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub rate: Numeric,
}

impl RawMaterialRate {
    pub fn new(id: impl Into<MaterialId>, rate: impl Into<Numeric>) -> Self {
        Self {
            id: id.into(),
            name: None,
            rate: rate.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Snapshot of raw-material rates indexed by material id.
///
/// When an id appears more than once the first entry wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    entries: Vec<RawMaterialRate>,
    index: HashMap<MaterialId, usize>,
}

impl RateTable {
    pub fn new(entries: Vec<RawMaterialRate>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            index.entry(entry.id.clone()).or_insert(pos);
        }
        Self { entries, index }
    }

    pub fn entries(&self) -> &[RawMaterialRate] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RawMaterialRate> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    /// Unit rate for `id`; a missing entry or a `null` rate is `0`.
    pub fn rate_or_zero(&self, id: &str) -> f64 {
        self.get(id).map(|entry| entry.rate.to_number()).unwrap_or(0.0)
    }

    pub fn into_entries(self) -> Vec<RawMaterialRate> {
        self.entries
    }
}

impl FromIterator<RawMaterialRate> for RateTable {
    fn from_iter<I: IntoIterator<Item = RawMaterialRate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<Vec<RawMaterialRate>> for RateTable {
    fn from(entries: Vec<RawMaterialRate>) -> Self {
        Self::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_duplicate_wins_and_missing_is_zero() {
        let table = RateTable::new(vec![
            RawMaterialRate::new("copper", 750.0),
            RawMaterialRate::new("copper", 1.0),
            RawMaterialRate::new("pvc", Numeric::Null),
        ]);
        assert_eq!(table.rate_or_zero("copper"), 750.0);
        assert_eq!(table.rate_or_zero("pvc"), 0.0);
        assert_eq!(table.rate_or_zero("steel"), 0.0);
        assert_eq!(table.len(), 3);
    }
}
