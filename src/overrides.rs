use crate::material::{MaterialId, MaterialMap};
use crate::numeric::Numeric;
use serde::{Deserialize, Serialize};

/// Operator-supplied rate substitutions applied ahead of the rate table.
///
/// The `copper` entry doubles as the commodity rate of the legacy formula.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides(MaterialMap<Numeric>);

impl Overrides {
    pub const COPPER: &'static str = "copper";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_copper(copper_rate: impl Into<Numeric>) -> Self {
        let mut overrides = Self::new();
        overrides.set(Self::COPPER, copper_rate);
        overrides
    }

    pub fn set(&mut self, id: impl Into<MaterialId>, rate: impl Into<Numeric>) {
        self.0.insert(id.into(), rate.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<Numeric> {
        self.0.shift_remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Numeric> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Parsed override for `id`, if one is present. A present but unparsable
    /// override yields NaN rather than falling back to the rate table.
    pub fn rate_for(&self, id: &str) -> Option<f64> {
        self.0.get(id).map(Numeric::parse_float)
    }

    pub fn copper(&self) -> Option<&Numeric> {
        self.get(Self::COPPER)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MaterialId, &Numeric)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Overrides
where
    K: Into<MaterialId>,
    V: Into<Numeric>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(id, rate)| (id.into(), rate.into()))
                .collect(),
        )
    }
}
