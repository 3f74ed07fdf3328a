use crate::material::MaterialMap;
use crate::numeric::Numeric;
use indexmap::IndexMap;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A catalog record. New-schema records carry `rawMaterials`; older records
/// only carry `net_rate` and `ratio`. Both kinds may share one catalog.
///
/// Deserialization never rejects a record over a mistyped field: numeric
/// fields fall back to [`Numeric::Other`], a nested map that is not an object
/// is treated as absent, and non-string labels are rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, deserialize_with = "display_text")]
    pub description: String,
    #[serde(default, deserialize_with = "display_text")]
    pub packing: String,
    #[serde(
        default,
        deserialize_with = "object_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_materials: Option<MaterialMap<MaterialUsage>>,
    #[serde(
        default,
        deserialize_with = "object_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub wastage: Option<MaterialMap<Numeric>>,
    /// Flat add-on costs keyed by an arbitrary label.
    #[serde(
        rename = "additonalCosting",
        default,
        deserialize_with = "object_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_costing: Option<IndexMap<String, Numeric>>,
    #[serde(
        default,
        deserialize_with = "object_or_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub manufacturing_cost: Option<MaterialMap<Numeric>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturing_multiplier: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packing_size: Option<PackingSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Numeric>,
    #[serde(rename = "net_rate", default, skip_serializing_if = "Option::is_none")]
    pub net_rate: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<Numeric>,
    /// Any other top-level fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One `rawMaterials` entry. An entry that is not an object (a bare number,
/// say) has no usage and prices as NaN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct MaterialUsage {
    pub usage: Numeric,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl From<Value> for MaterialUsage {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut fields) => Self {
                unit: fields.get("unit").and_then(Value::as_str).map(String::from),
                usage: fields.remove("usage").map(Numeric::from).unwrap_or_default(),
            },
            _ => Self::default(),
        }
    }
}

impl MaterialUsage {
    pub fn new(usage: impl Into<Numeric>) -> Self {
        Self {
            usage: usage.into(),
            unit: None,
        }
    }
}

/// `packingSize` is normally an object. Anything else (text a spreadsheet
/// import could not parse, a bare number) is kept verbatim and behaves as if
/// no multiplier were given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PackingSize {
    Spec(PackingSpec),
    Unparsed(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<Numeric>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackingSize {
    pub fn with_multiplier(multiplier: impl Into<Numeric>) -> Self {
        PackingSize::Spec(PackingSpec {
            multiplier: Some(multiplier.into()),
            extra: Map::new(),
        })
    }

    pub fn multiplier(&self) -> Option<&Numeric> {
        match self {
            PackingSize::Spec(spec) => spec.multiplier.as_ref(),
            PackingSize::Unparsed(_) => None,
        }
    }
}

impl Product {
    pub fn new(description: impl Into<String>, packing: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            packing: packing.into(),
            ..Self::default()
        }
    }

    /// True when the record carries a non-empty raw-material breakdown.
    pub fn has_raw_materials(&self) -> bool {
        self.raw_materials
            .as_ref()
            .is_some_and(|materials| !materials.is_empty())
    }

    /// True when both legacy fields are present and truthy.
    pub fn has_legacy_fields(&self) -> bool {
        let truthy = |field: &Option<Numeric>| field.as_ref().is_some_and(Numeric::is_truthy);
        truthy(&self.net_rate) && truthy(&self.ratio)
    }

    pub fn with_material(mut self, id: &str, usage: impl Into<Numeric>) -> Self {
        self.raw_materials
            .get_or_insert_with(MaterialMap::new)
            .insert(id.into(), MaterialUsage::new(usage));
        self
    }

    pub fn with_wastage(mut self, id: &str, percent: impl Into<Numeric>) -> Self {
        self.wastage
            .get_or_insert_with(MaterialMap::new)
            .insert(id.into(), percent.into());
        self
    }

    pub fn with_additional_cost(mut self, label: &str, cost: impl Into<Numeric>) -> Self {
        self.additional_costing
            .get_or_insert_with(IndexMap::new)
            .insert(label.to_string(), cost.into());
        self
    }

    pub fn with_manufacturing_cost(mut self, id: &str, per_unit: impl Into<Numeric>) -> Self {
        self.manufacturing_cost
            .get_or_insert_with(MaterialMap::new)
            .insert(id.into(), per_unit.into());
        self
    }

    pub fn with_manufacturing_multiplier(mut self, multiplier: impl Into<Numeric>) -> Self {
        self.manufacturing_multiplier = Some(multiplier.into());
        self
    }

    pub fn with_packing_multiplier(mut self, multiplier: impl Into<Numeric>) -> Self {
        self.packing_size = Some(PackingSize::with_multiplier(multiplier));
        self
    }

    pub fn with_margin(mut self, margin: impl Into<Numeric>) -> Self {
        self.margin = Some(margin.into());
        self
    }

    pub fn with_legacy(mut self, net_rate: impl Into<Numeric>, ratio: impl Into<Numeric>) -> Self {
        self.net_rate = Some(net_rate.into());
        self.ratio = Some(ratio.into());
        self
    }
}

fn display_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Keeps a nested map when it is an object and drops it otherwise.
fn object_or_absent<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ObjectOr<M> {
        Object(M),
        Other(IgnoredAny),
    }

    Ok(match Option::<ObjectOr<T>>::deserialize(deserializer)? {
        Some(ObjectOr::Object(map)) => Some(map),
        Some(ObjectOr::Other(_)) | None => None,
    })
}
