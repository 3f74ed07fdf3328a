use super::{CatalogError, CatalogResult};
use crate::material::{RateTable, RawMaterialRate};
use crate::numeric::Numeric;
use crate::product::Product;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// Retired legacy columns that are never written to, or read from, CSV.
const DEPRECATED_FIELDS: [&str; 4] = ["ratio", "cal", "percent_change", "net_rate"];

const RAW_MATERIALS: &str = "rawMaterials";
const WASTAGE: &str = "wastage";
const ADDITIONAL_COSTING: &str = "additonalCosting";
const MANUFACTURING_COST: &str = "manufacturingCost";
const PACKING_SIZE: &str = "packingSize";

const RAW_PREFIX: &str = "raw_";
const WASTAGE_PREFIX: &str = "wastage_";
const ADDCOST_PREFIX: &str = "addcost_";
const MANUFCOST_PREFIX: &str = "manufcost_";

const DEFAULT_USAGE_UNIT: &str = "kg";

pub fn load_products_from_json<P: AsRef<Path>>(path: P) -> CatalogResult<Vec<Product>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let products: Vec<Product> = serde_json::from_reader(file)?;
    info!(path = %path.display(), count = products.len(), "loaded product catalog");
    Ok(products)
}

pub fn save_products_to_json<P: AsRef<Path>>(products: &[Product], path: P) -> CatalogResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, products)?;
    Ok(())
}

pub fn load_rates_from_json<P: AsRef<Path>>(path: P) -> CatalogResult<RateTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let entries: Vec<RawMaterialRate> = serde_json::from_reader(file)?;
    info!(path = %path.display(), count = entries.len(), "loaded raw material rates");
    Ok(RateTable::new(entries))
}

pub fn save_rates_to_json<P: AsRef<Path>>(rates: &RateTable, path: P) -> CatalogResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, rates.entries())?;
    Ok(())
}

#[derive(Serialize, Deserialize)]
struct RateCsvRecord {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    rate: String,
}

impl From<&RawMaterialRate> for RateCsvRecord {
    fn from(entry: &RawMaterialRate) -> Self {
        Self {
            id: entry.id.to_string(),
            name: entry.name.clone().unwrap_or_default(),
            rate: entry.rate.to_string(),
        }
    }
}

impl RateCsvRecord {
    fn into_rate(self) -> RawMaterialRate {
        // Rates that do not parse are kept as text rather than rejected.
        let rate = match self.rate.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Numeric::Number(value),
            _ => Numeric::Text(self.rate),
        };
        RawMaterialRate {
            id: self.id.into(),
            name: parse_string_option(self.name),
            rate,
        }
    }
}

pub fn save_rates_to_csv<P: AsRef<Path>>(rates: &RateTable, path: P) -> CatalogResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for entry in rates.entries() {
        writer.serialize(RateCsvRecord::from(entry))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_rates_from_csv<P: AsRef<Path>>(path: P) -> CatalogResult<RateTable> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut entries = Vec::new();
    for record in reader.deserialize::<RateCsvRecord>() {
        entries.push(record?.into_rate());
    }
    Ok(RateTable::new(entries))
}

/// Writes a catalog as a flat sheet.
///
/// Columns are the sorted top-level fields (nested maps and deprecated legacy
/// fields excluded), then one column per material or label for each nested
/// map: `raw_<id>` (usage), `wastage_<id>`, `addcost_<label>` and
/// `manufcost_<id>`, each group sorted.
pub fn save_products_to_csv<P: AsRef<Path>>(products: &[Product], path: P) -> CatalogResult<()> {
    let records = products
        .iter()
        .map(|product| match serde_json::to_value(product)? {
            Value::Object(map) => Ok(map),
            _ => Err(CatalogError::InvalidData(
                "product did not serialize to an object".into(),
            )),
        })
        .collect::<CatalogResult<Vec<_>>>()?;

    let mut top_fields = BTreeSet::new();
    let mut raw_keys = BTreeSet::new();
    let mut wastage_keys = BTreeSet::new();
    let mut addcost_keys = BTreeSet::new();
    let mut manufcost_keys = BTreeSet::new();
    for record in &records {
        for key in record.keys() {
            if !is_nested_field(key) && !DEPRECATED_FIELDS.contains(&key.as_str()) {
                top_fields.insert(key.clone());
            }
        }
        raw_keys.extend(nested_keys(record, RAW_MATERIALS));
        wastage_keys.extend(nested_keys(record, WASTAGE));
        addcost_keys.extend(nested_keys(record, ADDITIONAL_COSTING));
        manufcost_keys.extend(nested_keys(record, MANUFACTURING_COST));
    }

    let mut header: Vec<String> = top_fields.iter().cloned().collect();
    header.extend(raw_keys.iter().map(|k| format!("{RAW_PREFIX}{k}")));
    header.extend(wastage_keys.iter().map(|k| format!("{WASTAGE_PREFIX}{k}")));
    header.extend(addcost_keys.iter().map(|k| format!("{ADDCOST_PREFIX}{k}")));
    header.extend(manufcost_keys.iter().map(|k| format!("{MANUFCOST_PREFIX}{k}")));

    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(&header)?;
    for record in &records {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        row.extend(top_fields.iter().map(|k| cell(record.get(k))));
        row.extend(raw_keys.iter().map(|k| {
            cell(nested_value(record, RAW_MATERIALS, k).and_then(|usage| usage.get("usage")))
        }));
        row.extend(wastage_keys.iter().map(|k| cell(nested_value(record, WASTAGE, k))));
        row.extend(
            addcost_keys
                .iter()
                .map(|k| cell(nested_value(record, ADDITIONAL_COSTING, k))),
        );
        row.extend(
            manufcost_keys
                .iter()
                .map(|k| cell(nested_value(record, MANUFACTURING_COST, k))),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;
    info!(count = records.len(), columns = header.len(), "wrote product sheet");
    Ok(())
}

/// Reads a flat product sheet written by [`save_products_to_csv`] (or edited
/// by hand). Empty cells are dropped, deprecated columns are ignored and
/// nested maps that end up empty are omitted.
pub fn load_products_from_csv<P: AsRef<Path>>(path: P) -> CatalogResult<Vec<Product>> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let header = reader.headers()?.clone();

    let mut products = Vec::new();
    for (row_idx, row) in reader.records().enumerate() {
        let row = row?;
        let mut record = Map::new();
        let mut raw_materials = Map::new();
        let mut wastage = Map::new();
        let mut additional = Map::new();
        let mut manufacturing = Map::new();

        for (column, value) in header.iter().zip(row.iter()) {
            if column.is_empty() || value.is_empty() {
                continue;
            }
            if let Some(id) = column.strip_prefix(RAW_PREFIX) {
                let mut usage = Map::new();
                usage.insert("usage".into(), Value::String(value.to_string()));
                usage.insert("unit".into(), Value::String(DEFAULT_USAGE_UNIT.into()));
                raw_materials.insert(id.to_string(), Value::Object(usage));
            } else if let Some(id) = column.strip_prefix(WASTAGE_PREFIX) {
                wastage.insert(id.to_string(), Value::String(value.to_string()));
            } else if let Some(label) = column.strip_prefix(ADDCOST_PREFIX) {
                additional.insert(label.to_string(), Value::String(value.to_string()));
            } else if let Some(id) = column.strip_prefix(MANUFCOST_PREFIX) {
                manufacturing.insert(id.to_string(), Value::String(value.to_string()));
            } else if DEPRECATED_FIELDS.contains(&column) {
                continue;
            } else if column == PACKING_SIZE {
                let parsed = match serde_json::from_str::<Value>(value) {
                    Ok(parsed @ Value::Object(_)) => parsed,
                    Ok(parsed) => {
                        warn!(row = row_idx + 1, %parsed, "packingSize is not an object");
                        parsed
                    }
                    Err(err) => {
                        warn!(row = row_idx + 1, %err, "could not parse packingSize as JSON");
                        Value::String(value.to_string())
                    }
                };
                record.insert(column.to_string(), parsed);
            } else {
                record.insert(column.to_string(), Value::String(value.to_string()));
            }
        }

        for (field, map) in [
            (RAW_MATERIALS, raw_materials),
            (WASTAGE, wastage),
            (ADDITIONAL_COSTING, additional),
            (MANUFACTURING_COST, manufacturing),
        ] {
            if !map.is_empty() {
                record.insert(field.to_string(), Value::Object(map));
            }
        }

        let product = serde_json::from_value::<Product>(Value::Object(record)).map_err(|err| {
            CatalogError::InvalidData(format!("row {}: {err}", row_idx + 1))
        })?;
        products.push(product);
    }

    if products.is_empty() {
        warn!("product sheet contained no rows");
    }
    Ok(products)
}

fn is_nested_field(key: &str) -> bool {
    matches!(
        key,
        RAW_MATERIALS | WASTAGE | ADDITIONAL_COSTING | MANUFACTURING_COST
    )
}

fn nested_keys(record: &Map<String, Value>, field: &str) -> Vec<String> {
    match record.get(field) {
        Some(Value::Object(map)) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

fn nested_value<'a>(record: &'a Map<String, Value>, field: &str, key: &str) -> Option<&'a Value> {
    record.get(field).and_then(|nested| nested.get(key))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
