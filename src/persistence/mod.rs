use crate::material::RateTable;
use crate::product::Product;
use serde_json::Error as SerdeJsonError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub mod file;

pub use file::{
    load_products_from_csv, load_products_from_json, load_rates_from_csv, load_rates_from_json,
    save_products_to_csv, save_products_to_json, save_rates_to_csv, save_rates_to_json,
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("unknown format '{0}' (expected json or csv)")]
    UnknownFormat(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// On-disk encodings supported for catalogs and rate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Csv,
}

impl FileFormat {
    pub fn parse(input: &str) -> CatalogResult<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(FileFormat::Json),
            "csv" => Ok(FileFormat::Csv),
            other => Err(CatalogError::UnknownFormat(other.to_string())),
        }
    }

    /// Format implied by a path's extension.
    pub fn from_path(path: &Path) -> CatalogResult<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::parse(ext)
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Json => "json",
            FileFormat::Csv => "csv",
        }
    }
}

/// The two kinds of document the pricing tools read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Products,
    Rates,
}

impl DataKind {
    pub fn parse(input: &str) -> CatalogResult<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "products" | "catalog" => Ok(DataKind::Products),
            "rates" => Ok(DataKind::Rates),
            other => Err(CatalogError::InvalidData(format!(
                "unknown document kind '{other}' (expected products or rates)"
            ))),
        }
    }
}

/// Loads a catalog, choosing JSON or CSV by extension (JSON when unknown).
pub fn load_products<P: AsRef<Path>>(path: P) -> CatalogResult<Vec<Product>> {
    let path = path.as_ref();
    match FileFormat::from_path(path).unwrap_or(FileFormat::Json) {
        FileFormat::Json => load_products_from_json(path),
        FileFormat::Csv => load_products_from_csv(path),
    }
}

/// Loads a rate table, choosing JSON or CSV by extension (JSON when unknown).
pub fn load_rates<P: AsRef<Path>>(path: P) -> CatalogResult<RateTable> {
    let path = path.as_ref();
    match FileFormat::from_path(path).unwrap_or(FileFormat::Json) {
        FileFormat::Json => load_rates_from_json(path),
        FileFormat::Csv => load_rates_from_csv(path),
    }
}

/// Converts a document between JSON and CSV.
///
/// Without an explicit `output` the input path is reused with the target
/// extension. Returns the path written.
pub fn convert_file(
    kind: DataKind,
    target: FileFormat,
    input: &Path,
    output: Option<&Path>,
) -> CatalogResult<PathBuf> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension(target.extension()));
    match (kind, target) {
        (DataKind::Products, FileFormat::Csv) => {
            save_products_to_csv(&load_products_from_json(input)?, &output)?
        }
        (DataKind::Products, FileFormat::Json) => {
            save_products_to_json(&load_products_from_csv(input)?, &output)?
        }
        (DataKind::Rates, FileFormat::Csv) => {
            save_rates_to_csv(&load_rates_from_json(input)?, &output)?
        }
        (DataKind::Rates, FileFormat::Json) => {
            save_rates_to_json(&load_rates_from_csv(input)?, &output)?
        }
    }
    info!(input = %input.display(), output = %output.display(), "converted {kind:?} to {}", target.extension());
    Ok(output)
}
