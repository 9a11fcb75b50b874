//! Signature catalog files
//!
//! A catalog file is a JSON array whose byte strings are hex encoded:
//!
//! ```json
//! [
//!   { "extension": "jpg", "header": "ffd8", "footer": "ffd9" },
//!   { "extension": "bmp", "header": "424d", "footer": null }
//! ]
//! ```
//!
//! `footer` may also be omitted. Rows that decode but fail descriptor
//! validation (an empty header, say) are kept here and rejected per
//! entry at scan time.

use crate::core::error::{CarveError, Result};
use crate::domain::entities::CatalogEntry;
use crate::domain::services::SignatureCatalog;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryDto {
    extension: String,
    header: String,
    #[serde(default)]
    footer: Option<String>,
}

fn invalid(path: &Path, reason: impl Into<String>) -> CarveError {
    CarveError::Catalog {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Parses catalog JSON; `path` is only used in error messages
pub fn parse_catalog(path: &Path, json: &str) -> Result<SignatureCatalog> {
    let dtos: Vec<EntryDto> = serde_json::from_str(json).map_err(|e| invalid(path, e.to_string()))?;

    dtos.into_iter()
        .enumerate()
        .map(|(index, dto)| {
            let decode = |field: &str, value: &str| {
                hex::decode(value).map_err(|e| {
                    invalid(path, format!("entry #{index} ({}): bad {field}: {e}", dto.extension))
                })
            };
            let header = decode("header", &dto.header)?;
            let footer = dto
                .footer
                .as_deref()
                .map(|f| decode("footer", f))
                .transpose()?;
            Ok(CatalogEntry {
                extension: dto.extension.clone(),
                header,
                footer,
            })
        })
        .collect()
}

/// Loads a catalog file
pub fn load_catalog(path: impl AsRef<Path>) -> Result<SignatureCatalog> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| invalid(path, e.to_string()))?;
    let catalog = parse_catalog(path, &json)?;
    debug!(path = %path.display(), entries = catalog.len(), "loaded signature catalog");
    Ok(catalog)
}

/// Writes a catalog in the same format [`load_catalog`] reads
pub fn save_catalog(path: impl AsRef<Path>, catalog: &SignatureCatalog) -> Result<()> {
    let path = path.as_ref();
    let dtos: Vec<EntryDto> = catalog
        .entries()
        .iter()
        .map(|entry| EntryDto {
            extension: entry.extension.clone(),
            header: hex::encode(&entry.header),
            footer: entry.footer.as_ref().map(hex::encode),
        })
        .collect();
    let json = serde_json::to_string_pretty(&dtos).map_err(|e| invalid(path, e.to_string()))?;
    fs::write(path, json).map_err(|e| CarveError::destination(path, e))
}
