//! Signature entities
//!
//! A catalog supplies raw [`CatalogEntry`] values. Each one is checked
//! once per scan and turned into a [`SignatureDescriptor`], whose header
//! is guaranteed non-empty and whose extension is usable as a file name
//! suffix.

use crate::core::error::{CarveError, Result};
use std::fmt;

/// A catalog row as supplied, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub extension: String,
    pub header: Vec<u8>,
    pub footer: Option<Vec<u8>>,
}

impl CatalogEntry {
    /// Creates an entry without a footer
    pub fn new(extension: impl Into<String>, header: impl Into<Vec<u8>>) -> Self {
        Self {
            extension: extension.into(),
            header: header.into(),
            footer: None,
        }
    }

    /// Sets the footer bytes
    pub fn with_footer(mut self, footer: impl Into<Vec<u8>>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// A validated format signature: extension, magic header, optional footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureDescriptor {
    extension: String,
    header: Vec<u8>,
    footer: Option<Vec<u8>>,
}

impl SignatureDescriptor {
    /// Validates catalog entry number `index`.
    ///
    /// An empty header (with or without a footer) or an extension that
    /// cannot form a file name is rejected. An empty footer is treated as
    /// no footer at all.
    pub fn from_entry(index: usize, entry: &CatalogEntry) -> Result<Self> {
        let reject = |reason: &str| CarveError::MalformedCatalogEntry {
            index,
            extension: entry.extension.clone(),
            reason: reason.to_string(),
        };

        if entry.header.is_empty() {
            return Err(match entry.footer {
                Some(ref f) if !f.is_empty() => reject("footer without header"),
                _ => reject("empty header"),
            });
        }
        if entry.extension.is_empty() {
            return Err(reject("empty extension"));
        }
        if !is_valid_extension(&entry.extension) {
            return Err(reject("extension is not a valid file name suffix"));
        }

        Ok(Self {
            extension: entry.extension.clone(),
            header: entry.header.clone(),
            footer: entry.footer.clone().filter(|f| !f.is_empty()),
        })
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn footer(&self) -> Option<&[u8]> {
        self.footer.as_deref()
    }

    /// Checks if the given data starts with this signature's header
    pub fn matches_header(&self, data: &[u8]) -> bool {
        data.starts_with(&self.header)
    }

    /// `None` when the format defines no footer.
    pub fn matches_footer(&self, data: &[u8]) -> Option<bool> {
        self.footer.as_deref().map(|footer| data.ends_with(footer))
    }
}

/// An extension is used verbatim as a file name suffix.
pub(crate) fn is_valid_extension(extension: &str) -> bool {
    !extension.is_empty()
        && !extension
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '\0') || c.is_whitespace())
}

impl fmt::Display for SignatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (header: {}", self.extension, hex::encode(&self.header))?;
        match &self.footer {
            Some(footer) => write!(f, ", footer: {})", hex::encode(footer)),
            None => write!(f, ", no footer)"),
        }
    }
}
