//! Manifest record entity
//!
//! The externally visible result of a scan: coordinates of an accepted
//! extent inside the image plus its entropy. Records own no bytes; they
//! stay valid as long as the same image can be re-opened at those
//! offsets.

use super::extent::Offset;
use super::signature::is_valid_extension;

/// Highest possible Shannon entropy of a byte stream, in bits per byte
pub const MAX_ENTROPY: f64 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRecord {
    id: u64,
    extension: String,
    offset: Offset,
    size: u64,
    entropy: f64,
}

impl ManifestRecord {
    pub fn new(id: u64, extension: impl Into<String>, offset: Offset, size: u64, entropy: f64) -> Self {
        Self {
            id,
            extension: extension.into(),
            offset,
            size,
            entropy,
        }
    }

    /// Scan-local identifier, starting at 1
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn entropy(&self) -> f64 {
        self.entropy
    }

    /// Exclusive end offset, `None` on overflow
    pub fn end(&self) -> Option<Offset> {
        self.offset.checked_add(self.size)
    }

    /// Name of the materialized file: `recovered_{id}.{extension}`
    pub fn file_name(&self) -> String {
        format!("recovered_{}.{}", self.id, self.extension)
    }

    /// Checks the record invariants that hold independently of any image.
    pub fn validate(&self) -> Result<(), String> {
        if self.id == 0 {
            return Err("id must be positive".into());
        }
        if self.size == 0 {
            return Err(format!("record {} has zero size", self.id));
        }
        if self.end().is_none() {
            return Err(format!("record {} overflows the offset range", self.id));
        }
        if !(0.0..=MAX_ENTROPY).contains(&self.entropy) {
            return Err(format!(
                "record {} has entropy {} outside [0, 8]",
                self.id, self.entropy
            ));
        }
        if !is_valid_extension(&self.extension) {
            return Err(format!(
                "record {} has unusable extension {:?}",
                self.id, self.extension
            ));
        }
        Ok(())
    }

    /// Checks that the record fits an image of `image_len` bytes
    pub fn fits_within(&self, image_len: u64) -> bool {
        self.end().is_some_and(|end| end <= image_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_id_and_extension() {
        let record = ManifestRecord::new(7, "png", 4096, 2048, 7.6);
        assert_eq!(record.file_name(), "recovered_7.png");
    }

    #[test]
    fn validate_rejects_zero_id_and_size() {
        assert!(ManifestRecord::new(0, "jpg", 0, 10, 1.0).validate().is_err());
        assert!(ManifestRecord::new(1, "jpg", 0, 0, 1.0).validate().is_err());
    }

    #[test]
    fn validate_rejects_nan_entropy() {
        let record = ManifestRecord::new(1, "jpg", 0, 10, f64::NAN);
        assert!(record.validate().is_err());
    }

    #[test]
    fn fits_within_image_bounds() {
        let record = ManifestRecord::new(1, "gif", 100, 50, 5.0);
        assert!(record.fits_within(150));
        assert!(!record.fits_within(149));
        assert!(!ManifestRecord::new(2, "gif", u64::MAX, 2, 5.0).fits_within(u64::MAX));
    }
}
