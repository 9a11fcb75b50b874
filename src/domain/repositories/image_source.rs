//! Image source trait
//!
//! A disk image (or raw device) viewed as one contiguous byte slice.

/// Read-only view over the bytes being carved
///
/// Implementations may map a file, hold a buffer in memory, or expose a
/// device. Scanning never writes through this view.
///
/// # Example
///
/// ```ignore
/// let image = MmapImage::open("disk.img")?;
/// let jpegs = scanner.find_all(image.as_bytes(), b"\xff\xd8");
/// ```
pub trait ImageSource: Send + Sync {
    /// The whole image
    fn as_bytes(&self) -> &[u8];

    /// Human-readable origin, usually the path
    fn label(&self) -> &str;

    /// Image size in bytes
    fn len(&self) -> u64 {
        self.as_bytes().len() as u64
    }

    fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}
