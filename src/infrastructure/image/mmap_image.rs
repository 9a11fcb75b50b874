//! Memory-mapped image implementation
//!
//! Maps a disk image file or raw block device read-only so that every
//! signature pass searches the same pages without copying them. The
//! kernel pages data in on demand, so images larger than RAM are fine.

use crate::core::error::{CarveError, Result};
use crate::domain::repositories::ImageSource;
use memmap2::{Mmap, MmapOptions};
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

enum Backing {
    Mapped(Mmap),
    /// Zero-length files cannot be mapped
    Empty,
}

/// Read-only memory-mapped image
///
/// # Example
///
/// ```ignore
/// let image = MmapImage::open("/dev/sdb")?;
/// let first_sector = image.slice_at(0, 512);
/// ```
pub struct MmapImage {
    backing: Backing,
    path: PathBuf,
    label: String,
}

impl MmapImage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|e| CarveError::image(path, e))?;

        let size = Self::size_of(&file).map_err(|e| CarveError::image(path, e))?;
        let len = usize::try_from(size).map_err(|_| {
            CarveError::image(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "image too large to map"),
            )
        })?;

        let backing = if len == 0 {
            Backing::Empty
        } else {
            // SAFETY: mapped read-only; the image is not expected to change while carving.
            let mmap = unsafe { MmapOptions::new().len(len).map(&file) }
                .map_err(|e| CarveError::image(path, e))?;
            Backing::Mapped(mmap)
        };

        debug!(path = %path.display(), size, "mapped image");

        Ok(Self {
            backing,
            path: path.to_path_buf(),
            label: path.display().to_string(),
        })
    }

    /// Regular files report their length in metadata; block devices
    /// report 0 there and need a seek to the end.
    fn size_of(file: &File) -> io::Result<u64> {
        let metadata = file.metadata()?;
        if metadata.is_file() {
            return Ok(metadata.len());
        }
        let mut f = file.try_clone()?;
        let size = f.seek(SeekFrom::End(0))?;
        f.seek(SeekFrom::Start(0))?;
        Ok(size)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a slice at the specified offset and length
    ///
    /// This is a zero-copy operation. `None` if the range leaves the image.
    #[inline]
    pub fn slice_at(&self, offset: u64, length: u64) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        let end = start.checked_add(usize::try_from(length).ok()?)?;
        self.as_bytes().get(start..end)
    }
}

impl ImageSource for MmapImage {
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(mmap) => &mmap[..],
            Backing::Empty => &[],
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn open_nonexistent_is_image_error() {
        let err = MmapImage::open("/nonexistent/disk.img").err().unwrap();
        assert!(matches!(err, CarveError::ImageAccess { .. }));
    }

    #[test]
    fn slice_at_is_bounded() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Zero-copy access!").unwrap();
        file.flush().unwrap();

        let image = MmapImage::open(file.path()).unwrap();
        assert_eq!(image.slice_at(5, 4).unwrap(), b"copy");
        assert_eq!(image.len(), 17);
        assert!(image.slice_at(10, 8).is_none());
        assert!(image.slice_at(u64::MAX, 1).is_none());
    }

    #[test]
    fn empty_file_maps_to_empty_image() {
        let file = NamedTempFile::new().unwrap();
        let image = MmapImage::open(file.path()).unwrap();
        assert!(image.is_empty());
        assert!(image.as_bytes().is_empty());
    }
}
