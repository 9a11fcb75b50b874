//! Image sources: memory-mapped files and devices, or in-memory buffers.

mod memory_image;
mod mmap_image;

pub use memory_image::MemoryImage;
pub use mmap_image::MmapImage;
