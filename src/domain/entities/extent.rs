//! Candidate extents produced by fragment assembly.

use std::ops::Range;

pub type Offset = u64;

/// How an extent's end was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtentKind {
    /// Header paired with the first footer after it
    Contiguous,
    /// Header with no footer, bounded by the next header or end of image
    Orphan,
}

/// A half-open byte range `[start, end)` into the mapped image.
///
/// Always non-empty and within the bounds of the haystack it was
/// assembled from. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent {
    pub start: usize,
    pub end: usize,
    pub kind: ExtentKind,
}

impl Extent {
    pub fn contiguous(start: usize, end: usize) -> Self {
        debug_assert!(end > start);
        Self {
            start,
            end,
            kind: ExtentKind::Contiguous,
        }
    }

    pub fn orphan(start: usize, end: usize) -> Self {
        debug_assert!(end > start);
        Self {
            start,
            end,
            kind: ExtentKind::Orphan,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_orphan(&self) -> bool {
        self.kind == ExtentKind::Orphan
    }
}
