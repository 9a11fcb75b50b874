//! Pattern scanner
//!
//! Finds every start offset of a needle in a haystack, overlapping
//! matches included: after a hit at `p` the search resumes at `p + 1`,
//! so `"aa"` in `"aaaa"` yields `[0, 1, 2]`.
//!
//! Two interchangeable backends sit behind the same interface. The
//! accelerated one uses `memchr::memmem` (SIMD substring search over the
//! whole mapped extent) and is compiled in with the `fast-search`
//! feature. The portable one compares window by window from the previous
//! match's successor. Both produce identical offsets for every input.
//!
//! Neither backend allocates in proportion to the haystack; [`FindAll`]
//! yields offsets lazily.

#[cfg(feature = "fast-search")]
use memchr::memmem;
use tracing::debug;

/// Which substring search implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchBackend {
    /// `memchr::memmem`, falls back to `Portable` when compiled out
    #[default]
    Accelerated,
    /// Window-by-window comparison
    Portable,
}

impl SearchBackend {
    /// Whether the accelerated backend was compiled in
    pub const fn accelerated_available() -> bool {
        cfg!(feature = "fast-search")
    }
}

#[derive(Debug, Clone)]
pub struct PatternScanner {
    backend: SearchBackend,
}

impl PatternScanner {
    /// Creates a scanner for the requested backend.
    ///
    /// Asking for [`SearchBackend::Accelerated`] without the `fast-search`
    /// feature silently yields the portable scanner.
    pub fn new(requested: SearchBackend) -> Self {
        let backend = match requested {
            SearchBackend::Accelerated if !SearchBackend::accelerated_available() => {
                debug!("accelerated substring search not available, using portable scanner");
                SearchBackend::Portable
            }
            other => other,
        };
        Self { backend }
    }

    pub fn portable() -> Self {
        Self::new(SearchBackend::Portable)
    }

    /// The backend actually in use
    pub fn backend(&self) -> SearchBackend {
        self.backend
    }

    /// Returns all (overlapping) match offsets in ascending order
    pub fn find_all(&self, haystack: &[u8], needle: &[u8]) -> Vec<usize> {
        self.find_iter(haystack, needle).collect()
    }

    /// Lazily iterates all (overlapping) match offsets in ascending order
    pub fn find_iter<'h, 'n>(&self, haystack: &'h [u8], needle: &'n [u8]) -> FindAll<'h, 'n> {
        FindAll {
            haystack,
            matcher: Matcher::new(self.backend, needle),
            next_start: 0,
        }
    }

    /// First match at or after `from`
    pub fn find_from(&self, haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
        Matcher::new(self.backend, needle).find_at(haystack, from)
    }
}

impl Default for PatternScanner {
    fn default() -> Self {
        Self::new(SearchBackend::default())
    }
}

enum Matcher<'n> {
    #[cfg(feature = "fast-search")]
    Memmem(memmem::Finder<'n>),
    Portable(&'n [u8]),
}

impl<'n> Matcher<'n> {
    fn new(backend: SearchBackend, needle: &'n [u8]) -> Self {
        match backend {
            #[cfg(feature = "fast-search")]
            SearchBackend::Accelerated => Matcher::Memmem(memmem::Finder::new(needle)),
            _ => Matcher::Portable(needle),
        }
    }

    fn needle(&self) -> &[u8] {
        match self {
            #[cfg(feature = "fast-search")]
            Matcher::Memmem(finder) => finder.needle(),
            Matcher::Portable(needle) => *needle,
        }
    }

    fn find_at(&self, haystack: &[u8], start: usize) -> Option<usize> {
        let needle_len = self.needle().len();
        // An empty needle would match everywhere; no signature has one.
        if needle_len == 0 || start >= haystack.len() {
            return None;
        }
        let window = &haystack[start..];
        if needle_len > window.len() {
            return None;
        }

        let found = match self {
            #[cfg(feature = "fast-search")]
            Matcher::Memmem(finder) => finder.find(window),
            Matcher::Portable(needle) => window.windows(needle_len).position(|w| w == *needle),
        };
        found.map(|pos| pos + start)
    }
}

/// Iterator over overlapping match offsets, see [`PatternScanner::find_iter`]
pub struct FindAll<'h, 'n> {
    haystack: &'h [u8],
    matcher: Matcher<'n>,
    next_start: usize,
}

impl Iterator for FindAll<'_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match self.matcher.find_at(self.haystack, self.next_start) {
            Some(pos) => {
                self.next_start = pos + 1;
                Some(pos)
            }
            None => {
                self.next_start = self.haystack.len();
                None
            }
        }
    }
}
