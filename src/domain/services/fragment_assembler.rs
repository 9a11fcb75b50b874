//! Fragment assembler
//!
//! Turns the header offsets of one signature into candidate extents.
//!
//! - With a footer defined, each header is paired with the first footer
//!   occurrence at or after `header_end`. That footer may lie beyond a
//!   later header of the same signature; generic footers (a lone `;` or
//!   `}`) can therefore swallow bytes of a neighbouring candidate.
//! - A header with no footer (undefined, or none found) starts an orphan
//!   extent ending at the next header of the same signature, or at the
//!   end of the image.
//! - Orphans closer than the gap threshold are merged so that internal
//!   slack between fragments of one file does not split it.
//!
//! Extents are produced lazily from a header offset iterator with one
//! offset of lookahead, so nothing is buffered per header. A header with
//! no footer after it means no later header has one either, so orphans
//! always follow every contiguous extent: the output is the contiguous
//! extents in header order, then the merged orphans.

use crate::domain::entities::Extent;
use crate::domain::services::PatternScanner;
use std::iter::Peekable;
use tracing::trace;

/// One MiB, the distance under which adjacent orphans are merged
pub const DEFAULT_GAP_THRESHOLD: u64 = 1024 * 1024;

pub struct FragmentAssembler<'s> {
    scanner: &'s PatternScanner,
    gap_threshold: u64,
}

impl<'s> FragmentAssembler<'s> {
    pub fn new(scanner: &'s PatternScanner, gap_threshold: u64) -> Self {
        Self {
            scanner,
            gap_threshold,
        }
    }

    /// Lazily builds the extents for one signature.
    ///
    /// `header_offsets` must be ascending, as produced by
    /// [`PatternScanner::find_iter`] for `header` over `haystack`.
    pub fn extents<'a, I>(
        &self,
        haystack: &'a [u8],
        header: &[u8],
        footer: Option<&'a [u8]>,
        header_offsets: I,
    ) -> Extents<'s, 'a, I::IntoIter>
    where
        I: IntoIterator<Item = usize>,
    {
        Extents {
            scanner: self.scanner,
            haystack,
            header_len: header.len(),
            footer,
            headers: header_offsets.into_iter().peekable(),
            footers: FooterCursor::default(),
            pending: None,
            gap_threshold: self.gap_threshold,
            headers_seen: 0,
        }
    }

    /// Collects [`extents`](Self::extents) for a slice of header offsets
    pub fn assemble(
        &self,
        haystack: &[u8],
        header: &[u8],
        footer: Option<&[u8]>,
        header_offsets: &[usize],
    ) -> Vec<Extent> {
        self.extents(haystack, header, footer, header_offsets.iter().copied())
            .collect()
    }
}

/// Iterator returned by [`FragmentAssembler::extents`]
pub struct Extents<'s, 'a, I: Iterator<Item = usize>> {
    scanner: &'s PatternScanner,
    haystack: &'a [u8],
    header_len: usize,
    footer: Option<&'a [u8]>,
    headers: Peekable<I>,
    footers: FooterCursor,
    /// Orphan accumulator, still open for merging
    pending: Option<Extent>,
    gap_threshold: u64,
    headers_seen: usize,
}

impl<I: Iterator<Item = usize>> Extents<'_, '_, I> {
    /// Header offsets consumed so far
    pub fn headers_seen(&self) -> usize {
        self.headers_seen
    }

    fn pair_footer(&mut self, pos: usize) -> Option<usize> {
        let footer = self.footer?;
        self.footers
            .first_from(self.scanner, self.haystack, footer, pos + self.header_len)
            .map(|at| at + footer.len())
    }
}

impl<I: Iterator<Item = usize>> Iterator for Extents<'_, '_, I> {
    type Item = Extent;

    fn next(&mut self) -> Option<Extent> {
        while let Some(pos) = self.headers.next() {
            self.headers_seen += 1;

            if let Some(end) = self.pair_footer(pos) {
                return Some(Extent::contiguous(pos, end));
            }

            let end = self.headers.peek().copied().unwrap_or(self.haystack.len());
            let orphan = Extent::orphan(pos, end);
            let threshold = self.gap_threshold;
            let Some(current) = self.pending.as_mut() else {
                self.pending = Some(orphan);
                continue;
            };
            if gap(current, &orphan) < threshold {
                current.end = current.end.max(orphan.end);
            } else {
                return Some(std::mem::replace(current, orphan));
            }
        }

        let last = self.pending.take();
        if last.is_some() {
            trace!(headers = self.headers_seen, "header occurrences exhausted");
        }
        last
    }
}

fn gap(current: &Extent, next: &Extent) -> u64 {
    next.start.saturating_sub(current.end) as u64
}

/// Merges ascending orphan extents whose gap is strictly below `gap_threshold`.
///
/// A gap equal to the threshold keeps the extents apart; a threshold of
/// zero never merges.
pub fn merge_orphans(orphans: &[Extent], gap_threshold: u64) -> Vec<Extent> {
    let Some((first, rest)) = orphans.split_first() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    let mut current = *first;
    for next in rest {
        if gap(&current, next) < gap_threshold {
            current.end = current.end.max(next.end);
        } else {
            merged.push(current);
            current = *next;
        }
    }
    merged.push(current);
    merged
}

/// Remembers the last footer lookup so ascending header positions do not
/// rescan the same span: if the first footer at or after `s` is `f`, it is
/// also the first one for every `s'` in `s..=f`, and if there was none
/// after `s` there is none after any later `s'`.
#[derive(Default)]
struct FooterCursor {
    last: Option<(usize, Option<usize>)>,
}

impl FooterCursor {
    fn first_from(
        &mut self,
        scanner: &PatternScanner,
        haystack: &[u8],
        footer: &[u8],
        from: usize,
    ) -> Option<usize> {
        if let Some((searched_from, found)) = self.last {
            if from >= searched_from {
                match found {
                    None => return None,
                    Some(at) if at >= from => return Some(at),
                    Some(_) => {}
                }
            }
        }
        let found = scanner.find_from(haystack, footer, from);
        self.last = Some((from, found));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ExtentKind;

    fn assemble(hay: &[u8], header: &[u8], footer: Option<&[u8]>, gap: u64) -> Vec<Extent> {
        let scanner = PatternScanner::default();
        let headers = scanner.find_all(hay, header);
        FragmentAssembler::new(&scanner, gap).assemble(hay, header, footer, &headers)
    }

    #[test]
    fn header_footer_pair_is_contiguous() {
        let hay = b"..HDRpayloadEND..";
        let extents = assemble(hay, b"HDR", Some(b"END"), 0);
        assert_eq!(extents, vec![Extent::contiguous(2, 15)]);
    }

    #[test]
    fn no_headers_gives_nothing() {
        assert!(assemble(b"nothing here", b"HDR", Some(b"END"), 1024).is_empty());
    }

    #[test]
    fn single_header_without_footer_runs_to_eof() {
        let hay = b"xxHDRdata";
        let extents = assemble(hay, b"HDR", None, 0);
        assert_eq!(extents, vec![Extent::orphan(2, hay.len())]);
    }

    #[test]
    fn orphan_bounded_by_next_header() {
        let hay = b"HDRaaaaHDRbbbb";
        let extents = assemble(hay, b"HDR", None, 0);
        assert_eq!(extents, vec![Extent::orphan(0, 7), Extent::orphan(7, 14)]);
    }

    #[test]
    fn touching_orphans_merge_with_positive_threshold() {
        let hay = b"HDRaaaaHDRbbbb";
        let extents = assemble(hay, b"HDR", None, 1);
        assert_eq!(extents, vec![Extent::orphan(0, 14)]);
    }

    #[test]
    fn footer_search_starts_after_header() {
        // Header and footer share bytes; the footer must not overlap the header.
        let hay = b"ABAB....AB";
        let extents = assemble(hay, b"AB", Some(b"AB"), 0);
        assert_eq!(extents[0], Extent::contiguous(0, 4));
    }

    #[test]
    fn first_footer_may_cross_a_later_header() {
        let hay = b"HDR1111HDR2222END";
        let extents = assemble(hay, b"HDR", Some(b"END"), 0);
        assert_eq!(
            extents,
            vec![Extent::contiguous(0, 17), Extent::contiguous(7, 17)]
        );
    }

    #[test]
    fn headers_after_last_footer_become_orphans() {
        let hay = b"HDRxEND__HDRyyyy__HDRzz";
        let extents = assemble(hay, b"HDR", Some(b"END"), 0);
        assert_eq!(extents[0], Extent::contiguous(0, 7));
        assert_eq!(extents[1], Extent::orphan(9, 18));
        assert_eq!(extents[2], Extent::orphan(18, hay.len()));
        assert_eq!(extents[1].kind, ExtentKind::Orphan);
    }

    #[test]
    fn lazy_offsets_match_collected_offsets() {
        let hay = b"HDRaEND..HDRbb..HDRc....HDRd";
        let scanner = PatternScanner::default();
        let assembler = FragmentAssembler::new(&scanner, 3);
        let collected = scanner.find_all(hay, b"HDR");

        let mut lazy = assembler.extents(hay, b"HDR", Some(b"END"), scanner.find_iter(hay, b"HDR"));
        let streamed: Vec<_> = lazy.by_ref().collect();

        assert_eq!(lazy.headers_seen(), 4);
        assert_eq!(streamed, assembler.assemble(hay, b"HDR", Some(b"END"), &collected));
        assert_eq!(
            streamed,
            vec![Extent::contiguous(0, 7), Extent::orphan(9, hay.len())]
        );
    }

    #[test]
    fn orphans_follow_contiguous_extents() {
        let hay = b"HDRa..HDRbEND.HDRc..HDRd";
        let extents = assemble(hay, b"HDR", Some(b"END"), 1024);
        let kinds: Vec<_> = extents.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ExtentKind::Contiguous,
                ExtentKind::Contiguous,
                ExtentKind::Orphan,
            ]
        );
        assert_eq!(extents[2], Extent::orphan(14, hay.len()));
    }

    #[test]
    fn merge_respects_strict_threshold() {
        let orphans = [Extent::orphan(0, 100), Extent::orphan(110, 200)];
        assert_eq!(merge_orphans(&orphans, 10).len(), 2);
        assert_eq!(merge_orphans(&orphans, 11), vec![Extent::orphan(0, 200)]);
    }

    #[test]
    fn merge_chains_several_orphans() {
        let orphans = [
            Extent::orphan(0, 10),
            Extent::orphan(12, 20),
            Extent::orphan(25, 30),
            Extent::orphan(500, 600),
        ];
        assert_eq!(
            merge_orphans(&orphans, 8),
            vec![Extent::orphan(0, 30), Extent::orphan(500, 600)]
        );
    }
}
