//! Domain layer tests
//!
//! Entities, the pattern scanner, fragment assembly, scoring and the
//! signature catalog.

use proptest::prelude::*;
use proptest::test_runner::{Config, RngAlgorithm, TestRng, TestRunner};
use proptest::strategy::ValueTree;
use rstest::*;
use sigcarve::domain::entities::{CatalogEntry, Extent, ManifestRecord, SignatureDescriptor};
use sigcarve::domain::services::{
    entropy, merge_orphans, FragmentAssembler, IntegrityScorer, PatternScanner, ScoringPolicy,
    SearchBackend, SignatureCatalog,
};

fn descriptor(entry: CatalogEntry) -> SignatureDescriptor {
    SignatureDescriptor::from_entry(0, &entry).unwrap()
}

// ============================================================================
// PatternScanner Tests
// ============================================================================

#[rstest]
#[case(b"aaaa".as_slice(), b"aa".as_slice(), vec![0, 1, 2])]
#[case(b"abcabcab".as_slice(), b"abc".as_slice(), vec![0, 3])]
#[case(b"".as_slice(), b"PK".as_slice(), vec![])]
#[case(b"MZ".as_slice(), b"MZ\x90\x00".as_slice(), vec![])]
#[case(b"..%%EOF".as_slice(), b"%%EOF".as_slice(), vec![2])]
fn test_find_all_both_backends(
    #[case] haystack: &[u8],
    #[case] needle: &[u8],
    #[case] expected: Vec<usize>,
    #[values(SearchBackend::Accelerated, SearchBackend::Portable)] backend: SearchBackend,
) {
    let scanner = PatternScanner::new(backend);
    assert_eq!(scanner.find_all(haystack, needle), expected);
}

proptest! {
    #[test]
    fn backends_agree(
        haystack in prop::collection::vec(0u8..4, 0..2048),
        needle in prop::collection::vec(0u8..4, 1..4),
    ) {
        let accelerated = PatternScanner::new(SearchBackend::Accelerated).find_all(&haystack, &needle);
        let portable = PatternScanner::portable().find_all(&haystack, &needle);
        prop_assert_eq!(accelerated, portable);
    }

    #[test]
    fn find_all_offsets_are_true_matches(
        haystack in prop::collection::vec(0u8..3, 0..512),
        needle in prop::collection::vec(0u8..3, 1..3),
    ) {
        let offsets = PatternScanner::default().find_all(&haystack, &needle);
        for window in offsets.windows(2) {
            prop_assert!(window[0] < window[1]);
        }
        for &pos in &offsets {
            prop_assert_eq!(&haystack[pos..pos + needle.len()], needle.as_slice());
        }
        let expected = haystack
            .windows(needle.len())
            .filter(|w| *w == needle.as_slice())
            .count();
        prop_assert_eq!(offsets.len(), expected);
    }
}

// ============================================================================
// FragmentAssembler Tests
// ============================================================================

#[rstest]
fn test_contiguous_and_orphans_together() {
    let hay = b"HDR-one-END....HDR-two....HDR-three";
    let scanner = PatternScanner::default();
    let headers = scanner.find_all(hay, b"HDR");
    let extents = FragmentAssembler::new(&scanner, 1).assemble(hay, b"HDR", Some(b"END"), &headers);

    assert_eq!(extents[0], Extent::contiguous(0, 11));
    // The two footer-less headers touch, so they merge into one orphan.
    assert_eq!(extents[1], Extent::orphan(15, hay.len()));
    assert_eq!(extents.len(), 2);
}

#[rstest]
#[case(9, 2)]
#[case(10, 2)]
#[case(11, 1)]
fn test_merge_threshold_is_strict(#[case] threshold: u64, #[case] expected: usize) {
    let orphans = [Extent::orphan(0, 50), Extent::orphan(60, 90)];
    assert_eq!(merge_orphans(&orphans, threshold).len(), expected);
}

proptest! {
    #[test]
    fn merged_orphans_respect_gap_rule(
        gaps in prop::collection::vec((0usize..64, 1usize..64), 1..20),
        threshold in 0u64..80,
    ) {
        let mut orphans = Vec::new();
        let mut cursor = 0usize;
        for (gap, len) in gaps {
            let start = cursor + gap;
            orphans.push(Extent::orphan(start, start + len));
            cursor = start + len;
        }

        let merged = merge_orphans(&orphans, threshold);
        prop_assert_eq!(merged[0].start, orphans[0].start);
        prop_assert_eq!(merged[merged.len() - 1].end, orphans[orphans.len() - 1].end);
        for pair in merged.windows(2) {
            prop_assert!((pair[1].start - pair[0].end) as u64 >= threshold);
        }
    }
}

// ============================================================================
// Entropy and IntegrityScorer Tests
// ============================================================================

proptest! {
    #[test]
    fn entropy_is_zero_iff_uniform(data in prop::collection::vec(any::<u8>(), 1..1024)) {
        let h = entropy(&data);
        prop_assert!((0.0..=8.0).contains(&h));
        let uniform = data.iter().all(|&b| b == data[0]);
        prop_assert_eq!(h == 0.0, uniform);
    }
}

#[rstest]
fn test_random_bytes_have_near_maximal_entropy() {
    let mut runner = TestRunner::new_with_rng(
        Config::default(),
        TestRng::deterministic_rng(RngAlgorithm::ChaCha),
    );
    let data = prop::collection::vec(any::<u8>(), 65536)
        .new_tree(&mut runner)
        .unwrap()
        .current();
    let h = entropy(&data);
    assert!((7.9..=8.0).contains(&h), "entropy {h}");
}

#[rstest]
#[case("jpg", 1024)]
#[case("JPEG", 1024)]
#[case("png", 1024)]
#[case("zip", 1024)]
#[case("pdf", 1024)]
#[case("gif", 512)]
#[case("7z", 256)]
fn test_default_size_floors(#[case] extension: &str, #[case] min_size: u64) {
    assert_eq!(ScoringPolicy::default().thresholds_for(extension).min_size, min_size);
}

#[rstest]
fn test_pdf_accepts_moderate_entropy() {
    let desc = descriptor(CatalogEntry::new("pdf", *b"%PDF").with_footer(*b"%%EOF"));
    let mut data = b"%PDF-1.7\n".to_vec();
    // 32 distinct symbols: 5 bits per byte.
    data.extend((0..2048).map(|i| b'@' + (i % 32) as u8));
    data.extend(b"%%EOF");

    let verdict = IntegrityScorer::default().evaluate(&data, &desc);
    assert!(verdict.entropy_ok, "entropy {}", verdict.entropy);
    assert!(verdict.accepted);
}

#[rstest]
fn test_low_entropy_jpeg_is_rejected() {
    let desc = descriptor(CatalogEntry::new("jpg", [0xFFu8, 0xD8]).with_footer([0xFFu8, 0xD9]));
    let mut data = vec![0xFF, 0xD8];
    data.extend(vec![0u8; 4096]);
    data.extend([0xFF, 0xD9]);

    let verdict = IntegrityScorer::default().evaluate(&data, &desc);
    assert!(!verdict.entropy_ok);
    // header + footer = 0.8, still above the cut-off
    assert!(verdict.accepted);
    assert!((verdict.score - 0.8).abs() < 1e-9);
}

#[rstest]
fn test_stricter_threshold_rejects_header_footer_only() {
    let desc = descriptor(CatalogEntry::new("jpg", [0xFFu8, 0xD8]).with_footer([0xFFu8, 0xD9]));
    let mut data = vec![0xFF, 0xD8];
    data.extend(vec![0u8; 4096]);
    data.extend([0xFF, 0xD9]);

    let scorer = IntegrityScorer::new(ScoringPolicy::default().with_accept_threshold(0.9));
    assert!(!scorer.score(&data, &desc));
}

// ============================================================================
// SignatureCatalog and ManifestRecord Tests
// ============================================================================

#[rstest]
#[case("jpg", 1)]
#[case("gif", 2)]
#[case("macho", 4)]
#[case("swf", 3)]
fn test_builtin_catalog_counts(#[case] extension: &str, #[case] expected: usize) {
    let catalog = SignatureCatalog::builtin();
    let count = catalog
        .entries()
        .iter()
        .filter(|e| e.extension == extension)
        .count();
    assert_eq!(count, expected);
}

#[rstest]
fn test_record_validation_and_bounds() {
    let record = ManifestRecord::new(1, "jpg", 100, 50, 7.5);
    assert!(record.validate().is_ok());
    assert!(record.fits_within(150));
    assert!(!record.fits_within(149));
    assert!(!ManifestRecord::new(1, "jpg", u64::MAX, 2, 7.5).fits_within(u64::MAX));
}
