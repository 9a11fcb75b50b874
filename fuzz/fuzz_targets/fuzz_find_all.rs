#![no_main]

use libfuzzer_sys::fuzz_target;
use sigcarve::domain::services::{PatternScanner, SearchBackend};

// First byte picks the needle length, the rest is split into needle and haystack.
fuzz_target!(|data: &[u8]| {
    let Some((&len, rest)) = data.split_first() else {
        return;
    };
    let len = (len as usize % 8).min(rest.len());
    let (needle, haystack) = rest.split_at(len);

    let accelerated = PatternScanner::new(SearchBackend::Accelerated).find_all(haystack, needle);
    let portable = PatternScanner::portable().find_all(haystack, needle);
    assert_eq!(accelerated, portable);

    for &pos in &accelerated {
        assert_eq!(&haystack[pos..pos + needle.len()], needle);
    }
});
