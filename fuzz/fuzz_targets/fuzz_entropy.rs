#![no_main]

use libfuzzer_sys::fuzz_target;
use sigcarve::domain::services::entropy;

fuzz_target!(|data: &[u8]| {
    let h = entropy(data);
    assert!((0.0..=8.0).contains(&h));
    if !data.is_empty() && data.iter().all(|&b| b == data[0]) {
        assert_eq!(h, 0.0);
    }
});
