#![no_main]

use libfuzzer_sys::fuzz_target;
use sigcarve::{CarveEngine, MemoryImage};

fuzz_target!(|data: &[u8]| {
    let engine = CarveEngine::with_default_catalog();
    if let Ok(result) = engine.scan(&MemoryImage::new(data)) {
        for record in result.records() {
            assert!(record.validate().is_ok());
            assert!(record.fits_within(data.len() as u64));
        }
    }
});
