#![no_main]

use libfuzzer_sys::fuzz_target;
use paper_aggregator::normalize::normalize_query;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let once = normalize_query(text);
        assert_eq!(normalize_query(&once), once, "normalization must be idempotent");
    }
});
