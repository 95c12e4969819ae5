#![no_main]

use libfuzzer_sys::fuzz_target;
use paper_aggregator::sources::{parse_openalex_response, parse_semantic_scholar_response};

fuzz_target!(|data: &[u8]| {
    let _ = parse_semantic_scholar_response(data);
    let _ = parse_openalex_response(data);
});
