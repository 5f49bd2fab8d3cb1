#![no_main]

use libfuzzer_sys::fuzz_target;
use stpd_bench::bench::{Metric, RI_LOCATE_V1, STPD_LOCATE_V1};

fuzz_target!(|data: &str| {
    // Tool output is untrusted: parsing may fail but never panic
    for schema in [&STPD_LOCATE_V1, &RI_LOCATE_V1] {
        if let Ok(values) = schema.parse(data) {
            for metric in Metric::ALL {
                let _ = values.get(metric);
            }
        }
    }
});
