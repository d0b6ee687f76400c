// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fuzz target for entry-name splitting and collision candidates

#![no_main]

use fmk_core::naming::{candidate_name, extension_of, split_name, validate_component};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let (stem, ext) = split_name(input);
    assert_eq!(format!("{stem}{ext}"), input);
    assert!(ext.is_empty() || ext.starts_with('.'));
    let _ = extension_of(input);

    if validate_component(input).is_ok() {
        assert_eq!(candidate_name(input, true, 0), input);
        let first = candidate_name(input, true, 1);
        assert_ne!(first, input);
        assert!(validate_component(&first).is_ok());
        let dir = candidate_name(input, false, 7);
        assert_eq!(dir, format!("{input}_7"));
    }
});
