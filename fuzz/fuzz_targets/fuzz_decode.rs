// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fuzz target for text decoding with fallback

#![no_main]

use fmk_core::encoding::TextDecoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let decoder = TextDecoder::default();
    if let Some(decoded) = decoder.decode(data) {
        if std::str::from_utf8(data).is_ok() {
            assert_eq!(decoded.encoding, "utf-8");
            assert_eq!(decoded.content.as_bytes(), data);
        }
    }
});
