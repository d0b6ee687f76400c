// SPDX-License-Identifier: AGPL-3.0-or-later
//! Text decoding with a single fallback encoding

use crate::error::{FmkError, FmkResult};
use encoding_rs::Encoding;

/// Decoded text and the label of the encoding that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub content: String,
    pub encoding: String,
}

/// Tries UTF-8 first, then one configured fallback encoding
#[derive(Debug, Clone, Copy)]
pub struct TextDecoder {
    fallback: &'static Encoding,
}

impl TextDecoder {
    /// Build a decoder from a WHATWG label such as `"gbk"` or `"shift_jis"`
    pub fn new(fallback_label: &str) -> FmkResult<Self> {
        let fallback = Encoding::for_label(fallback_label.trim().as_bytes()).ok_or_else(|| {
            FmkError::Config(format!("unknown fallback encoding: {fallback_label}"))
        })?;
        Ok(Self { fallback })
    }

    pub fn fallback_name(&self) -> &'static str {
        self.fallback.name()
    }

    /// Decode `bytes`, or `None` when neither encoding accepts them
    pub fn decode(&self, bytes: &[u8]) -> Option<Decoded> {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return Some(Decoded {
                content: text.to_owned(),
                encoding: "utf-8".to_string(),
            });
        }

        self.fallback
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| Decoded {
                content: text.into_owned(),
                encoding: self.fallback.name().to_lowercase(),
            })
    }
}

impl Default for TextDecoder {
    fn default() -> Self {
        Self { fallback: encoding_rs::GBK }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_first() {
        let decoded = TextDecoder::default().decode("héllo".as_bytes()).unwrap();
        assert_eq!(decoded.content, "héllo");
        assert_eq!(decoded.encoding, "utf-8");
    }

    #[test]
    fn test_gbk_fallback() {
        // "中文" in GBK
        let bytes = [0xD6, 0xD0, 0xCE, 0xC4];
        let decoded = TextDecoder::default().decode(&bytes).unwrap();
        assert_eq!(decoded.content, "中文");
        assert_eq!(decoded.encoding, "gbk");
    }

    #[test]
    fn test_undecodable() {
        assert!(TextDecoder::default().decode(&[0xFF, 0xFF]).is_none());
    }

    #[test]
    fn test_labels() {
        assert_eq!(TextDecoder::new("shift_jis").unwrap().fallback_name(), "Shift_JIS");
        assert!(matches!(TextDecoder::new("klingon"), Err(FmkError::Config(_))));
    }
}
