//! Verification-code extraction rule. Pure, no I/O.
//!
//! A code is the first run of ASCII digits after the first marker occurrence.
//! Marker and digits may be separated by anything, line breaks included.

use crate::domain::ExtractedCode;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Marker phrase meaning "verification code".
pub const DEFAULT_MARKER: &str = "验证码";

/// Upper bound on the compiled rule, so an oversized marker is rejected
/// instead of compiling into a huge automaton.
const RULE_SIZE_LIMIT: usize = 1 << 20;

static DEFAULT_EXTRACTOR: LazyLock<CodeExtractor> =
    LazyLock::new(|| CodeExtractor::new(DEFAULT_MARKER).expect("valid default marker regex"));

/// Compiled extraction rule for one marker token.
#[derive(Debug, Clone)]
pub struct CodeExtractor {
    marker: String,
    pattern: Regex,
}

impl CodeExtractor {
    /// Build a rule for `marker`. The marker is matched literally.
    ///
    /// # Errors
    /// `regex::Error` if the compiled rule would exceed its size limit.
    pub fn new(marker: &str) -> Result<Self, regex::Error> {
        // Leftmost-first matching anchors on the first marker; the lazy gap
        // then stops at the first digit run, which `[0-9]+` takes whole.
        let source = format!(r"{}[\s\S]*?([0-9]+)", regex::escape(marker));
        let pattern = RegexBuilder::new(&source)
            .size_limit(RULE_SIZE_LIMIT)
            .build()?;
        Ok(Self {
            marker: marker.to_string(),
            pattern,
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn extract(&self, content: &str) -> ExtractedCode {
        let value = self
            .pattern
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
        ExtractedCode {
            raw: content.to_string(),
            value,
        }
    }
}

impl Default for CodeExtractor {
    fn default() -> Self {
        DEFAULT_EXTRACTOR.clone()
    }
}

/// Extract a verification code using the default marker.
pub fn extract_code(content: &str) -> Option<String> {
    DEFAULT_EXTRACTOR.extract(content).value
}
