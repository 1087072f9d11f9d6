// ============================================================
// Layer 4 — Review Preprocessor
// ============================================================
// Cleans raw review bytes before segmentation.
//
// IMDB reviews are scraped HTML fragments. They contain:
//   - `<br /><br />` pairs marking paragraph breaks
//   - stray non-ASCII bytes (mis-encoded quotes, accents)
//   - mixed case
//
// Cleaning steps (applied in order):
//   1. Drop every non-ASCII byte (lossy, never fails)
//   2. Lowercase
//   3. Replace each `<br /><br />` marker with a newline
//
// Reference: Rust Book §8 (Strings in Rust)

/// The paragraph-break marker found in the raw corpus
pub const PARAGRAPH_BREAK: &str = "<br /><br />";

pub struct Preprocessor;

impl Preprocessor {
    /// Create a new Preprocessor instance
    pub fn new() -> Self {
        Self
    }

    /// Clean the raw bytes of one review file.
    pub fn clean_review(&self, raw: &[u8]) -> String {
        // ── Step 1: Keep ASCII bytes only ────────────────────────────────────
        // Every ASCII byte is a complete char, so this cannot fail.
        let ascii: String = raw
            .iter()
            .filter(|b| b.is_ascii())
            .map(|&b| char::from(b))
            .collect();

        // ── Steps 2 & 3: Lowercase, then collapse paragraph breaks ───────────
        ascii.to_ascii_lowercase().replace(PARAGRAPH_BREAK, "\n")
    }
}

/// Implement Default so Preprocessor can be created with Preprocessor::default()
impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        let p = Preprocessor::new();
        assert_eq!(p.clean_review(b"A GREAT Film"), "a great film");
    }

    #[test]
    fn test_paragraph_break_becomes_newline() {
        let p = Preprocessor::new();
        assert_eq!(
            p.clean_review(b"First part.<br /><br />Second part."),
            "first part.\nsecond part."
        );
    }

    #[test]
    fn test_uppercase_break_marker_is_also_replaced() {
        let p = Preprocessor::new();
        assert_eq!(p.clean_review(b"a<BR /><BR />b"), "a\nb");
    }

    #[test]
    fn test_non_ascii_bytes_are_dropped() {
        let p = Preprocessor::new();
        // "café" in UTF-8 followed by an invalid byte
        let raw = [b'c', b'a', b'f', 0xC3, 0xA9, b' ', 0xFF, b'!'];
        assert_eq!(p.clean_review(&raw), "caf !");
    }

    #[test]
    fn test_single_break_is_kept() {
        let p = Preprocessor::new();
        assert_eq!(p.clean_review(b"a<br />b"), "a<br />b");
    }

    #[test]
    fn test_empty_input() {
        let p = Preprocessor::new();
        assert_eq!(p.clean_review(b""), "");
    }
}
