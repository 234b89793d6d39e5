//! Display-width aware string helpers.

use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Cut `text` to at most `max_width` terminal columns, ending in `...` when
/// anything was removed.
pub fn truncate(text: &str, max_width: usize) -> Cow<'_, str> {
    if text.width() <= max_width {
        return Cow::Borrowed(text);
    }
    if max_width <= ELLIPSIS.len() {
        return Cow::Owned(".".repeat(max_width));
    }

    let budget = max_width - ELLIPSIS.len();
    let mut out = String::with_capacity(budget + ELLIPSIS.len());
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push_str(ELLIPSIS);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_untouched() {
        assert!(matches!(truncate("ls -la", 10), Cow::Borrowed("ls -la")));
        assert_eq!(truncate("abcdef", 6), "abcdef");
    }

    #[test]
    fn test_long_text_gets_ellipsis() {
        assert_eq!(truncate("git commit -m 'message'", 10), "git com...");
        assert_eq!(truncate("abcdef", 2), "..");
    }

    #[test]
    fn test_wide_chars_count_double() {
        // each CJK char is two columns wide
        assert_eq!(truncate("日本語のコマンド", 9), "日本語...");
    }
}
