//! Offset and line helpers for match reporting.

/// 1-indexed line number of a byte offset within `text`.
pub fn line_at(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

/// The last `window` characters before byte `offset`.
pub fn preceding(text: &str, offset: usize, window: usize) -> &str {
    let head = &text[..offset.min(text.len())];
    if window == 0 {
        return "";
    }
    let start = head
        .char_indices()
        .rev()
        .nth(window - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &head[start..]
}

/// Collapse whitespace runs so multi-line matches fit on one report line.
pub fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_at_counts_newlines_before_offset() {
        let text = "a\nb\nc";
        assert_eq!(line_at(text, 0), 1);
        assert_eq!(line_at(text, 2), 2);
        assert_eq!(line_at(text, 4), 3);
        assert_eq!(line_at(text, 99), 3);
    }

    #[test]
    fn preceding_clamps_to_start() {
        assert_eq!(preceding("abcdef", 3, 10), "abc");
        assert_eq!(preceding("abcdef", 6, 2), "ef");
    }

    #[test]
    fn preceding_counts_characters_not_bytes() {
        let text = "aéé$wpdb";
        // offset 6 is after 'a', two 2-byte 'é' and '$'
        assert_eq!(preceding(text, 6, 3), "éé$");
        assert_eq!(preceding(text, 6, 10), "aéé$");
        assert_eq!(preceding(text, 6, 0), "");
    }

    #[test]
    fn one_line_collapses_whitespace() {
        assert_eq!(one_line("SELECT *\n\t\tFROM  t"), "SELECT * FROM t");
    }
}
