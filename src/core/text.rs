// src/core/text.rs

/// Collapse runs of whitespace (incl. NBSP) into single spaces and trim.
pub fn collapse_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() || ch == '\u{a0}' {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Drop the grouping separators sites put inside large numbers:
/// "1 200" / "1\u{a0}200" → "1200".
pub fn sweep_digit_groups(s: &str) -> String {
    s.chars().filter(|c| *c != ' ' && *c != '\u{a0}').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_ws_handles_nbsp_runs() {
        assert_eq!(collapse_ws("  1\u{a0}200   so'm \n"), "1 200 so'm");
    }

    #[test]
    fn sweep_keeps_punctuation() {
        assert_eq!(sweep_digit_groups("3\u{a0}906.25"), "3906.25");
        assert_eq!(sweep_digit_groups("1 200 000"), "1200000");
    }
}
