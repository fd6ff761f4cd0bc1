//! Strips `//` line comments before a source string reaches the lexer.
//!
//! Grounded on `original_source/main.py`'s
//! `re.sub(r'//.*', '', source_code)`, re-expressed as a per-line scan for
//! the first `//` rather than pulling in a regex engine — `aeryz-bci`'s own
//! dependency set is `anyhow` only, and a substring search covers the same
//! ground.

/// Removes everything from the first `//` on each line to the end of that
/// line. A `//` inside what would otherwise be a string literal is not a
/// special case here: the language has no string literals.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for (i, line) in source.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match line.find("//") {
            Some(idx) => out.push_str(&line[..idx]),
            None => out.push_str(line),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_comment() {
        assert_eq!(strip_comments("x = 1; // set x"), "x = 1; ");
    }

    #[test]
    fn leaves_comment_free_lines_untouched() {
        assert_eq!(strip_comments("x = 1;\ny = 2;"), "x = 1;\ny = 2;");
    }

    #[test]
    fn strips_whole_line_comments_across_multiple_lines() {
        let source = "// header\nx = 1;\n// trailer\n";
        assert_eq!(strip_comments(source), "\nx = 1;\n\n");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(strip_comments(""), "");
    }
}
