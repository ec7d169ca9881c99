use crate::model::body::Segments;

/// Reassemble segments into a body.
///
/// Each content run is trimmed and each tilde line gets exactly one blank
/// line before and after it. The assembled text is trimmed again.
pub fn serialize_segments(segments: &Segments) -> String {
    let mut out = String::new();
    for (i, content) in segments.contents.iter().enumerate() {
        out.push_str(trim_segment(content));
        if let Some(tilde) = segments.tildes.get(i) {
            out.push_str("\n\n");
            out.push_str(tilde);
            out.push_str("\n\n");
        }
    }
    trim_segment(&out).to_string()
}

/// Drop leading blank lines and trailing whitespace.
///
/// Indentation of the first non-blank line is kept: stripping it could turn
/// `  ~ note` into a tilde line.
pub fn trim_segment(s: &str) -> &str {
    let s = s.trim_end();
    let mut start = 0;
    for line in s.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        start += line.len();
    }
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::body_parser::parse_segments;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_trim_segment_blank_edges() {
        assert_eq!(trim_segment("\n\n  \nHello\nworld  \n\n"), "Hello\nworld");
        assert_eq!(trim_segment("   \n\t\n"), "");
        assert_eq!(trim_segment(""), "");
    }

    #[test]
    fn test_trim_segment_keeps_first_line_indent() {
        assert_eq!(trim_segment("\n  ~ quoted\n"), "  ~ quoted");
    }

    #[test]
    fn test_canonical_spacing_around_tildes() {
        let seg = parse_segments("Intro\n~ first\nMiddle\n~ second");
        assert_eq!(
            serialize_segments(&seg),
            "Intro\n\n~ first\n\nMiddle\n\n~ second"
        );
    }

    #[test]
    fn test_leading_tilde_is_not_preceded_by_blank_lines() {
        let seg = parse_segments("~ only\n\n");
        assert_eq!(serialize_segments(&seg), "~ only");
    }

    #[test]
    fn test_content_only_body_is_trimmed() {
        let seg = parse_segments("\n\nJust prose.\n\n");
        assert_eq!(serialize_segments(&seg), "Just prose.");
    }

    #[test]
    fn test_adjacent_tildes_keep_separators() {
        let seg = parse_segments("~ a\n~ b");
        assert_eq!(serialize_segments(&seg), "~ a\n\n\n\n~ b");
    }
}
