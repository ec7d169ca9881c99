use crate::model::body::{Line, Segments};

/// Classify one line of a body (without its `\n`).
///
/// A tilde line starts with `~`, then at least one whitespace character,
/// then at least one non-whitespace character. A trailing `\r` is treated as
/// part of the line ending.
pub fn classify_line(line: &str) -> Line<'_> {
    let text = line.strip_suffix('\r').unwrap_or(line);
    if let Some(rest) = text.strip_prefix('~') {
        let label = rest.trim_start_matches(char::is_whitespace);
        if label.len() < rest.len() && !label.trim().is_empty() {
            return Line::Tilde {
                raw: text,
                label: label.trim_end(),
            };
        }
    }
    Line::Content(line)
}

/// Iterate over the labels of all tilde lines, in body order.
pub fn tilde_labels(body: &str) -> impl Iterator<Item = &str> {
    body.split('\n').filter_map(|line| match classify_line(line) {
        Line::Tilde { label, .. } => Some(label),
        Line::Content(_) => None,
    })
}

/// Split a body into alternating content runs and tilde lines.
///
/// Content runs keep their lines verbatim (joined with `\n`), so an empty
/// run between two adjacent tilde lines is `""`.
pub fn parse_segments(body: &str) -> Segments {
    let mut contents = Vec::new();
    let mut tildes = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in body.split('\n') {
        match classify_line(line) {
            Line::Tilde { raw, .. } => {
                contents.push(current.join("\n"));
                current.clear();
                tildes.push(raw.to_string());
            }
            Line::Content(text) => current.push(text),
        }
    }
    contents.push(current.join("\n"));

    Segments { contents, tildes }
}
