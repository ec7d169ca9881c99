use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const TAB_WIDTH: usize = 4;
const ELLIPSIS: char = '\u{2026}';

/// Terminal cells taken by one grapheme cluster
fn cluster_width(g: &str) -> usize {
    if g == "\t" {
        TAB_WIDTH
    } else {
        UnicodeWidthStr::width(g)
    }
}

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(cluster_width).sum()
}

/// Cut `s` to at most `max_cells`, ending in `…` when anything was dropped.
/// Grapheme clusters are never split.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    let Some(budget) = max_cells.checked_sub(1) else {
        return String::new();
    };

    let mut used = 0;
    let mut out: String = s
        .graphemes(true)
        .take_while(|g| {
            used += cluster_width(g);
            used <= budget
        })
        .collect();
    out.push(ELLIPSIS);
    out
}

/// Right-pad with spaces to `cells` (unchanged if already as wide).
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let fill = cells.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(fill))
}
