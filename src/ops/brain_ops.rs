use crate::parse::{parse_segments, serialize_segments, tilde_labels};

/// Error type for brain dump operations
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BrainError {
    #[error("brain dump index out of range: {index} (have {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("brain dump label is empty")]
    EmptyLabel,
    #[error("brain dump label must be a single line")]
    MultilineLabel,
}

/// Labels of every tilde line in `body`, in order.
pub fn extract(body: &str) -> Vec<String> {
    tilde_labels(body).map(str::to_string).collect()
}

/// Move the brain dump item at `from` to `to`, carrying the content that
/// follows it along.
///
/// `to == None` (a cancelled drag) and `from == to` return `body` unchanged.
/// Otherwise the body is reassembled in canonical form: trimmed content runs
/// with one blank line around every tilde line.
pub fn move_item(body: &str, from: usize, to: Option<usize>) -> Result<String, BrainError> {
    let to = match to {
        Some(to) if to != from => to,
        _ => return Ok(body.to_string()),
    };

    let mut segments = parse_segments(body);
    let len = segments.tilde_count();
    for index in [from, to] {
        if index >= len {
            return Err(BrainError::IndexOutOfRange { index, len });
        }
    }

    // Content run i+1 follows tilde i, so it travels with it
    reorder(&mut segments.tildes, from, to);
    reorder(&mut segments.contents, from + 1, to + 1);

    Ok(serialize_segments(&segments))
}

/// Append a tilde line for `label` so that it always starts its own line.
pub fn append(body: &str, label: &str) -> Result<String, BrainError> {
    let label = normalize_label(label)?;

    if body.trim().is_empty() {
        return Ok(format!("~ {}\n\n", label));
    }
    if body.ends_with('\n') {
        Ok(format!("{}~ {}\n\n", body, label))
    } else {
        Ok(format!("{}\n\n~ {}\n\n", body, label))
    }
}

/// Trim a new brain dump label and reject ones that could not round-trip.
pub fn normalize_label(label: &str) -> Result<&str, BrainError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(BrainError::EmptyLabel);
    }
    if label.contains(['\n', '\r']) {
        return Err(BrainError::MultilineLabel);
    }
    Ok(label)
}

/// Remove the element at `from` and reinsert it at `to`.
fn reorder<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}
