use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::post::Post;
use crate::model::state::AppState;
use crate::ops::search::{MatchField, SearchHit};
use crate::util::unicode::{pad_to_width, truncate_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct PostJson {
    pub position: usize,
    pub id: String,
    pub label: String,
    pub selected: bool,
    pub brain_count: usize,
}

#[derive(Serialize)]
pub struct PostDetailJson {
    pub id: String,
    pub label: String,
    pub body: String,
    pub brain: Vec<String>,
}

#[derive(Serialize)]
pub struct BrainItemJson {
    pub position: usize,
    pub label: String,
}

#[derive(Serialize)]
pub struct OverviewJson {
    pub posts: Vec<PostJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    pub brain: Vec<String>,
    pub no_disturb: bool,
}

#[derive(Serialize)]
pub struct SearchHitJson {
    pub post_id: String,
    pub label: String,
    pub field: String,
    pub text: String,
}

#[derive(Serialize)]
pub struct RecoveryEntryJson {
    pub timestamp: String,
    pub category: String,
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn post_to_json(state: &AppState, index: usize, post: &Post) -> PostJson {
    PostJson {
        position: index + 1,
        id: post.id.to_string(),
        label: post.label.clone(),
        selected: state.selected_post_id.as_ref() == Some(&post.id),
        brain_count: crate::ops::brain_ops::extract(&post.body).len(),
    }
}

pub fn posts_to_json(state: &AppState) -> Vec<PostJson> {
    state
        .posts
        .iter()
        .enumerate()
        .map(|(i, p)| post_to_json(state, i, p))
        .collect()
}

pub fn brain_to_json(items: &[String]) -> Vec<BrainItemJson> {
    items
        .iter()
        .enumerate()
        .map(|(i, label)| BrainItemJson {
            position: i + 1,
            label: label.clone(),
        })
        .collect()
}

pub fn recovery_entry_to_json(entry: &RecoveryEntry) -> RecoveryEntryJson {
    RecoveryEntryJson {
        timestamp: entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        category: entry.category.to_string(),
        description: entry.description.clone(),
        body: entry.body.clone(),
    }
}

pub fn field_name(field: &MatchField) -> String {
    match field {
        MatchField::Label => "label".to_string(),
        MatchField::Brain(i) => format!("brain:{}", i + 1),
        MatchField::Body(line) => format!("body:{}", line + 1),
    }
}

pub fn search_hit_to_json(hit: &SearchHit, label: &str) -> SearchHitJson {
    SearchHitJson {
        post_id: hit.post_id.to_string(),
        label: label.to_string(),
        field: field_name(&hit.field),
        text: hit.text.clone(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One line per post: marker, position, padded label, brain item count
pub fn format_post_list(state: &AppState, max_label_width: usize) -> Vec<String> {
    let labels: Vec<String> = state
        .posts
        .iter()
        .map(|p| truncate_to_width(&p.label, max_label_width))
        .collect();
    let width = labels
        .iter()
        .map(|l| crate::util::unicode::display_width(l))
        .max()
        .unwrap_or(0);

    state
        .posts
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(i, (post, label))| {
            let marker = if state.selected_post_id.as_ref() == Some(&post.id) {
                '>'
            } else {
                ' '
            };
            let count = crate::ops::brain_ops::extract(&post.body).len();
            let count_str = if count == 0 {
                String::new()
            } else {
                format!("  ~{}", count)
            };
            format!(
                "{} {:>2}. {}{}",
                marker,
                i + 1,
                pad_to_width(&label, width),
                count_str
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

/// Numbered brain dump, `  1. label`
pub fn format_brain(items: &[String]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, label)| format!("{:>3}. {}", i + 1, label))
        .collect()
}

/// Overview printed by a bare `bd`
pub fn format_overview(state: &AppState, brain: &[String], max_label_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if state.posts.is_empty() {
        lines.push("no posts yet (try `bd add <label>`)".to_string());
        return lines;
    }

    lines.extend(format_post_list(state, max_label_width));

    if let Some(post) = state.selected_post() {
        lines.push(String::new());
        lines.push(format!(
            "== {} ==",
            truncate_to_width(&post.label, max_label_width)
        ));
        if brain.is_empty() {
            lines.push("  (brain dump empty)".to_string());
        } else {
            lines.extend(format_brain(brain));
        }
    }

    if state.no_disturb {
        lines.push(String::new());
        lines.push("no-disturb: on".to_string());
    }
    lines
}

pub fn format_search_hit(hit: &SearchHit, label: &str, max_label_width: usize) -> String {
    format!(
        "[{}] {}: {}",
        truncate_to_width(label, max_label_width),
        field_name(&hit.field),
        hit.text
    )
}

pub fn format_recovery_entry(entry: &RecoveryEntry) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}: {}",
        entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        entry.category,
        entry.description
    )];
    for (key, value) in &entry.fields {
        lines.push(format!("  {}: {}", key, value));
    }
    for line in entry.body.lines() {
        lines.push(format!("  | {}", line));
    }
    lines
}
