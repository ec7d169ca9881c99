use std::ops::Range;

use regex::Regex;

use crate::model::body::Line;
use crate::model::post::{Post, PostId};
use crate::model::state::AppState;
use crate::parse::classify_line;

/// Which part of a post matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchField {
    Label,
    /// A brain dump item (0-based index among the post's tilde lines)
    Brain(usize),
    /// A prose line (0-based line number in the body)
    Body(usize),
}

/// A search hit inside one post
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub post_id: PostId,
    pub field: MatchField,
    /// The matched text: the label, brain item, or body line
    pub text: String,
    pub spans: Vec<Range<usize>>,
}

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search every post's label, brain dump items, and body lines.
pub fn search_posts(state: &AppState, re: &Regex) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for post in &state.posts {
        search_post(re, post, &mut hits);
    }
    hits
}

fn search_post(re: &Regex, post: &Post, hits: &mut Vec<SearchHit>) {
    let mut push = |field: MatchField, text: &str| {
        let spans = find_matches(re, text);
        if !spans.is_empty() {
            hits.push(SearchHit {
                post_id: post.id.clone(),
                field,
                text: text.to_string(),
                spans,
            });
        }
    };

    push(MatchField::Label, &post.label);

    let mut brain_index = 0;
    for (line_no, line) in post.body.split('\n').enumerate() {
        match classify_line(line) {
            Line::Tilde { label, .. } => {
                push(MatchField::Brain(brain_index), label);
                brain_index += 1;
            }
            Line::Content(text) => push(MatchField::Body(line_no), text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> AppState {
        AppState {
            posts: vec![
                Post {
                    id: "p1".into(),
                    label: "Groceries".into(),
                    body: "Need food for the week.\n\n~ buy milk\n\n~ buy eggs\n".into(),
                },
                Post {
                    id: "p2".into(),
                    label: "Milk ideas".into(),
                    body: "A post about dairy.".into(),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_search_label() {
        let re = Regex::new("Groc").unwrap();
        let hits = search_posts(&sample_state(), &re);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].post_id, PostId::from("p1"));
        assert_eq!(hits[0].field, MatchField::Label);
        assert_eq!(hits[0].spans, vec![0..4]);
    }

    #[test]
    fn test_search_brain_items_use_item_index() {
        let re = Regex::new("eggs").unwrap();
        let hits = search_posts(&sample_state(), &re);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].field, MatchField::Brain(1));
        assert_eq!(hits[0].text, "buy eggs");
    }

    #[test]
    fn test_search_body_lines_skip_tildes() {
        let re = Regex::new("food|dairy").unwrap();
        let hits = search_posts(&sample_state(), &re);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].field, MatchField::Body(0));
        assert_eq!(hits[1].post_id, PostId::from("p2"));
        assert_eq!(hits[1].field, MatchField::Body(0));
    }

    #[test]
    fn test_search_case_insensitive_across_posts() {
        let re = Regex::new("(?i)milk").unwrap();
        let hits = search_posts(&sample_state(), &re);
        let fields: Vec<_> = hits.iter().map(|h| h.field.clone()).collect();
        assert_eq!(fields, vec![MatchField::Brain(0), MatchField::Label]);
    }

    #[test]
    fn test_search_no_hits() {
        let re = Regex::new("nothing-here").unwrap();
        assert!(search_posts(&sample_state(), &re).is_empty());
    }
}
