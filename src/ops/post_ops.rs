use crate::model::post::{Post, PostId};
use crate::model::state::AppState;

/// Error type for caller-side post checks
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PostError {
    #[error("post label is empty")]
    EmptyLabel,
    #[error("no post selected")]
    NoSelection,
    #[error("post not found: {0}")]
    NotFound(String),
}

/// Check a label before dispatching `AddPost`. Returns the trimmed label.
pub fn validate_label(label: &str) -> Result<&str, PostError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(PostError::EmptyLabel);
    }
    Ok(trimmed)
}

/// The selected post, failing if nothing (valid) is selected.
pub fn require_selection(state: &AppState) -> Result<&Post, PostError> {
    state.selected_post().ok_or(PostError::NoSelection)
}

/// Resolve a user reference to a post: an exact id, or a 1-based position.
pub fn resolve_post<'a>(state: &'a AppState, key: &str) -> Result<&'a Post, PostError> {
    let key = key.trim();
    if let Some(post) = state.find_post(&PostId::from(key)) {
        return Ok(post);
    }
    if let Ok(n) = key.parse::<usize>()
        && n >= 1
        && let Some(post) = state.posts.get(n - 1)
    {
        return Ok(post);
    }
    Err(PostError::NotFound(key.to_string()))
}

/// 1-based display position of a post
pub fn position_of(state: &AppState, id: &PostId) -> Option<usize> {
    state.posts.iter().position(|p| &p.id == id).map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> AppState {
        AppState {
            posts: vec![
                Post {
                    id: "aaa".into(),
                    label: "Shopping".into(),
                    body: String::new(),
                },
                Post {
                    id: "bbb".into(),
                    label: "Ideas".into(),
                    body: "~ one".into(),
                },
            ],
            selected_post_id: Some("bbb".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_label_trims() {
        assert_eq!(validate_label("  Ideas "), Ok("Ideas"));
        assert_eq!(validate_label(" \t "), Err(PostError::EmptyLabel));
    }

    #[test]
    fn test_require_selection_found() {
        let state = sample_state();
        assert_eq!(require_selection(&state).unwrap().label, "Ideas");
    }

    #[test]
    fn test_require_selection_missing() {
        let mut state = sample_state();
        state.selected_post_id = None;
        assert_eq!(require_selection(&state), Err(PostError::NoSelection));
        state.selected_post_id = Some("ghost".into());
        assert_eq!(require_selection(&state), Err(PostError::NoSelection));
    }

    #[test]
    fn test_resolve_by_id_and_position() {
        let state = sample_state();
        assert_eq!(resolve_post(&state, "bbb").unwrap().label, "Ideas");
        assert_eq!(resolve_post(&state, "1").unwrap().label, "Shopping");
        assert_eq!(
            resolve_post(&state, "3"),
            Err(PostError::NotFound("3".into()))
        );
        assert!(resolve_post(&state, "0").is_err());
    }

    #[test]
    fn test_position_is_one_based() {
        let state = sample_state();
        assert_eq!(position_of(&state, &"bbb".into()), Some(2));
        assert_eq!(position_of(&state, &"zzz".into()), None);
    }
}
