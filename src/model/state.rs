use serde::{Deserialize, Serialize};

use super::post::{Post, PostId};

/// The whole application state. Persisted as one JSON record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// All posts in insertion (and display) order
    #[serde(default)]
    pub posts: Vec<Post>,
    /// The selected post, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_post_id: Option<PostId>,
    /// Distraction-free display mode
    #[serde(default)]
    pub no_disturb: bool,
    /// Set by structural edits that should be reflected without debounce.
    /// Never persisted.
    #[serde(skip)]
    pub immediate: bool,
}

impl AppState {
    pub fn selected_post(&self) -> Option<&Post> {
        let id = self.selected_post_id.as_ref()?;
        self.posts.iter().find(|p| &p.id == id)
    }

    pub fn find_post(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|p| &p.id == id)
    }

    /// Body of the selected post, or `None` if nothing (valid) is selected
    pub fn selected_body(&self) -> Option<&str> {
        self.selected_post().map(|p| p.body.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let state = AppState::default();
        assert!(state.posts.is_empty());
        assert!(state.selected_post_id.is_none());
        assert!(!state.no_disturb);
        assert!(!state.immediate);
    }

    #[test]
    fn test_minimal_record_deserializes() {
        let state: AppState = serde_json::from_str(r#"{"posts":[]}"#).unwrap();
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn test_record_uses_camel_case_keys() {
        let state = AppState {
            posts: vec![Post {
                id: "p1".into(),
                label: "Ideas".into(),
                body: "~ one".into(),
            }],
            selected_post_id: Some("p1".into()),
            no_disturb: true,
            immediate: true,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"selectedPostId\":\"p1\""));
        assert!(json.contains("\"noDisturb\":true"));
        assert!(!json.contains("immediate"));
    }

    #[test]
    fn test_selected_post_ignores_dangling_id() {
        let state = AppState {
            selected_post_id: Some("ghost".into()),
            ..Default::default()
        };
        assert!(state.selected_post().is_none());
        assert!(state.selected_body().is_none());
    }
}
