use serde::{Deserialize, Serialize};

use crate::model::post::{Post, PostId};
use crate::model::state::AppState;
use crate::ops::brain_ops;

/// Every state change goes through one of these.
///
/// Serialized as `{"type": "ADD_POST", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Create a post and select it
    AddPost { label: String },
    /// Select a post. The id is not validated.
    SelectPost {
        id: PostId,
        #[serde(default)]
        immediate: bool,
    },
    /// Remove a post, moving the selection to the last remaining post if needed
    DeletePost { id: PostId },
    /// Replace the selected post's body
    UpdateBody {
        body: String,
        #[serde(default)]
        immediate: bool,
    },
    /// Set (`Some`) or toggle (`None`) no-disturb mode
    NoDisturb {
        #[serde(default)]
        value: Option<bool>,
    },
    /// Append a `~ label` line to the selected post's body
    AddBrain { label: String },
}

impl Action {
    /// Wire name of the action, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Action::AddPost { .. } => "ADD_POST",
            Action::SelectPost { .. } => "SELECT_POST",
            Action::DeletePost { .. } => "DELETE_POST",
            Action::UpdateBody { .. } => "UPDATE_BODY",
            Action::NoDisturb { .. } => "NO_DISTURB",
            Action::AddBrain { .. } => "ADD_BRAIN",
        }
    }
}

/// Compute the next state. Pure: `state` is never modified, and actions
/// that cannot apply (blank label, nothing selected) return an equal copy.
pub fn apply(state: &AppState, action: Action) -> AppState {
    match action {
        Action::AddPost { label } => add_post(state, &label),
        Action::SelectPost { id, immediate } => AppState {
            posts: state.posts.clone(),
            selected_post_id: Some(id),
            no_disturb: state.no_disturb,
            immediate,
        },
        Action::DeletePost { id } => delete_post(state, &id),
        Action::UpdateBody { body, immediate } => {
            match with_selected_body(state, |_| Some(body)) {
                Some(posts) => AppState {
                    posts,
                    selected_post_id: state.selected_post_id.clone(),
                    no_disturb: state.no_disturb,
                    immediate,
                },
                None => state.clone(),
            }
        }
        Action::NoDisturb { value } => AppState {
            posts: state.posts.clone(),
            selected_post_id: state.selected_post_id.clone(),
            no_disturb: value.unwrap_or(!state.no_disturb),
            immediate: state.immediate,
        },
        Action::AddBrain { label } => {
            match with_selected_body(state, |body| brain_ops::append(body, &label).ok()) {
                Some(posts) => AppState {
                    posts,
                    selected_post_id: state.selected_post_id.clone(),
                    no_disturb: state.no_disturb,
                    immediate: true,
                },
                None => state.clone(),
            }
        }
    }
}

fn add_post(state: &AppState, label: &str) -> AppState {
    if label.trim().is_empty() {
        return state.clone();
    }
    let post = Post::new(label);
    let id = post.id.clone();
    let mut posts = state.posts.clone();
    posts.push(post);
    AppState {
        posts,
        selected_post_id: Some(id),
        no_disturb: state.no_disturb,
        immediate: state.immediate,
    }
}

fn delete_post(state: &AppState, id: &PostId) -> AppState {
    let posts: Vec<Post> = state.posts.iter().filter(|p| &p.id != id).cloned().collect();

    let selected_post_id = if state.selected_post_id.as_ref() == Some(id) {
        posts.last().map(|p| p.id.clone())
    } else {
        state.selected_post_id.clone()
    };

    AppState {
        posts,
        selected_post_id,
        no_disturb: state.no_disturb,
        immediate: state.immediate,
    }
}

/// Copy the posts with the selected post's body replaced by `edit(body)`.
/// Returns `None` when nothing valid is selected or `edit` declines.
fn with_selected_body<F>(state: &AppState, edit: F) -> Option<Vec<Post>>
where
    F: FnOnce(&str) -> Option<String>,
{
    let selected = state.selected_post_id.as_ref()?;
    let idx = state.posts.iter().position(|p| &p.id == selected)?;
    let body = edit(&state.posts[idx].body)?;

    let mut posts = state.posts.clone();
    posts[idx].body = body;
    Some(posts)
}
