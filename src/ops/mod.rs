pub mod brain_ops;
pub mod post_ops;
pub mod reducer;
pub mod search;

pub use reducer::{Action, apply};
