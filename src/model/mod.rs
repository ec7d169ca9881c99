pub mod body;
pub mod config;
pub mod post;
pub mod state;

pub use body::*;
pub use config::*;
pub use post::*;
pub use state::*;
