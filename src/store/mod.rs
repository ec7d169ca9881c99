pub mod debounce;
#[allow(clippy::module_inception)]
pub mod store;

pub use debounce::Debouncer;
pub use store::{Store, StoreError, StoreSettings, TickOutcome};
