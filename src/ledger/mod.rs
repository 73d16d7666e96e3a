pub mod debounce;
pub mod sweep;

pub use debounce::{DebouncedReconciler, Debouncer};
pub use sweep::Reconciler;
