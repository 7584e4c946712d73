//! Concurrency helpers for interactive search

mod debounce;
mod guard;

pub use debounce::Debouncer;
pub use guard::LatestOnlyGuard;
