pub mod activity;
pub mod config;
pub mod flow;
pub mod reconcile;
pub mod thread;
pub mod validate;
pub mod workspace;

pub use thread::*;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
