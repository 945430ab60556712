//! Run lifecycle: shared resources, the run-wide harness and per-suite contexts.

pub mod harness;
pub mod run_context;
pub mod shared_resources;
pub mod tracing;

pub use harness::*;
pub use run_context::*;
pub use shared_resources::*;
pub use self::tracing::*;
