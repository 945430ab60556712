//! Pure data structures shared by the cache actors, the typed clients and the run context.

pub mod handle;
pub mod kind;
pub mod label;
pub mod scope;

pub use handle::*;
pub use kind::*;
pub use label::*;
pub use scope::*;
