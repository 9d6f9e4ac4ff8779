//! Token models: redacted secrets, freshly issued exchange results, and cached snapshots.

pub mod cached;
pub mod issued;
pub mod secret;

pub use cached::*;
pub use issued::*;
pub use secret::*;
