//! Domain logic for the grudge tracker: week bucketing, event logging,
//! the friend graph, and the visibility rules gating cross-user reads.
//!
//! Everything here is synchronous; callers on the async runtime wrap the
//! rusqlite-backed operations in `spawn_blocking`.

pub mod error;
pub mod events;
pub mod friends;
pub mod visibility;
pub mod week;

pub use error::{Error, Result};
