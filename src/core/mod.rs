//! Core lifecycle types.
//!
//! This module contains the pure, storage-free vocabulary shared by every
//! entity kind:
//! - State definitions via the `State` trait
//! - The `state_enum!` macro that generates them
//!
//! Nothing here performs I/O.

mod macros;
mod state;

pub use state::{State, UnknownState};
