//! Core State trait for entity lifecycle states.
//!
//! Every status enumeration (vehicle, rental, task, ...) implements this
//! trait. The trait is what lets one generic engine serve all entity kinds
//! while keeping each kind's states a closed, compile-time checked set.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

/// A raw value did not name any state of the machine it was parsed for.
///
/// This is a programming or integration error (a stale client, a corrupted
/// row), never a user-facing validation failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown {machine} value: {value:?}")]
pub struct UnknownState {
    pub machine: &'static str,
    pub value: String,
}

/// Trait for lifecycle states.
///
/// All methods are pure. States are small `Copy` values; the wire form of a
/// state is its SCREAMING_SNAKE_CASE name as returned by [`State::name`].
///
/// Most implementations are generated by [`crate::state_enum!`].
///
/// # Example
///
/// ```rust
/// use fleet_lifecycle::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum DoorStatus {
///     Open,
///     Closed,
/// }
///
/// impl State for DoorStatus {
///     const MACHINE: &'static str = "DoorStatus";
///
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Open => "OPEN",
///             Self::Closed => "CLOSED",
///         }
///     }
///
///     fn all() -> &'static [Self] {
///         &[Self::Open, Self::Closed]
///     }
/// }
///
/// assert_eq!(DoorStatus::parse("CLOSED"), Ok(DoorStatus::Closed));
/// assert!(DoorStatus::parse("AJAR").is_err());
/// ```
pub trait State:
    Copy + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Name of the status enumeration, used in messages and audit rows.
    const MACHINE: &'static str;

    /// Wire name of this state.
    fn name(&self) -> &'static str;

    /// Every state of the enumeration, in declaration order.
    fn all() -> &'static [Self];

    /// Parse a wire name back into a state.
    fn parse(value: &str) -> Result<Self, UnknownState> {
        Self::all()
            .iter()
            .copied()
            .find(|state| state.name() == value)
            .ok_or_else(|| UnknownState {
                machine: Self::MACHINE,
                value: value.to_string(),
            })
    }
}
