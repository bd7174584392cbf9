//! Precondition, postcondition, and invariant assertions.
//!
//! A contract violation is a programming error, never a recoverable
//! condition: it is logged through `tracing` and then panics. The
//! [`pre!`](crate::pre), [`post!`](crate::post), and [`cond!`](crate::cond)
//! macros only evaluate their condition when [`ENABLED`] is true, i.e. in
//! debug builds or with the `contracts` feature. Checks that guard memory
//! safety call [`violated`] directly and are never compiled out.

use std::fmt;
use std::panic::Location;

/// Whether the gated contract macros evaluate their conditions.
pub const ENABLED: bool = cfg!(any(debug_assertions, feature = "contracts"));

/// Which side of an operation a failed check belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractKind {
    /// Must hold on entry; the caller broke it.
    Precondition,
    /// Must hold on exit; the callee broke it.
    Postcondition,
    /// Must hold at an interior point.
    Invariant,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precondition => write!(f, "precondition"),
            Self::Postcondition => write!(f, "postcondition"),
            Self::Invariant => write!(f, "invariant"),
        }
    }
}

/// Report a contract violation and panic.
#[cold]
#[inline(never)]
#[track_caller]
pub fn violated(kind: ContractKind, condition: &'static str) -> ! {
    let location = Location::caller();
    tracing::error!(%kind, condition, %location, "contract violated");
    panic!("{kind} violated: `{condition}` at {location}");
}

/// Assert a precondition when contracts are enabled.
#[macro_export]
macro_rules! pre {
    ($cond:expr $(,)?) => {
        if $crate::contract::ENABLED && !($cond) {
            $crate::contract::violated(
                $crate::contract::ContractKind::Precondition,
                stringify!($cond),
            );
        }
    };
}

/// Assert a postcondition when contracts are enabled.
#[macro_export]
macro_rules! post {
    ($cond:expr $(,)?) => {
        if $crate::contract::ENABLED && !($cond) {
            $crate::contract::violated(
                $crate::contract::ContractKind::Postcondition,
                stringify!($cond),
            );
        }
    };
}

/// Assert an interior invariant when contracts are enabled.
#[macro_export]
macro_rules! cond {
    ($cond:expr $(,)?) => {
        if $crate::contract::ENABLED && !($cond) {
            $crate::contract::violated(
                $crate::contract::ContractKind::Invariant,
                stringify!($cond),
            );
        }
    };
}
