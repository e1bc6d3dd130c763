//! # Fork Gate
//!
//! One-way state transition that closes registration.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: The gate is a value owned by the engine, not a global
//! - **One way**: `PreFork` moves to `Forked` once and never back
//! - **Fail fast**: Registrations after the fork are errors, never silently dropped
//!
//! ## Core Concepts
//!
//! Before the fork the host reads registrations from its main script
//! thread. After the fork the guest runs in a separate host-side execution
//! context, and the host cannot safely carry new commands, aliases, event
//! handlers, menus or output modifiers into it. Calls and callback
//! invocations stay legal in both states.
//!
//! ```
//! use fork_gate::{ForkGate, GateError, RegistrationKind};
//!
//! let mut gate = ForkGate::new();
//! assert!(gate.check(RegistrationKind::Command).is_ok());
//!
//! gate.fork().unwrap();
//! assert_eq!(gate.fork(), Err(GateError::DoubleFork));
//! assert_eq!(
//!     gate.check(RegistrationKind::Command),
//!     Err(GateError::PostForkRegistration { kind: RegistrationKind::Command })
//! );
//! ```

use std::fmt;
use thiserror::Error;

/// Gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Registrations are accepted
    PreFork,
    /// Terminal: registrations are rejected
    Forked,
}

/// Registration operations guarded by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationKind {
    Command,
    Alias,
    Event,
    Menu,
    Modifier,
}

impl fmt::Display for RegistrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegistrationKind::Command => "command",
            RegistrationKind::Alias => "alias",
            RegistrationKind::Event => "event handler",
            RegistrationKind::Menu => "menu",
            RegistrationKind::Modifier => "output modifier",
        };
        f.write_str(name)
    }
}

/// Gate violations
///
/// Both variants mean the caller is about to corrupt host-side state and
/// must be treated as bugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("tried to fork twice")]
    DoubleFork,

    #[error("cannot register {kind} after forking")]
    PostForkRegistration { kind: RegistrationKind },
}

/// The fork gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkGate {
    state: GateState,
}

impl ForkGate {
    /// Creates a gate in the `PreFork` state
    pub fn new() -> Self {
        Self {
            state: GateState::PreFork,
        }
    }

    /// Returns the current state
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Checks whether the fork has happened
    pub fn is_forked(&self) -> bool {
        self.state == GateState::Forked
    }

    /// Moves to `Forked`
    pub fn fork(&mut self) -> Result<(), GateError> {
        match self.state {
            GateState::PreFork => {
                self.state = GateState::Forked;
                Ok(())
            }
            GateState::Forked => Err(GateError::DoubleFork),
        }
    }

    /// Checks that a registration is still allowed
    pub fn check(&self, kind: RegistrationKind) -> Result<(), GateError> {
        match self.state {
            GateState::PreFork => Ok(()),
            GateState::Forked => Err(GateError::PostForkRegistration { kind }),
        }
    }
}

impl Default for ForkGate {
    fn default() -> Self {
        Self::new()
    }
}
