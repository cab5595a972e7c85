//! Boundary to the game host's session model.
//!
//! The host is single-threaded: everything that touches a live session goes
//! through [`ControlHandle`] and runs wherever the host drives its
//! [`ControlLoop`].

pub mod control;

pub use control::{ControlHandle, ControlLoop, control_channel};

use crate::core::{Identity, TextureDescriptor};

/// A connected player as handed to the connection-established hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerHandle {
    pub identity: Identity,
    pub username: String,
}

impl PlayerHandle {
    pub fn new(identity: Identity, username: impl Into<String>) -> Self {
        Self {
            identity,
            username: username.into(),
        }
    }
}

/// Live session operations. Only ever invoked on the host control context.
pub trait Host {
    fn is_online(&self, identity: &Identity) -> bool;

    /// Ends the session with a message shown on the disconnect screen.
    fn disconnect(&mut self, identity: &Identity, message: &str);

    fn send_message(&mut self, identity: &Identity, message: &str);

    /// Replaces the `textures` property on the player's profile.
    fn apply_skin(&mut self, identity: &Identity, descriptor: &TextureDescriptor);
}
