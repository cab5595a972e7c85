// ============================================================================
// Player Data Restore Library
// ============================================================================

//! Moves a player's saved state from their verified (online-mode) identity to
//! the offline identity an offline-mode host assigns them, and keeps their
//! skin alive across reconnects.
//!
//! # Examples
//!
//! ```no_run
//! use playerdata_restore::{control_channel, Identity, RestoreConfig, Restorer};
//!
//! # async fn run() -> playerdata_restore::Result<()> {
//! let (control, _host_loop) = control_channel();
//! let restorer = Restorer::from_config(RestoreConfig::new("/srv/minecraft/world"), control)?;
//!
//! let outcome = restorer.pre_connect("Notch", Identity::offline("Notch")).await;
//! println!("copied {} artifacts", outcome.copied());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod host;
pub mod mojang;
pub mod restore;
pub mod state;
pub mod storage;

// Re-export main types for convenience
pub use config::RestoreConfig;
pub use crate::core::{ArtifactKind, Identity, RestoreError, Result, TextureDescriptor};
pub use host::{ControlHandle, ControlLoop, Host, PlayerHandle, control_channel};
pub use mojang::{MojangClient, ProfileService, fetch_skin};
pub use restore::{
    CommandReply, MigrationStatus, RESTORE_ALL, RestoreOutcome, RestoreStage, Restorer,
    SweepEntry, SweepHandle, SweepReport, SweepStatus, Trigger,
};
pub use state::{RestorationTracker, SkinCache};
pub use storage::{DataStore, FileMigrator, NameDirectory, UserCache};
