//! Administrative command surface.

use super::orchestrator::Restorer;
use super::sweep::SweepHandle;
use crate::core::{RestoreError, Result};
use tracing::warn;

/// Label of the bulk restore command.
pub const RESTORE_ALL: &str = "restoreall";

/// Immediate answer to a command, plus the sweep it started.
pub struct CommandReply {
    pub message: String,
    pub sweep: Option<SweepHandle>,
}

impl CommandReply {
    pub fn is_success(&self) -> bool {
        self.sweep.is_some()
    }
}

impl Restorer {
    /// Dispatches an administrative command by label.
    ///
    /// Returns `UnknownCommand` for labels this crate does not own so the host
    /// can pass them on.
    pub fn dispatch_command(&self, label: &str, args: &[&str]) -> Result<CommandReply> {
        if !label.eq_ignore_ascii_case(RESTORE_ALL) {
            return Err(RestoreError::UnknownCommand(label.to_string()));
        }
        if !args.is_empty() {
            return Ok(CommandReply {
                message: format!("Usage: /{}", RESTORE_ALL),
                sweep: None,
            });
        }

        Ok(match self.start_sweep() {
            Ok(sweep) => CommandReply {
                message: "Restore process initiated for all offline player files.".to_string(),
                sweep: Some(sweep),
            },
            Err(err) => {
                warn!(error = %err, "restoreall failed to start");
                CommandReply {
                    message: format!("Error during restoreall: {}", err),
                    sweep: None,
                }
            }
        })
    }
}
