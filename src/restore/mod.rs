pub mod command;
pub mod orchestrator;
pub mod outcome;
pub mod sweep;

pub use command::{CommandReply, RESTORE_ALL};
pub use orchestrator::Restorer;
pub use outcome::{MigrationStatus, RestoreOutcome, RestoreStage, Trigger};
pub use sweep::{SweepEntry, SweepHandle, SweepReport, SweepStatus};
