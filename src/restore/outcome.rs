use crate::core::{Identity, TextureDescriptor};
use std::fmt;

/// Entry point that started a restore attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    PreConnect,
    Join,
    Sweep,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::PreConnect => "pre-connect",
            Trigger::Join => "join",
            Trigger::Sweep => "sweep",
        })
    }
}

/// Pipeline states, in the order a successful attempt visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStage {
    Start,
    Resolving,
    NotFound,
    Resolved,
    Migrating,
    NoArtifacts,
    Migrated,
    FetchingSkin,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationStatus {
    /// No verified identity, so nothing was tried.
    NotAttempted,
    /// The verified identity is the identity itself.
    SameIdentity,
    /// Already restored earlier in this process.
    AlreadyRestored,
    NoArtifacts,
    Migrated(usize),
    Failed(String),
}

impl MigrationStatus {
    pub fn copied(&self) -> usize {
        match self {
            MigrationStatus::Migrated(count) => *count,
            _ => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MigrationStatus::Failed(_))
    }
}

/// Everything one restore attempt did.
#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    pub trigger: Trigger,
    pub identity: Identity,
    pub username: String,
    pub verified: Option<Identity>,
    pub migration: MigrationStatus,
    /// This attempt was the first to mark the identity restored.
    pub newly_restored: bool,
    pub disconnected: bool,
    /// Skin fetched and cached by this attempt.
    pub skin: Option<TextureDescriptor>,
    /// Message meant for the player, if any.
    pub notice: Option<String>,
    pub stages: Vec<RestoreStage>,
}

impl RestoreOutcome {
    pub(crate) fn start(trigger: Trigger, identity: Identity, username: &str) -> Self {
        Self {
            trigger,
            identity,
            username: username.to_string(),
            verified: None,
            migration: MigrationStatus::NotAttempted,
            newly_restored: false,
            disconnected: false,
            skin: None,
            notice: None,
            stages: vec![RestoreStage::Start],
        }
    }

    pub(crate) fn enter(&mut self, stage: RestoreStage) {
        self.stages.push(stage);
    }

    pub fn final_stage(&self) -> RestoreStage {
        self.stages.last().copied().unwrap_or(RestoreStage::Start)
    }

    pub fn copied(&self) -> usize {
        self.migration.copied()
    }
}
