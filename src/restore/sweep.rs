//! Bulk restore over every identity in the data store.

use super::orchestrator::Restorer;
use super::outcome::{MigrationStatus, RestoreOutcome, Trigger};
use crate::core::{Identity, RestoreError, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepStatus {
    /// The store has no name on record for the identity.
    NoName,
    Unresolved,
    AlreadyRestored,
    NothingToRestore,
    Restored { copied: usize, disconnected: bool },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SweepEntry {
    pub identity: Identity,
    pub username: Option<String>,
    pub status: SweepStatus,
}

impl SweepEntry {
    fn from_outcome(outcome: &RestoreOutcome) -> Self {
        let status = match &outcome.migration {
            MigrationStatus::NotAttempted => SweepStatus::Unresolved,
            MigrationStatus::AlreadyRestored => SweepStatus::AlreadyRestored,
            MigrationStatus::SameIdentity | MigrationStatus::NoArtifacts => {
                SweepStatus::NothingToRestore
            }
            MigrationStatus::Migrated(copied) => SweepStatus::Restored {
                copied: *copied,
                disconnected: outcome.disconnected,
            },
            MigrationStatus::Failed(reason) => SweepStatus::Failed(reason.clone()),
        };
        Self {
            identity: outcome.identity,
            username: Some(outcome.username.clone()),
            status,
        }
    }
}

/// Per-identity results of one sweep.
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entries: Vec<SweepEntry>,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn restored(&self) -> usize {
        self.count(|status| matches!(status, SweepStatus::Restored { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, SweepStatus::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.total() - self.restored() - self.failed()
    }

    pub fn entry(&self, identity: &Identity) -> Option<&SweepEntry> {
        self.entries.iter().find(|entry| &entry.identity == identity)
    }

    fn count(&self, predicate: impl Fn(&SweepStatus) -> bool) -> usize {
        self.entries.iter().filter(|entry| predicate(&entry.status)).count()
    }
}

/// A running sweep.
pub struct SweepHandle {
    total: usize,
    handle: JoinHandle<SweepReport>,
}

impl SweepHandle {
    /// Number of identities the sweep was started with.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Result<SweepReport> {
        Ok(self.handle.await?)
    }
}

impl Restorer {
    /// Starts a sweep over every identity with a player-state file.
    ///
    /// Only the store listing happens before this returns, so the caller
    /// hears about an unreadable store; it is a single directory read and is
    /// safe on the host control context. Refreshing the name records and the
    /// per-identity work run in the background, each identity on its own task.
    pub fn start_sweep(&self) -> Result<SweepHandle> {
        let identities = self.store().list_identities()?;
        let total = identities.len();
        info!(total, "starting restore sweep");

        let this = self.clone();
        let handle = self.runtime().spawn(async move {
            let started_at = Utc::now();
            this.refresh_names().await;

            let tasks: Vec<JoinHandle<SweepEntry>> = identities
                .iter()
                .map(|&identity| {
                    let worker = this.clone();
                    tokio::spawn(async move { worker.sweep_one(identity).await })
                })
                .collect();

            let entries = join_all(tasks)
                .await
                .into_iter()
                .zip(identities)
                .map(|(joined, identity)| {
                    joined.unwrap_or_else(|err| SweepEntry {
                        identity,
                        username: None,
                        status: SweepStatus::Failed(RestoreError::from(err).to_string()),
                    })
                })
                .collect();

            let report = SweepReport {
                started_at,
                finished_at: Utc::now(),
                entries,
            };
            info!(
                total = report.total(),
                restored = report.restored(),
                failed = report.failed(),
                "restore sweep complete"
            );
            report
        });

        Ok(SweepHandle { total, handle })
    }

    async fn refresh_names(&self) {
        let names = self.names().clone();
        let refreshed = tokio::task::spawn_blocking(move || names.refresh())
            .await
            .map_err(RestoreError::from)
            .and_then(|result| result);
        if let Err(err) = refreshed {
            warn!(error = %err, "could not refresh name records; using what is loaded");
        }
    }

    async fn sweep_one(&self, identity: Identity) -> SweepEntry {
        let Some(username) = self.names().name_of(&identity) else {
            info!(%identity, "no name on record; skipping");
            return SweepEntry {
                identity,
                username: None,
                status: SweepStatus::NoName,
            };
        };

        let outcome = self.run_pipeline(Trigger::Sweep, &username, identity).await;
        SweepEntry::from_outcome(&outcome)
    }
}
