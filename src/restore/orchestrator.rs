//! Restore pipeline and its connection entry points.
//!
//! Every entry point funnels into [`Restorer::run_pipeline`]:
//!
//! ```text
//! Start -> Resolving -> NotFound                                     -> Done
//!                    -> Resolved -> Migrating -> NoArtifacts | Migrated
//!                                -> FetchingSkin                     -> Done
//! ```
//!
//! Resolution failures fail closed to `NotFound`. Migration and skin fetch
//! commit independently; neither undoes the other.

use super::outcome::{MigrationStatus, RestoreOutcome, RestoreStage, Trigger};
use crate::config::RestoreConfig;
use crate::core::{Identity, RestoreError, Result};
use crate::host::{ControlHandle, Host, PlayerHandle};
use crate::mojang::{MojangClient, ProfileService};
use crate::state::{RestorationTracker, SkinCache};
use crate::storage::{DataStore, FileMigrator, NameDirectory, UserCache};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Coordinates identity resolution, file migration and skin caching.
///
/// Cheap to clone; clones share caches, tracker and worker budget.
#[derive(Clone)]
pub struct Restorer {
    inner: Arc<Inner>,
}

/// Work left for the host control context once a pipeline has released its worker.
enum HostStep {
    Disconnect(String),
    Notify(String),
}

struct Inner {
    config: RestoreConfig,
    profiles: Arc<dyn ProfileService>,
    names: Arc<dyn NameDirectory>,
    migrator: FileMigrator,
    skins: Arc<SkinCache>,
    tracker: Arc<RestorationTracker>,
    control: ControlHandle,
    workers: Semaphore,
    runtime: Handle,
}

impl Restorer {
    /// Create a restorer with fresh caches
    ///
    /// Must be called inside a tokio runtime; work is spawned onto it.
    pub fn new(
        config: RestoreConfig,
        profiles: Arc<dyn ProfileService>,
        names: Arc<dyn NameDirectory>,
        control: ControlHandle,
    ) -> Result<Self> {
        Self::with_state(
            config,
            profiles,
            names,
            control,
            Arc::new(SkinCache::new()),
            Arc::new(RestorationTracker::new()),
        )
    }

    /// Create a restorer sharing existing caches
    pub fn with_state(
        config: RestoreConfig,
        profiles: Arc<dyn ProfileService>,
        names: Arc<dyn NameDirectory>,
        control: ControlHandle,
        skins: Arc<SkinCache>,
        tracker: Arc<RestorationTracker>,
    ) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current()
            .map_err(|e| RestoreError::Worker(format!("no tokio runtime: {}", e)))?;

        let migrator = FileMigrator::new(DataStore::new(&config.data_root));
        let workers = Semaphore::new(config.max_workers);

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                profiles,
                names,
                migrator,
                skins,
                tracker,
                control,
                workers,
                runtime,
            }),
        })
    }

    /// Create a restorer talking to the real services and reading the host's user cache
    pub fn from_config(config: RestoreConfig, control: ControlHandle) -> Result<Self> {
        let profiles = Arc::new(MojangClient::new(&config)?);
        let names = Arc::new(UserCache::load(config.resolved_user_cache_path())?);
        Self::new(config, profiles, names, control)
    }

    pub fn config(&self) -> &RestoreConfig {
        &self.inner.config
    }

    pub fn skin_cache(&self) -> &Arc<SkinCache> {
        &self.inner.skins
    }

    pub fn tracker(&self) -> &Arc<RestorationTracker> {
        &self.inner.tracker
    }

    pub fn store(&self) -> &DataStore {
        self.inner.migrator.store()
    }

    pub(crate) fn names(&self) -> &Arc<dyn NameDirectory> {
        &self.inner.names
    }

    pub(crate) fn runtime(&self) -> &Handle {
        &self.inner.runtime
    }

    /// Pre-connection check.
    ///
    /// Resolution and migration finish before this returns, so a host that
    /// loads player state on admission already sees the migrated files. No
    /// session exists yet, so nobody is disconnected; a migration failure is
    /// reported through `notice` for the host to show.
    pub async fn pre_connect(&self, username: &str, identity: Identity) -> RestoreOutcome {
        self.run_pipeline(Trigger::PreConnect, username, identity).await
    }

    /// [`pre_connect`](Self::pre_connect) for hosts calling from a plain thread.
    ///
    /// Must not be called from inside the runtime.
    pub fn pre_connect_blocking(&self, username: &str, identity: Identity) -> RestoreOutcome {
        self.inner
            .runtime
            .block_on(self.run_pipeline(Trigger::PreConnect, username, identity))
    }

    /// Connection-established hook, called on the host control context.
    ///
    /// Re-applies the cached skin right away, then schedules the restore
    /// attempt after the configured delay so it does not race the host's own
    /// load on connect.
    pub fn on_join(&self, host: &mut dyn Host, player: PlayerHandle) -> JoinHandle<RestoreOutcome> {
        if let Some(skin) = self.inner.skins.get(&player.identity) {
            info!(username = %player.username, "re-applying cached skin");
            host.apply_skin(&player.identity, &skin);
            host.send_message(&player.identity, &self.inner.config.skin_applied_message);
        }

        let this = self.clone();
        let delay = self.inner.config.join_delay;
        self.inner.runtime.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            this.run_pipeline(Trigger::Join, &player.username, player.identity)
                .await
        })
    }

    pub(crate) async fn run_pipeline(
        &self,
        trigger: Trigger,
        username: &str,
        identity: Identity,
    ) -> RestoreOutcome {
        let mut outcome = RestoreOutcome::start(trigger, identity, username);

        let follow_up = match self.inner.workers.acquire().await {
            Ok(permit) => {
                let follow_up = self.restore(trigger, username, &mut outcome).await;
                // host-side waits must not hold a worker slot
                drop(permit);
                follow_up
            }
            Err(_) => {
                warn!(%trigger, username, "worker pool closed; skipping restore");
                None
            }
        };

        if let Some(step) = follow_up {
            self.finish_on_host(step, &mut outcome).await;
        }

        outcome.enter(RestoreStage::Done);
        outcome
    }

    /// Resolve, migrate and fetch the skin. Returns what is left to do on the
    /// host control context.
    async fn restore(
        &self,
        trigger: Trigger,
        username: &str,
        outcome: &mut RestoreOutcome,
    ) -> Option<HostStep> {
        let identity = outcome.identity;

        outcome.enter(RestoreStage::Resolving);
        let verified = match self.inner.profiles.resolve(username).await {
            Ok(Some(verified)) => verified,
            Ok(None) => {
                info!(%trigger, username, "no verified identity; skipping restore");
                outcome.enter(RestoreStage::NotFound);
                return None;
            }
            Err(err) => {
                warn!(%trigger, username, error = %err, "identity lookup failed; skipping restore");
                outcome.enter(RestoreStage::NotFound);
                return None;
            }
        };
        info!(%trigger, username, %identity, %verified, "resolved verified identity");
        outcome.verified = Some(verified);
        outcome.enter(RestoreStage::Resolved);

        let follow_up = if verified == identity {
            debug!(%identity, "identity is already the verified one");
            outcome.migration = MigrationStatus::SameIdentity;
            None
        } else if self.inner.tracker.is_restored(&identity) {
            info!(%trigger, username, "already restored this session");
            outcome.migration = MigrationStatus::AlreadyRestored;
            None
        } else {
            outcome.enter(RestoreStage::Migrating);
            self.migrate(trigger, verified, outcome).await
        };

        outcome.enter(RestoreStage::FetchingSkin);
        self.refresh_skin(verified, outcome).await;

        follow_up
    }

    async fn migrate(
        &self,
        trigger: Trigger,
        verified: Identity,
        outcome: &mut RestoreOutcome,
    ) -> Option<HostStep> {
        let identity = outcome.identity;
        let migrator = self.inner.migrator.clone();
        let copied = tokio::task::spawn_blocking(move || migrator.migrate(verified, identity))
            .await
            .map_err(RestoreError::from)
            .and_then(|result| result);

        match copied {
            Ok(0) => {
                info!(%trigger, username = %outcome.username, "no verified data on disk; nothing to restore");
                outcome.migration = MigrationStatus::NoArtifacts;
                outcome.enter(RestoreStage::NoArtifacts);
                None
            }
            Ok(count) => {
                outcome.migration = MigrationStatus::Migrated(count);
                outcome.enter(RestoreStage::Migrated);
                outcome.newly_restored = self.inner.tracker.mark_restored(identity);
                info!(
                    %trigger,
                    username = %outcome.username,
                    copied = count,
                    first = outcome.newly_restored,
                    "restored data"
                );

                // the host loaded the old files when the session started; a
                // relog makes it read the migrated ones
                (outcome.newly_restored && trigger != Trigger::PreConnect)
                    .then(|| HostStep::Disconnect(self.inner.config.reconnect_message.clone()))
            }
            Err(err) => {
                warn!(%trigger, username = %outcome.username, error = %err, "could not copy data");
                outcome.migration = MigrationStatus::Failed(err.to_string());
                match trigger {
                    Trigger::Join => {
                        let message = self.inner.config.failure_message.clone();
                        outcome.notice = Some(message.clone());
                        Some(HostStep::Notify(message))
                    }
                    Trigger::PreConnect => {
                        outcome.notice = Some(self.inner.config.failure_message.clone());
                        None
                    }
                    Trigger::Sweep => None,
                }
            }
        }
    }

    async fn finish_on_host(&self, step: HostStep, outcome: &mut RestoreOutcome) {
        let identity = outcome.identity;
        match step {
            HostStep::Disconnect(message) => {
                match self.inner.control.disconnect_if_online(identity, message.clone()).await {
                    Ok(true) => {
                        info!(username = %outcome.username, "disconnected for relog");
                        outcome.disconnected = true;
                        outcome.notice = Some(message);
                    }
                    Ok(false) => {}
                    Err(err) => warn!(error = %err, "could not disconnect restored player"),
                }
            }
            HostStep::Notify(message) => {
                if let Err(err) = self.inner.control.send_message(identity, message) {
                    warn!(error = %err, "could not notify player");
                }
            }
        }
    }

    async fn refresh_skin(&self, verified: Identity, outcome: &mut RestoreOutcome) {
        match self.inner.profiles.textures(&verified).await {
            Ok(Some(descriptor)) => {
                self.inner.skins.put(outcome.identity, descriptor.clone());
                info!(username = %outcome.username, identity = %outcome.identity, "skin cached");
                outcome.skin = Some(descriptor);
            }
            Ok(None) => {
                info!(username = %outcome.username, "no textures property");
            }
            Err(err) => {
                warn!(username = %outcome.username, error = %err, "skin lookup failed");
            }
        }
    }
}
