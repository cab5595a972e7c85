/// Bulk sweep and admin command tests
///
/// Run with: cargo test --test sweep_tests


use mock_mojang::{
    FakeProfiles, RecordingHost, block_artifact, names, read_artifact, restorer_with,
    test_config, write_artifact,
};
use playerdata_restore::{
    ArtifactKind, Identity, NameDirectory, RESTORE_ALL, RestoreError, Restorer, SweepStatus,
    UserCache, control_channel,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use tempfile::tempdir;

/// Three offline players, each with a verified account whose advancements and
/// stats live on disk. Only the offline identities have player-state files.
fn three_players(root: &std::path::Path, profiles: &FakeProfiles) -> Vec<(Identity, Identity, &'static str)> {
    let players = ["Alice", "Bob", "Carol"];
    players
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cracked = Identity::offline(name);
            let verified = Identity::parse(&format!("{:032x}", 0xabc0 + i as u128)).unwrap();
            profiles.account(name, verified);
            write_artifact(root, ArtifactKind::PlayerState, &cracked, b"fresh-offline-player");
            write_artifact(root, ArtifactKind::Advancements, &verified, b"{\"adv\":1}");
            write_artifact(root, ArtifactKind::Statistics, &verified, b"{\"stats\":1}");
            (cracked, verified, *name)
        })
        .collect()
}

#[tokio::test]
async fn test_sweep_survives_one_failing_identity() {
    let dir = tempdir().unwrap();
    let profiles = FakeProfiles::new();
    let players = three_players(dir.path(), &profiles);
    let directory = names(&players.iter().map(|(c, _, n)| (*c, *n)).collect::<Vec<_>>());
    let (bob, _, _) = players[1];
    block_artifact(dir.path(), ArtifactKind::Statistics, &bob);
    let (restorer, mut control) = restorer_with(dir.path(), profiles, directory);
    let mut host = RecordingHost::default();

    let sweep = restorer.start_sweep().unwrap();
    assert_eq!(sweep.total(), 3);
    let report = control.run_until(&mut host, sweep.wait()).await.unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.restored(), 2);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.entry(&bob).unwrap().status,
        SweepStatus::Failed(_)
    ));
    for (cracked, _, _) in [&players[0], &players[2]] {
        assert_eq!(
            report.entry(cracked).unwrap().status,
            SweepStatus::Restored {
                copied: 2,
                disconnected: false
            }
        );
        assert!(restorer.tracker().is_restored(cracked));
        assert!(read_artifact(dir.path(), ArtifactKind::Statistics, cracked).is_some());
    }
    assert!(!restorer.tracker().is_restored(&bob));
    // sweep failures are not shown to anyone
    assert!(host.messages.is_empty());
    assert!(report.finished_at >= report.started_at);
}

#[tokio::test]
async fn test_sweep_disconnects_online_players_only() {
    let dir = tempdir().unwrap();
    let profiles = FakeProfiles::new();
    let players = three_players(dir.path(), &profiles);
    let directory = names(&players.iter().map(|(c, _, n)| (*c, *n)).collect::<Vec<_>>());
    let (restorer, mut control) = restorer_with(dir.path(), profiles, directory);
    let mut host = RecordingHost::default();
    let (alice, _, _) = players[0];
    host.online.insert(alice);

    let report = control
        .run_until(&mut host, restorer.start_sweep().unwrap().wait())
        .await
        .unwrap();

    assert_eq!(report.restored(), 3);
    assert_eq!(
        host.kicks,
        vec![(alice, "Data restored - please rejoin to load your items".to_string())]
    );
    assert_eq!(
        report.entry(&alice).unwrap().status,
        SweepStatus::Restored {
            copied: 2,
            disconnected: true
        }
    );
}

#[tokio::test]
async fn test_second_sweep_skips_restored_identities() {
    let dir = tempdir().unwrap();
    let profiles = FakeProfiles::new();
    let players = three_players(dir.path(), &profiles);
    let directory = names(&players.iter().map(|(c, _, n)| (*c, *n)).collect::<Vec<_>>());
    let (restorer, mut control) = restorer_with(dir.path(), profiles, directory);
    let mut host = RecordingHost::default();
    let (alice, _, _) = players[0];
    host.online.insert(alice);

    control
        .run_until(&mut host, restorer.start_sweep().unwrap().wait())
        .await
        .unwrap();
    let second = control
        .run_until(&mut host, restorer.start_sweep().unwrap().wait())
        .await
        .unwrap();

    assert_eq!(second.restored(), 0);
    assert!(second
        .entries
        .iter()
        .all(|entry| entry.status == SweepStatus::AlreadyRestored));
    assert_eq!(host.kicks.len(), 1);
}

#[tokio::test]
async fn test_sweep_skips_nameless_unresolved_and_verified_files() {
    let dir = tempdir().unwrap();
    let profiles = FakeProfiles::new();

    let nameless = Identity::offline("Forgotten");
    write_artifact(dir.path(), ArtifactKind::PlayerState, &nameless, b"x");

    let cracked_only = Identity::offline("CrackedOnly");
    write_artifact(dir.path(), ArtifactKind::PlayerState, &cracked_only, b"x");

    // a premium player's own file: resolves to itself
    let premium = Identity::parse("00000000000000000000000000001234").unwrap();
    profiles.account("Premium", premium);
    write_artifact(dir.path(), ArtifactKind::PlayerState, &premium, b"premium");

    let directory = names(&[(cracked_only, "CrackedOnly"), (premium, "Premium")]);
    let (restorer, mut control) = restorer_with(dir.path(), profiles.clone(), directory);
    let mut host = RecordingHost::default();

    let report = control
        .run_until(&mut host, restorer.start_sweep().unwrap().wait())
        .await
        .unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.skipped(), 3);
    assert_eq!(report.entry(&nameless).unwrap().status, SweepStatus::NoName);
    assert_eq!(report.entry(&nameless).unwrap().username, None);
    assert_eq!(
        report.entry(&cracked_only).unwrap().status,
        SweepStatus::Unresolved
    );
    assert_eq!(
        report.entry(&premium).unwrap().status,
        SweepStatus::NothingToRestore
    );
    assert_eq!(
        read_artifact(dir.path(), ArtifactKind::PlayerState, &premium).as_deref(),
        Some(&b"premium"[..])
    );
    // the nameless identity is never looked up
    assert_eq!(profiles.resolve_count(), 2);
}

#[tokio::test]
async fn test_sweep_reads_names_from_user_cache() {
    let dir = tempdir().unwrap();
    let world = dir.path().join("world");
    let profiles = FakeProfiles::new();
    let players = three_players(&world, &profiles);
    let (alice, _, _) = players[0];

    let cache_path = dir.path().join("usercache.json");
    std::fs::write(&cache_path, "[]").unwrap();
    let cache = Arc::new(UserCache::load(&cache_path).unwrap());

    let (control_handle, mut control) = control_channel();
    let restorer = Restorer::new(test_config(&world), profiles, cache, control_handle).unwrap();
    let mut host = RecordingHost::default();

    // the host writes the cache after the restorer loaded it; the sweep re-reads it
    std::fs::write(
        &cache_path,
        format!(
            r#"[{{"name":"Alice","uuid":"{}","expiresOn":"2026-11-16 12:00:00 +0000"}}]"#,
            alice
        ),
    )
    .unwrap();

    let report = control
        .run_until(&mut host, restorer.start_sweep().unwrap().wait())
        .await
        .unwrap();

    assert_eq!(report.restored(), 1);
    assert_eq!(report.entry(&alice).unwrap().username.as_deref(), Some("Alice"));
    assert_eq!(report.skipped(), 2);
}

/// Name records that remember which thread refreshed them.
struct ThreadRecordingNames {
    names: HashMap<Identity, String>,
    refreshed_on: Mutex<Option<ThreadId>>,
}

impl NameDirectory for ThreadRecordingNames {
    fn name_of(&self, identity: &Identity) -> Option<String> {
        self.names.get(identity).cloned()
    }

    fn refresh(&self) -> playerdata_restore::Result<()> {
        *self.refreshed_on.lock().unwrap() = Some(std::thread::current().id());
        Ok(())
    }
}

#[tokio::test]
async fn test_restoreall_refreshes_names_off_the_calling_thread() {
    let dir = tempdir().unwrap();
    let profiles = FakeProfiles::new();
    let players = three_players(dir.path(), &profiles);
    let directory = Arc::new(ThreadRecordingNames {
        names: names(&players.iter().map(|(c, _, n)| (*c, *n)).collect::<Vec<_>>()),
        refreshed_on: Mutex::new(None),
    });
    let (control_handle, mut control) = control_channel();
    let restorer = Restorer::new(
        test_config(dir.path()),
        profiles,
        directory.clone(),
        control_handle,
    )
    .unwrap();
    let mut host = RecordingHost::default();

    let reply = restorer.dispatch_command(RESTORE_ALL, &[]).unwrap();
    let report = control
        .run_until(&mut host, reply.sweep.unwrap().wait())
        .await
        .unwrap();

    assert_eq!(report.restored(), 3);
    let refreshed_on = directory.refreshed_on.lock().unwrap().unwrap();
    assert_ne!(refreshed_on, std::thread::current().id());
}

#[tokio::test]
async fn test_restoreall_command() {
    let dir = tempdir().unwrap();
    let profiles = FakeProfiles::new();
    let players = three_players(dir.path(), &profiles);
    let directory = names(&players.iter().map(|(c, _, n)| (*c, *n)).collect::<Vec<_>>());
    let (restorer, mut control) = restorer_with(dir.path(), profiles, directory);
    let mut host = RecordingHost::default();

    let reply = restorer.dispatch_command(RESTORE_ALL, &[]).unwrap();
    assert!(reply.is_success());
    assert_eq!(
        reply.message,
        "Restore process initiated for all offline player files."
    );
    let report = control
        .run_until(&mut host, reply.sweep.unwrap().wait())
        .await
        .unwrap();
    assert_eq!(report.restored(), 3);

    let usage = restorer.dispatch_command("RestoreAll", &["now"]).unwrap();
    assert!(!usage.is_success());
    assert_eq!(usage.message, "Usage: /restoreall");

    assert!(matches!(
        restorer.dispatch_command("tp", &[]),
        Err(RestoreError::UnknownCommand(label)) if label == "tp"
    ));
}

#[tokio::test]
async fn test_restoreall_reports_unreadable_store() {
    let dir = tempdir().unwrap();
    // a plain file where the world folder should be
    let world = dir.path().join("world");
    std::fs::write(&world, b"not a directory").unwrap();
    let (restorer, _control) = restorer_with(&world, FakeProfiles::new(), names(&[]));

    let reply = restorer.dispatch_command(RESTORE_ALL, &[]).unwrap();

    assert!(!reply.is_success());
    assert!(reply.message.starts_with("Error during restoreall: "));
}
