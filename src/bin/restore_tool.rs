use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use playerdata_restore::{
    Host, Identity, MojangClient, ProfileService, RestoreConfig, Restorer, SweepStatus,
    TextureDescriptor, control_channel,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "restore-tool")]
#[command(about = "Restores verified player data onto offline-mode identities")]
struct Cli {
    /// World folder containing playerdata/, advancements/ and stats/
    #[arg(long, env = "RESTORE_DATA_ROOT", default_value = "world")]
    root: PathBuf,
    /// usercache.json; defaults to the one next to the world folder
    #[arg(long, env = "RESTORE_USER_CACHE")]
    user_cache: Option<PathBuf>,
    #[arg(long, env = "RESTORE_API_BASE_URL")]
    api_base: Option<String>,
    #[arg(long, env = "RESTORE_SESSION_BASE_URL")]
    session_base: Option<String>,
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
    #[arg(long, default_value_t = 4)]
    workers: usize,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Restore every identity that has a player-state file
    Sweep,
    /// Restore one player as if they were connecting
    Restore { name: String },
    /// Print the verified identity of a username
    Resolve { name: String },
    /// Print the skin texture of a username
    Skin { name: String },
    /// Print the offline identity of a username
    OfflineId { name: String },
}

/// Stand-in host for running outside a server: nobody is ever online.
struct OfflineHost;

impl Host for OfflineHost {
    fn is_online(&self, _identity: &Identity) -> bool {
        false
    }

    fn disconnect(&mut self, identity: &Identity, message: &str) {
        info!(%identity, message, "disconnect requested");
    }

    fn send_message(&mut self, identity: &Identity, message: &str) {
        info!(%identity, message, "message");
    }

    fn apply_skin(&mut self, identity: &Identity, _descriptor: &TextureDescriptor) {
        info!(%identity, "skin applied");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    match cli.command {
        Command::Sweep => sweep(config).await,
        Command::Restore { name } => restore(config, &name).await,
        Command::Resolve { name } => {
            let client = MojangClient::new(&config)?;
            match client.resolve(&name).await? {
                Some(identity) => println!("{} -> {}", name, identity),
                None => println!("{} has no verified account", name),
            }
            Ok(())
        }
        Command::Skin { name } => {
            let client = MojangClient::new(&config)?;
            match client.fetch(&name).await {
                Some(skin) => {
                    println!("value: {}", skin.value);
                    println!("signature: {}", skin.signature.as_deref().unwrap_or("<none>"));
                }
                None => println!("no skin for {}", name),
            }
            Ok(())
        }
        Command::OfflineId { name } => {
            println!("{}", Identity::offline(&name));
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> Result<RestoreConfig> {
    let mut config = RestoreConfig::new(&cli.root)
        .http_timeout(Duration::from_millis(cli.timeout_ms))
        .max_workers(cli.workers)
        .join_delay(Duration::ZERO);
    if let Some(path) = &cli.user_cache {
        config = config.user_cache_path(path);
    }
    if let Some(url) = &cli.api_base {
        config = config.api_base_url(url);
    }
    if let Some(url) = &cli.session_base {
        config = config.session_base_url(url);
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn sweep(config: RestoreConfig) -> Result<()> {
    let (control, mut host_loop) = control_channel();
    let restorer = Restorer::from_config(config, control)?;

    let reply = restorer.dispatch_command(playerdata_restore::RESTORE_ALL, &[])?;
    println!("{}", reply.message);
    let sweep = reply
        .sweep
        .ok_or_else(|| anyhow!("sweep did not start"))?;

    let report = host_loop.run_until(&mut OfflineHost, sweep.wait()).await?;
    for entry in &report.entries {
        let name = entry.username.as_deref().unwrap_or("?");
        let status = match &entry.status {
            SweepStatus::NoName => "no name on record".to_string(),
            SweepStatus::Unresolved => "no verified account".to_string(),
            SweepStatus::AlreadyRestored => "already restored".to_string(),
            SweepStatus::NothingToRestore => "nothing to restore".to_string(),
            SweepStatus::Restored { copied, .. } => format!("restored {} file(s)", copied),
            SweepStatus::Failed(reason) => format!("FAILED: {}", reason),
        };
        println!("{} {:<16} {}", entry.identity, name, status);
    }
    println!(
        "{} identities, {} restored, {} failed, {} skipped ({} ms)",
        report.total(),
        report.restored(),
        report.failed(),
        report.skipped(),
        (report.finished_at - report.started_at).num_milliseconds()
    );
    Ok(())
}

async fn restore(config: RestoreConfig, name: &str) -> Result<()> {
    let (control, _host_loop) = control_channel();
    let restorer = Restorer::from_config(config, control)?;
    let identity = Identity::offline(name);

    let outcome = restorer.pre_connect(name, identity).await;
    match outcome.verified {
        Some(verified) => println!("{} ({}) <- {}", name, identity, verified),
        None => println!("{} has no verified account", name),
    }
    println!("migration: {:?}", outcome.migration);
    if let Some(notice) = &outcome.notice {
        println!("{}", notice);
    }
    println!("skin cached: {}", outcome.skin.is_some());
    Ok(())
}
