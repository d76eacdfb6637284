use switchboard_coordinator::chains::ChainRegistry;
use switchboard_coordinator::cli::{Cli, Command, ConfigureArgs, PacketIdCommand, SealArgs};
use switchboard_coordinator::coordinator::{CancelFlag, CancelHandle, Coordinator};
use switchboard_coordinator::output;
use switchboard_coordinator::packet::PacketId;
use switchboard_coordinator::registry::{JsonFileStore, Reconciler, RegistryStore};
use switchboard_coordinator::signer::{parse_private_key, HttpRelay, SignerProvider};

use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use eyre::{eyre, WrapErr};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Main entry point for the coordinator
#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let success = match &cli.command {
        Command::Configure(args) => configure(&cli, args).await?,
        Command::Seal(args) => seal(&cli, args).await?,
        Command::PacketId(command) => packet_id(command)?,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

/// `RUST_LOG` filter (default `info`), human-readable or JSON.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn signer_key(cli: &Cli) -> eyre::Result<PrivateKeySigner> {
    let hex = cli
        .signer_key
        .as_deref()
        .ok_or_else(|| eyre!("No signer key provided. Set --signer-key or SIGNER_KEY."))?;
    let key = parse_private_key(hex)?;
    output::print_signer_loaded(&key.address());
    Ok(key)
}

async fn configure(cli: &Cli, args: &ConfigureArgs) -> eyre::Result<bool> {
    let config = args.run_config();
    let store = JsonFileStore::new(&cli.addresses);
    let mut reconciler = Reconciler::load(store)
        .wrap_err_with(|| format!("loading address registry {}", cli.addresses.display()))?;

    let key = signer_key(cli)?;
    let signers = match (args.use_safe, &args.relay_url) {
        (true, Some(url)) => {
            let relay = HttpRelay::new(url, args.relay_api_key.as_deref())?;
            SignerProvider::with_relay(key, Arc::new(relay))
        }
        (true, None) => {
            output::print_no_relay_warning();
            SignerProvider::without_relay(key, true)
        }
        (false, _) => SignerProvider::direct(key),
    };
    let endpoints = cli.endpoints(&args.all_slugs(), |name| std::env::var(name).ok());

    let integrations: Vec<String> = config.integrations.iter().map(ToString::to_string).collect();
    let coordinator = Coordinator::new(
        ChainRegistry::default(),
        Arc::new(endpoints),
        Arc::new(signers),
        config,
    );
    output::print_banner("configure", coordinator.run_id());
    output::print_targets(&args.chains, &args.siblings, &integrations);

    let (handle, cancel) = CancelFlag::new();
    let deadline = args.deadline_secs.map(Duration::from_secs);
    let watcher = tokio::spawn(watch_for_cancel(handle, deadline));

    let result = coordinator.configure(&mut reconciler, &args.request(), cancel).await;
    watcher.abort();
    result?;

    let report = reconciler.finish();
    output::print_run_summary(&report);
    output::print_registry_written(&cli.addresses);
    info!(target: "coordinator", success = report.is_success(), "Configuration run finished");
    Ok(report.is_success())
}

/// Raise the cancel flag on Ctrl-C or once the deadline passes.
async fn watch_for_cancel(handle: CancelHandle, deadline: Option<Duration>) {
    let deadline = async {
        match deadline {
            Some(after) => tokio::time::sleep(after).await,
            None => std::future::pending().await,
        }
    };
    let reason = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                warn!(target: "coordinator", %err, "Could not listen for Ctrl-C");
                return;
            }
            "interrupted"
        }
        _ = deadline => "deadline reached",
    };
    output::print_cancel_requested(reason);
    warn!(target: "coordinator", reason, "Cancelling run");
    handle.cancel();
}

async fn seal(cli: &Cli, args: &SealArgs) -> eyre::Result<bool> {
    let registry = JsonFileStore::new(&cli.addresses)
        .load()
        .wrap_err_with(|| format!("loading address registry {}", cli.addresses.display()))?;
    let key = signer_key(cli)?;
    let endpoints = cli.endpoints(&[args.chain], |name| std::env::var(name).ok());
    let coordinator = Coordinator::new(
        ChainRegistry::default(),
        Arc::new(endpoints),
        Arc::new(SignerProvider::direct(key)),
        args.run_config(),
    );
    output::print_banner("seal", coordinator.run_id());

    let reports = coordinator.seal(&registry, &args.request()).await?;
    output::print_packet_reports(&reports);
    Ok(reports.iter().all(|report| report.is_satisfied()))
}

fn packet_id(command: &PacketIdCommand) -> eyre::Result<bool> {
    let (id, packed) = match command {
        PacketIdCommand::Pack {
            chain,
            capacitor,
            counter,
        } => {
            let id = PacketId::new(*chain, *capacitor, *counter);
            (id, id.pack()?)
        }
        PacketIdCommand::Unpack { id } => (PacketId::unpack(*id)?, *id),
    };
    output::print_packet_id(&id, packed);
    Ok(true)
}
