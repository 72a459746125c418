use alloy_primitives::TxHash;
use claim::{ChainError, ClaimStatus, ClaimWorkflow, ClipboardFeedback, Session};
use clap::{Parser, Subcommand};
use client::{FaucetWriter, LocalSession};
use config::{FaucetConfig, NetworkConfig};
use eyre::{bail, OptionExt};
use faucet::{
    clipboard::Osc52Clipboard,
    console::{self, Console, Reply},
    init_tracing,
    metrics::{install_prometheus_exporter, Metrics},
};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const DEFAULT_CONFIG: &str = "faucet.toml";

#[derive(Parser)]
#[command(name = "faucet")]
#[command(about = "Claim the token allotment from the faucet contract")]
struct Cli {
    /// Path to the configuration file (defaults to ./faucet.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a recipient address without touching the chain
    Validate {
        /// Candidate address
        address: String,
    },

    /// Submit a single claim
    Claim {
        /// Recipient address (defaults to the signer's address)
        recipient: Option<String>,

        /// Wait for the transaction receipt
        #[arg(long)]
        confirm: bool,

        /// Receipt polls before giving up
        #[arg(long, default_value_t = 20)]
        receipt_attempts: usize,
    },

    /// Interactive console reading commands from stdin
    Console,
}

/// Everything a connected command needs.
struct App<P> {
    provider: P,
    workflow: ClaimWorkflow<FaucetWriter<P>>,
    session: LocalSession,
    network: NetworkConfig,
    metrics: Metrics,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(|| Path::new(DEFAULT_CONFIG).exists().then(|| DEFAULT_CONFIG.into()));
    let config = FaucetConfig::load(config_path.as_deref())?;

    init_tracing(config.environment);

    if let Some(path) = &config_path {
        info!("Loading config: {}", path.display());
    }

    match cli.command {
        Command::Validate { ref address } => validate(address),
        Command::Claim {
            ref recipient,
            confirm,
            receipt_attempts,
        } => {
            let app = connect(&cli, &config).await?;
            run_claim(app, recipient.clone(), confirm.then_some(receipt_attempts)).await
        }
        Command::Console => {
            let app = connect(&cli, &config).await?;
            run_console(app).await
        }
    }
}

fn validate(address: &str) -> eyre::Result<()> {
    match claim::validate(address) {
        Ok(address) => {
            println!("valid address {address}");
            Ok(())
        }
        Err(err) => bail!("{err}"),
    }
}

async fn connect(
    cli: &Cli,
    config: &FaucetConfig,
) -> eyre::Result<App<impl alloy_provider::Provider + Clone + 'static>> {
    // Fail fast: no workflow without a valid contract address.
    let contract = config.contract()?;
    let network = config.network_config();
    let rpc_url = config.rpc_url()?;

    info!("Loaded config:");
    info!("  Network: {:?}", network.network_type);
    info!("  RPC URL: {}", rpc_url);
    info!("  Faucet: {}", contract);

    let metrics = Metrics::new();
    if let Some(port) = cli.metrics_port.or(config.metrics_port) {
        install_prometheus_exporter(port)?;
        info!(port, "Prometheus exporter listening");
    }

    let private_key = cli
        .private_key
        .as_deref()
        .ok_or_eyre("a private key is required (--private-key or PRIVATE_KEY)")?;
    let signer = client::parse_signer(private_key)?;
    let provider = client::create_wallet_provider(rpc_url, signer.clone())?;

    let chain_id = match client::chain_id(&provider).await {
        Ok(chain_id) => Some(chain_id),
        Err(e) => {
            warn!(error = %e, "Could not read chain id from RPC");
            None
        }
    };
    let session = LocalSession::from_signer(&signer, chain_id);
    if let Some(actual) = session.chain_id().filter(|id| *id != network.chain_id) {
        warn!(
            expected = network.chain_id,
            actual, "RPC endpoint is on a different network than configured"
        );
    }
    info!("  Account: {}", signer.address());

    let workflow = ClaimWorkflow::new(contract, FaucetWriter::new(provider.clone()));

    Ok(App {
        provider,
        workflow,
        session,
        network,
        metrics,
    })
}

async fn run_claim<P>(
    app: App<P>,
    recipient: Option<String>,
    receipt_attempts: Option<usize>,
) -> eyre::Result<()>
where
    P: alloy_provider::Provider + Clone + 'static,
{
    let App {
        provider,
        workflow,
        session,
        network,
        metrics,
    } = app;

    let reporter = console::spawn_status_reporter(&workflow, network, metrics.clone(), false);
    let recipient = recipient.unwrap_or_else(|| claim::prefill(&session));
    metrics.record_submission(false);

    if let Some(handle) = workflow.submit(&recipient) {
        handle.await?;
    }

    if let (Some(attempts), Some(tx_hash)) = (receipt_attempts, workflow.tx_hash()) {
        confirm(&provider, &workflow, tx_hash, attempts).await;
    }

    let status = workflow.current_state();

    // Closing the status stream lets the reporter count every transition before exit.
    drop(workflow);
    reporter.await?;

    println!("{}", console::render_status(&status, &network));
    if let ClaimStatus::Failed(reason) = status {
        bail!("claim failed: {reason}");
    }

    Ok(())
}

/// Layer receipt tracking on top of the workflow's `Pending` state.
async fn confirm<P>(
    provider: &P,
    workflow: &ClaimWorkflow<FaucetWriter<P>>,
    tx_hash: TxHash,
    attempts: usize,
) where
    P: alloy_provider::Provider + Clone + 'static,
{
    info!(%tx_hash, "Waiting for receipt");
    match client::wait_for_receipt(provider, tx_hash, attempts).await {
        Err(ChainError::Transport(e)) => {
            warn!(%tx_hash, error = %e, "Claim not confirmed yet");
        }
        outcome => {
            workflow.settle(tx_hash, outcome);
        }
    }
}

async fn run_console<P>(app: App<P>) -> eyre::Result<()>
where
    P: alloy_provider::Provider + Clone + 'static,
{
    let App {
        workflow,
        session,
        network,
        metrics,
        ..
    } = app;

    let reporter = console::spawn_status_reporter(&workflow, network, metrics.clone(), true);
    let console = Console::new(
        workflow,
        ClipboardFeedback::new(Osc52Clipboard::stdout()),
        claim::prefill(&session),
        network,
        metrics,
    );

    println!("{}", console::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match console.handle_line(&line).await {
                    Reply::Text(text) if text.is_empty() => {}
                    Reply::Text(text) => println!("{text}"),
                    Reply::Quit => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    reporter.abort();
    Ok(())
}
