//! Line-oriented faucet console.
//!
//! Each input line is one user event. Chain write resolutions arrive asynchronously and are
//! reported by [`spawn_status_reporter`], so a new `claim` can be entered while a previous one
//! is still in flight (it supersedes it).

use crate::metrics::Metrics;
use claim::{ChainWriter, ClaimStatus, ClaimWorkflow, Clipboard, ClipboardFeedback};
use config::NetworkConfig;
use serde::Serialize;
use std::{fmt, str::FromStr};
use thiserror::Error;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{debug, warn};

pub const HELP: &str = "\
commands:
  claim [ADDRESS]   claim tokens for ADDRESS (defaults to the connected account)
  reset             discard the current claim
  status [--json]   show the current claim
  copy tx|address   copy the transaction hash or the recipient
  help              show this help
  quit              exit";

/// Copyable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Tx,
    Address,
}

impl Field {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tx => "tx",
            Self::Address => "address",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One console event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Claim(Option<String>),
    Reset,
    Status { json: bool },
    Copy(Field),
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}, try `help`")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error("unexpected argument {0:?}")]
    UnexpectedArgument(String),

    #[error("unknown field {0:?}, expected `tx` or `address`")]
    UnknownField(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let arg = words.next();
        if let Some(extra) = words.next() {
            return Err(CommandError::UnexpectedArgument(extra.to_string()));
        }

        let no_arg = |command: Self| match arg {
            Some(arg) => Err(CommandError::UnexpectedArgument(arg.to_string())),
            None => Ok(command),
        };

        match name {
            "claim" => Ok(Self::Claim(arg.map(str::to_string))),
            "reset" => no_arg(Self::Reset),
            "status" => match arg {
                None => Ok(Self::Status { json: false }),
                Some("--json") => Ok(Self::Status { json: true }),
                Some(arg) => Err(CommandError::UnexpectedArgument(arg.to_string())),
            },
            "copy" => match arg {
                Some("tx") => Ok(Self::Copy(Field::Tx)),
                Some("address") => Ok(Self::Copy(Field::Address)),
                Some(other) => Err(CommandError::UnknownField(other.to_string())),
                None => Err(CommandError::MissingArgument("copy")),
            },
            "help" | "?" => no_arg(Self::Help),
            "quit" | "exit" => no_arg(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Result of executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// JSON view of the console state.
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub status: ClaimStatus,
    pub recipient: Option<String>,
    pub tx_url: Option<String>,
    pub copied_tx: bool,
    pub copied_address: bool,
}

/// Faucet console: the claim workflow and the copy acknowledgements side by side.
pub struct Console<W, C> {
    workflow: ClaimWorkflow<W>,
    clipboard: ClipboardFeedback<C>,
    prefill: String,
    network: NetworkConfig,
    metrics: Metrics,
}

impl<W, C> Console<W, C>
where
    W: ChainWriter,
    C: Clipboard,
{
    /// `prefill` is the recipient used by a bare `claim`, read once from the session.
    pub const fn new(
        workflow: ClaimWorkflow<W>,
        clipboard: ClipboardFeedback<C>,
        prefill: String,
        network: NetworkConfig,
        metrics: Metrics,
    ) -> Self {
        Self {
            workflow,
            clipboard,
            prefill,
            network,
            metrics,
        }
    }

    pub const fn workflow(&self) -> &ClaimWorkflow<W> {
        &self.workflow
    }

    pub const fn clipboard(&self) -> &ClipboardFeedback<C> {
        &self.clipboard
    }

    /// Parse and execute one input line.
    pub async fn handle_line(&self, line: &str) -> Reply {
        match line.parse::<Command>() {
            Ok(command) => self.execute(command).await,
            Err(CommandError::Empty) => Reply::Text(String::new()),
            Err(err) => Reply::Text(err.to_string()),
        }
    }

    pub async fn execute(&self, command: Command) -> Reply {
        debug!(?command, "Console command");

        match command {
            Command::Claim(address) => Reply::Text(self.claim(address)),
            Command::Reset => {
                self.workflow.reset();
                Reply::Text(render_status(&ClaimStatus::Idle, &self.network))
            }
            Command::Status { json: false } => Reply::Text(self.status_line()),
            Command::Status { json: true } => Reply::Text(
                serde_json::to_string(&self.snapshot())
                    .unwrap_or_else(|e| format!("failed to encode status: {e}")),
            ),
            Command::Copy(field) => Reply::Text(self.copy(field).await),
            Command::Help => Reply::Text(HELP.to_string()),
            Command::Quit => Reply::Quit,
        }
    }

    fn claim(&self, address: Option<String>) -> String {
        let raw = address.unwrap_or_else(|| self.prefill.clone());
        let superseded = self.workflow.current_state().is_in_flight();
        self.metrics.record_submission(superseded);

        // The resolution task runs detached; its outcome reaches the status reporter.
        match self.workflow.submit(&raw) {
            Some(_) => format!("submitting claim for {raw}"),
            None => render_status(&self.workflow.current_state(), &self.network),
        }
    }

    async fn copy(&self, field: Field) -> String {
        let text = match field {
            Field::Tx => self.workflow.tx_hash().map(|tx_hash| tx_hash.to_string()),
            Field::Address => self
                .workflow
                .recipient()
                .map(|recipient| recipient.to_string())
                .or_else(|| (!self.prefill.is_empty()).then(|| self.prefill.clone())),
        };

        let Some(text) = text else {
            return format!("nothing to copy for {field}");
        };

        let result = self.clipboard.copy(field.as_str(), &text).await;
        self.metrics.record_copy(field.as_str(), result.is_ok());
        match result {
            Ok(()) => format!("copied {field}"),
            Err(err) => format!("could not copy {field}: {err}"),
        }
    }

    fn status_line(&self) -> String {
        let mut line = render_status(&self.workflow.current_state(), &self.network);
        for field in [Field::Tx, Field::Address] {
            if self.clipboard.is_copied(field.as_str()) {
                line.push_str(&format!(" [{field} copied]"));
            }
        }
        line
    }

    pub fn snapshot(&self) -> Snapshot {
        let status = self.workflow.current_state();
        Snapshot {
            tx_url: status
                .tx_hash()
                .and_then(|tx_hash| self.network.tx_url(tx_hash)),
            recipient: self.workflow.recipient().map(|r| r.to_string()),
            copied_tx: self.clipboard.is_copied(Field::Tx.as_str()),
            copied_address: self.clipboard.is_copied(Field::Address.as_str()),
            status,
        }
    }
}

/// Human readable status.
pub fn render_status(status: &ClaimStatus, network: &NetworkConfig) -> String {
    let with_link = |label: &str, tx_hash| match network.tx_url(tx_hash) {
        Some(url) => format!("{label} {tx_hash} ({url})"),
        None => format!("{label} {tx_hash}"),
    };

    match status {
        ClaimStatus::Idle => "idle".to_string(),
        ClaimStatus::Validating => "validating recipient".to_string(),
        ClaimStatus::Submitting => "submitting claim".to_string(),
        ClaimStatus::Pending(tx_hash) => with_link("pending", *tx_hash),
        ClaimStatus::Settled(tx_hash) => with_link("settled", *tx_hash),
        ClaimStatus::Failed(reason) => format!("failed: {reason}"),
    }
}

/// Report every published transition of `workflow` and count it in `metrics`.
///
/// With `echo` each new status is printed to stdout. The task drains what was published and
/// ends once the workflow and its in-flight resolutions are dropped.
pub fn spawn_status_reporter<W>(
    workflow: &ClaimWorkflow<W>,
    network: NetworkConfig,
    metrics: Metrics,
    echo: bool,
) -> JoinHandle<()> {
    let mut updates = workflow.subscribe();
    tokio::spawn(async move {
        loop {
            let status = match updates.recv().await {
                Ok(status) => status,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Status reporter fell behind, transitions not counted");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            metrics.record_status(&status);
            if echo && !matches!(status, ClaimStatus::Idle | ClaimStatus::Validating) {
                println!("{}", render_status(&status, &network));
            }
        }
    })
}
