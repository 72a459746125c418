//! Claim submission state machine.
//!
//! ```text
//! Idle -> Validating -> Submitting -> Pending(tx) [-> Settled(tx)]
//!              |             |             |
//!              +-------------+-------------+--> Failed(reason)
//! ```
//!
//! At most one attempt is live. Every attempt is tagged with a sequence number when it is
//! created; a chain write resolution is applied only if its attempt is still the current one.
//! A `submit` while an attempt is `Submitting` or `Pending` supersedes it, and the late
//! result of the superseded call is dropped.
//!
//! Every transition is broadcast in order to [`ClaimWorkflow::subscribe`] receivers.

use crate::{address, ChainError, ChainWriter, FunctionCall, HexAddress, ValidationError};
use alloy_primitives::TxHash;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info, warn};

/// Transitions buffered per subscriber before it starts lagging.
pub const STATUS_CHANNEL_CAPACITY: usize = 64;

/// Observable status of the current claim attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum ClaimStatus {
    /// No attempt
    Idle,
    /// Recipient is being validated
    Validating,
    /// Chain write issued, no transaction identifier yet
    Submitting,
    /// Transaction handed to the network
    Pending(TxHash),
    /// Confirmation reported by the host
    Settled(TxHash),
    /// Attempt ended in an error
    Failed(ClaimFailure),
}

impl ClaimStatus {
    /// Whether a chain write for this attempt has been issued and not failed.
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitting | Self::Pending(_))
    }

    /// Transaction identifier, once known.
    pub const fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Pending(tx_hash) | Self::Settled(tx_hash) => Some(*tx_hash),
            _ => None,
        }
    }

    /// Short lowercase label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Pending(_) => "pending",
            Self::Settled(_) => "settled",
            Self::Failed(_) => "failed",
        }
    }
}

/// Why an attempt failed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "error", rename_all = "snake_case")]
pub enum ClaimFailure {
    /// Recipient address rejected before any chain call
    #[error(transparent)]
    Invalid(ValidationError),

    /// Chain write service reported an error
    #[error(transparent)]
    Chain(ChainError),
}

/// One user-initiated claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimAttempt {
    /// Monotonic attempt number
    pub seq: u64,
    /// Recipient text as submitted
    pub input: String,
    /// Validated recipient; `None` when validation failed
    pub recipient: Option<HexAddress>,
    /// Current status
    pub status: ClaimStatus,
}

struct Inner {
    last_seq: u64,
    current: Option<ClaimAttempt>,
    status_tx: broadcast::Sender<ClaimStatus>,
}

impl Inner {
    fn status(&self) -> ClaimStatus {
        self.current
            .as_ref()
            .map_or(ClaimStatus::Idle, |attempt| attempt.status.clone())
    }

    fn current_seq(&self) -> Option<u64> {
        self.current.as_ref().map(|attempt| attempt.seq)
    }

    fn begin(&mut self, input: &str) -> u64 {
        self.last_seq += 1;
        self.current = Some(ClaimAttempt {
            seq: self.last_seq,
            input: input.to_string(),
            recipient: None,
            status: ClaimStatus::Validating,
        });
        self.publish(ClaimStatus::Validating);
        self.last_seq
    }

    fn transition(&mut self, status: ClaimStatus) {
        if let Some(attempt) = self.current.as_mut() {
            attempt.status = status.clone();
        }
        self.publish(status);
    }

    fn clear(&mut self) {
        self.current = None;
        self.publish(ClaimStatus::Idle);
    }

    fn publish(&self, status: ClaimStatus) {
        // No subscribers is fine.
        let _ = self.status_tx.send(status);
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Controller owning the current claim attempt.
pub struct ClaimWorkflow<W> {
    contract: HexAddress,
    writer: Arc<W>,
    inner: Arc<Mutex<Inner>>,
}

impl<W> Clone for ClaimWorkflow<W> {
    fn clone(&self) -> Self {
        Self {
            contract: self.contract.clone(),
            writer: Arc::clone(&self.writer),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W> ClaimWorkflow<W>
where
    W: ChainWriter,
{
    /// Create a workflow targeting the faucet at `contract`.
    pub fn new(contract: HexAddress, writer: W) -> Self {
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Self {
            contract,
            writer: Arc::new(writer),
            inner: Arc::new(Mutex::new(Inner {
                last_seq: 0,
                current: None,
                status_tx,
            })),
        }
    }

    /// Faucet contract every claim is sent to.
    pub const fn contract(&self) -> &HexAddress {
        &self.contract
    }

    /// Start a new claim for `raw`, superseding any live attempt.
    ///
    /// Returns immediately. When the address is invalid the attempt fails on the spot and
    /// `None` is returned; no chain write is issued. Otherwise the chain write runs on a
    /// spawned task whose handle is returned. Must be called from within a tokio runtime.
    pub fn submit(&self, raw: &str) -> Option<JoinHandle<()>> {
        let (seq, call) = {
            let mut inner = lock(&self.inner);

            if let Some(previous) = inner.current.as_ref().filter(|a| a.status.is_in_flight()) {
                info!(
                    superseded = previous.seq,
                    status = previous.status.label(),
                    "Superseding in-flight claim attempt"
                );
            }

            let seq = inner.begin(raw);

            let recipient = match address::validate(raw) {
                Ok(recipient) => recipient,
                Err(err) => {
                    warn!(seq, input = raw, error = %err, "Recipient address rejected");
                    inner.transition(ClaimStatus::Failed(ClaimFailure::Invalid(err)));
                    return None;
                }
            };

            if let Some(attempt) = inner.current.as_mut() {
                attempt.recipient = Some(recipient.clone());
            }
            inner.transition(ClaimStatus::Submitting);

            info!(
                seq,
                recipient = %recipient,
                contract = %self.contract,
                "Submitting claim"
            );

            (seq, FunctionCall::claim(self.contract.clone(), recipient))
        };

        let writer = Arc::clone(&self.writer);
        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(async move {
            let outcome = writer.send(call).await;
            resolve(&inner, seq, outcome);
        }))
    }

    /// Drop the current attempt and return to `Idle`.
    ///
    /// A chain write still in flight keeps running but its result will be ignored.
    pub fn reset(&self) {
        let mut inner = lock(&self.inner);
        if let Some(attempt) = inner.current.as_ref() {
            debug!(seq = attempt.seq, status = attempt.status.label(), "Resetting claim");
        }
        inner.clear();
    }

    /// Apply a confirmation outcome observed by the host for `tx_hash`.
    ///
    /// Only a `Pending` attempt with the same transaction moves, to `Settled` on success or to
    /// `Failed` otherwise. Returns whether the state changed.
    pub fn settle(&self, tx_hash: TxHash, outcome: Result<(), ChainError>) -> bool {
        let mut inner = lock(&self.inner);
        if inner.status() != ClaimStatus::Pending(tx_hash) {
            debug!(%tx_hash, "Ignoring confirmation for a transaction that is not pending");
            return false;
        }

        match outcome {
            Ok(()) => {
                info!(%tx_hash, "Claim settled");
                inner.transition(ClaimStatus::Settled(tx_hash));
            }
            Err(err) => {
                warn!(%tx_hash, error = %err, "Claim failed after submission");
                inner.transition(ClaimStatus::Failed(ClaimFailure::Chain(err)));
            }
        }
        true
    }
}

impl<W> ClaimWorkflow<W> {
    /// Snapshot of the current status.
    pub fn current_state(&self) -> ClaimStatus {
        lock(&self.inner).status()
    }

    /// Snapshot of the current attempt, if any.
    pub fn current_attempt(&self) -> Option<ClaimAttempt> {
        lock(&self.inner).current.clone()
    }

    /// Receiver of every status transition published after this call, in order.
    ///
    /// A receiver more than [`STATUS_CHANNEL_CAPACITY`] transitions behind gets
    /// `RecvError::Lagged`. The stream closes once the workflow and its in-flight
    /// resolutions are dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<ClaimStatus> {
        lock(&self.inner).status_tx.subscribe()
    }

    /// A chain write is outstanding and no transaction identifier is known yet.
    pub fn is_busy(&self) -> bool {
        matches!(self.current_state(), ClaimStatus::Submitting)
    }

    /// Transaction identifier of the current attempt.
    pub fn tx_hash(&self) -> Option<TxHash> {
        self.current_state().tx_hash()
    }

    /// Validated recipient of the current attempt.
    pub fn recipient(&self) -> Option<HexAddress> {
        lock(&self.inner)
            .current
            .as_ref()
            .and_then(|attempt| attempt.recipient.clone())
    }

    /// There is an attempt to discard.
    pub fn can_reset(&self) -> bool {
        lock(&self.inner).current.is_some()
    }
}

fn resolve(inner: &Mutex<Inner>, seq: u64, outcome: Result<TxHash, ChainError>) {
    let mut inner = lock(inner);

    if inner.current_seq() != Some(seq) {
        debug!(
            seq,
            current = ?inner.current_seq(),
            ok = outcome.is_ok(),
            "Discarding result of superseded claim attempt"
        );
        return;
    }

    match outcome {
        Ok(tx_hash) => {
            info!(seq, %tx_hash, "Claim transaction submitted");
            inner.transition(ClaimStatus::Pending(tx_hash));
        }
        Err(err) => {
            warn!(seq, error = %err, "Claim transaction failed");
            inner.transition(ClaimStatus::Failed(ClaimFailure::Chain(err)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{contract, MockWriter, OTHER_RECIPIENT, RECIPIENT};

    fn workflow() -> (ClaimWorkflow<MockWriter>, MockWriter) {
        let writer = MockWriter::default();
        (ClaimWorkflow::new(contract(), writer.clone()), writer)
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let (workflow, _) = workflow();

        assert_eq!(workflow.current_state(), ClaimStatus::Idle);
        assert!(!workflow.is_busy());
        assert!(!workflow.can_reset());
        assert_eq!(workflow.tx_hash(), None);
    }

    #[tokio::test]
    async fn test_invalid_address_never_calls_chain() {
        let (workflow, writer) = workflow();

        for input in ["0x123", "", "0xZZ34567890abcdef1234567890ABCDEF12345678"] {
            assert!(workflow.submit(input).is_none());
            assert!(matches!(
                workflow.current_state(),
                ClaimStatus::Failed(ClaimFailure::Invalid(_))
            ));
        }

        tokio::task::yield_now().await;
        assert_eq!(writer.call_count(), 0);
        assert_eq!(
            workflow.current_state(),
            ClaimStatus::Failed(ClaimFailure::Invalid(ValidationError::BadHex {
                position: 2,
                found: 'Z'
            }))
        );
    }

    #[tokio::test]
    async fn test_successful_claim() {
        let (workflow, writer) = workflow();
        let respond = writer.expect_call(RECIPIENT);
        let tx_hash = TxHash::repeat_byte(0xaa);

        let handle = workflow.submit(RECIPIENT).unwrap();
        assert_eq!(workflow.current_state(), ClaimStatus::Submitting);
        assert!(workflow.is_busy());
        assert_eq!(workflow.recipient().unwrap().as_str(), RECIPIENT);

        respond.send(Ok(tx_hash)).unwrap();
        handle.await.unwrap();

        assert_eq!(workflow.current_state(), ClaimStatus::Pending(tx_hash));
        assert_eq!(workflow.tx_hash(), Some(tx_hash));
        assert!(!workflow.is_busy());

        let issued = writer.issued();
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0], FunctionCall::claim(contract(), crate::validate(RECIPIENT).unwrap()));
    }

    #[tokio::test]
    async fn test_chain_error_fails_attempt() {
        let (workflow, writer) = workflow();
        let respond = writer.expect_call(RECIPIENT);

        let handle = workflow.submit(RECIPIENT).unwrap();
        respond
            .send(Err(ChainError::Rejected("User denied transaction signature".into())))
            .unwrap();
        handle.await.unwrap();

        assert_eq!(
            workflow.current_state(),
            ClaimStatus::Failed(ClaimFailure::Chain(ChainError::Rejected(
                "User denied transaction signature".into()
            )))
        );
        assert_eq!(workflow.tx_hash(), None);
    }

    #[tokio::test]
    async fn test_late_result_of_superseded_attempt_is_ignored() {
        let (workflow, writer) = workflow();
        let first = writer.expect_call(RECIPIENT);
        let second = writer.expect_call(OTHER_RECIPIENT);

        let first_handle = workflow.submit(RECIPIENT).unwrap();
        let second_handle = workflow.submit(OTHER_RECIPIENT).unwrap();

        second.send(Ok(TxHash::repeat_byte(0x02))).unwrap();
        second_handle.await.unwrap();
        assert_eq!(
            workflow.current_state(),
            ClaimStatus::Pending(TxHash::repeat_byte(0x02))
        );

        first.send(Ok(TxHash::repeat_byte(0x01))).unwrap();
        first_handle.await.unwrap();

        assert_eq!(
            workflow.current_state(),
            ClaimStatus::Pending(TxHash::repeat_byte(0x02))
        );
        let attempt = workflow.current_attempt().unwrap();
        assert_eq!(attempt.seq, 2);
        assert_eq!(attempt.recipient.unwrap().as_str(), OTHER_RECIPIENT);
        assert_eq!(writer.call_count(), 2);
    }

    #[tokio::test]
    async fn test_early_result_of_superseded_attempt_is_ignored() {
        let (workflow, writer) = workflow();
        let first = writer.expect_call(RECIPIENT);
        let second = writer.expect_call(OTHER_RECIPIENT);

        let first_handle = workflow.submit(RECIPIENT).unwrap();
        let second_handle = workflow.submit(OTHER_RECIPIENT).unwrap();

        first
            .send(Err(ChainError::Transport("connection reset".into())))
            .unwrap();
        first_handle.await.unwrap();
        assert_eq!(workflow.current_state(), ClaimStatus::Submitting);

        second.send(Ok(TxHash::repeat_byte(0x02))).unwrap();
        second_handle.await.unwrap();
        assert_eq!(
            workflow.current_state(),
            ClaimStatus::Pending(TxHash::repeat_byte(0x02))
        );
    }

    #[tokio::test]
    async fn test_early_success_of_superseded_attempt_keeps_newer_submitting() {
        let (workflow, writer) = workflow();
        let first = writer.expect_call(RECIPIENT);
        let second = writer.expect_call(OTHER_RECIPIENT);

        let first_handle = workflow.submit(RECIPIENT).unwrap();
        let second_handle = workflow.submit(OTHER_RECIPIENT).unwrap();

        first.send(Ok(TxHash::repeat_byte(0x01))).unwrap();
        first_handle.await.unwrap();
        assert_eq!(workflow.current_state(), ClaimStatus::Submitting);
        assert_eq!(workflow.tx_hash(), None);
        assert_eq!(workflow.recipient().unwrap().as_str(), OTHER_RECIPIENT);

        second
            .send(Err(ChainError::Rejected("User denied transaction signature".into())))
            .unwrap();
        second_handle.await.unwrap();
        assert_eq!(
            workflow.current_state(),
            ClaimStatus::Failed(ClaimFailure::Chain(ChainError::Rejected(
                "User denied transaction signature".into()
            )))
        );
    }

    #[tokio::test]
    async fn test_submit_while_pending_starts_fresh_attempt() {
        let (workflow, writer) = workflow();
        let first = writer.expect_call(RECIPIENT);

        let handle = workflow.submit(RECIPIENT).unwrap();
        first.send(Ok(TxHash::repeat_byte(0x01))).unwrap();
        handle.await.unwrap();
        assert!(matches!(workflow.current_state(), ClaimStatus::Pending(_)));

        // An invalid resubmission still replaces the pending attempt.
        assert!(workflow.submit("0x123").is_none());
        assert_eq!(workflow.tx_hash(), None);
        assert!(matches!(
            workflow.current_state(),
            ClaimStatus::Failed(ClaimFailure::Invalid(ValidationError::WrongLength { .. }))
        ));
    }

    #[tokio::test]
    async fn test_reset_from_terminal_states() {
        let (workflow, writer) = workflow();

        assert!(workflow.submit("not an address").is_none());
        workflow.reset();
        assert_eq!(workflow.current_state(), ClaimStatus::Idle);

        let respond = writer.expect_call(RECIPIENT);
        let handle = workflow.submit(RECIPIENT).unwrap();
        respond.send(Ok(TxHash::repeat_byte(0x01))).unwrap();
        handle.await.unwrap();
        assert!(workflow.can_reset());

        workflow.reset();
        assert_eq!(workflow.current_state(), ClaimStatus::Idle);
        assert!(workflow.current_attempt().is_none());
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_result() {
        let (workflow, writer) = workflow();
        let respond = writer.expect_call(RECIPIENT);

        let handle = workflow.submit(RECIPIENT).unwrap();
        workflow.reset();

        respond.send(Ok(TxHash::repeat_byte(0x01))).unwrap();
        handle.await.unwrap();

        assert_eq!(workflow.current_state(), ClaimStatus::Idle);
    }

    #[tokio::test]
    async fn test_current_state_is_stable() {
        let (workflow, writer) = workflow();
        let respond = writer.expect_call(RECIPIENT);

        let handle = workflow.submit(RECIPIENT).unwrap();
        respond.send(Ok(TxHash::repeat_byte(0x01))).unwrap();
        handle.await.unwrap();

        let first = workflow.current_state();
        for _ in 0..5 {
            assert_eq!(workflow.current_state(), first);
        }
    }

    #[tokio::test]
    async fn test_settle_pending_transaction() {
        let (workflow, writer) = workflow();
        let respond = writer.expect_call(RECIPIENT);
        let tx_hash = TxHash::repeat_byte(0x01);

        let handle = workflow.submit(RECIPIENT).unwrap();
        respond.send(Ok(tx_hash)).unwrap();
        handle.await.unwrap();

        assert!(!workflow.settle(TxHash::repeat_byte(0x09), Ok(())));
        assert_eq!(workflow.current_state(), ClaimStatus::Pending(tx_hash));

        assert!(workflow.settle(tx_hash, Ok(())));
        assert_eq!(workflow.current_state(), ClaimStatus::Settled(tx_hash));
        assert_eq!(workflow.tx_hash(), Some(tx_hash));

        // Already settled.
        assert!(!workflow.settle(tx_hash, Ok(())));
    }

    #[tokio::test]
    async fn test_settle_reverted_transaction() {
        let (workflow, writer) = workflow();
        let respond = writer.expect_call(RECIPIENT);
        let tx_hash = TxHash::repeat_byte(0x01);

        let handle = workflow.submit(RECIPIENT).unwrap();
        respond.send(Ok(tx_hash)).unwrap();
        handle.await.unwrap();

        let reverted = ChainError::Reverted("cooldown active".into());
        assert!(workflow.settle(tx_hash, Err(reverted.clone())));
        assert_eq!(
            workflow.current_state(),
            ClaimStatus::Failed(ClaimFailure::Chain(reverted))
        );
    }

    #[tokio::test]
    async fn test_subscribers_observe_transitions() {
        let (workflow, writer) = workflow();
        let mut updates = workflow.subscribe();
        let respond = writer.expect_call(RECIPIENT);

        let handle = workflow.submit(RECIPIENT).unwrap();
        assert_eq!(updates.recv().await.unwrap(), ClaimStatus::Validating);
        assert_eq!(updates.recv().await.unwrap(), ClaimStatus::Submitting);

        respond.send(Ok(TxHash::repeat_byte(0x01))).unwrap();
        handle.await.unwrap();
        assert_eq!(
            updates.recv().await.unwrap(),
            ClaimStatus::Pending(TxHash::repeat_byte(0x01))
        );

        workflow.reset();
        assert_eq!(updates.recv().await.unwrap(), ClaimStatus::Idle);
    }

    #[tokio::test]
    async fn test_transitions_replaced_before_reading_are_still_delivered() {
        let (workflow, writer) = workflow();
        let mut updates = workflow.subscribe();
        let respond = writer.expect_call(RECIPIENT);
        let tx_hash = TxHash::repeat_byte(0x01);

        let handle = workflow.submit(RECIPIENT).unwrap();
        respond.send(Ok(tx_hash)).unwrap();
        handle.await.unwrap();
        workflow.reset();
        assert!(workflow.submit("0x123").is_none());
        assert!(workflow.submit("0X1234567890abcdef1234567890ABCDEF12345678").is_none());
        drop(workflow);

        let mut observed = Vec::new();
        while let Ok(status) = updates.recv().await {
            observed.push(status.label());
        }

        assert_eq!(
            observed,
            [
                "validating",
                "submitting",
                "pending",
                "idle",
                "validating",
                "failed",
                "validating",
                "failed",
            ]
        );
    }

    #[tokio::test]
    async fn test_lagging_subscriber_is_told_how_much_it_missed() {
        let (workflow, _) = workflow();
        let mut updates = workflow.subscribe();

        for _ in 0..STATUS_CHANNEL_CAPACITY {
            assert!(workflow.submit("0x123").is_none());
        }

        // Each invalid submit publishes two transitions.
        assert_eq!(
            updates.recv().await,
            Err(broadcast::error::RecvError::Lagged(
                STATUS_CHANNEL_CAPACITY as u64
            ))
        );
        assert_eq!(updates.recv().await.unwrap(), ClaimStatus::Validating);
    }

    #[test]
    fn test_status_serialization() {
        let status = ClaimStatus::Failed(ClaimFailure::Invalid(ValidationError::BadPrefix));
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["state"], "failed");
        assert_eq!(json["detail"]["source"], "invalid");
        assert_eq!(json["detail"]["error"]["kind"], "bad_prefix");

        let idle = serde_json::to_value(ClaimStatus::Idle).unwrap();
        assert_eq!(idle["state"], "idle");
    }
}
