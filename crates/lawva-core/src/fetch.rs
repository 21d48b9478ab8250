//! Detail-fetch lifecycle for one page instance.
//!
//! [`Lifecycle`] is the synchronous state machine: every request attempt gets
//! a [`Ticket`] stamped with a generation number, and a result is applied
//! only while its ticket's generation is still current. Starting a new
//! attempt or cancelling bumps the generation, so a late answer for an old
//! identifier is dropped no matter when it arrives (last identifier wins).
//!
//! [`FetchController`] drives a lifecycle on Tokio: it spawns the request,
//! aborts the previous one, and publishes state changes on a `watch` channel.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::model::Certification;
use crate::source::CertificationSource;

/// Progress of the fetch owned by one page instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    /// No request has been issued yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The current request succeeded.
    Loaded(Certification),
    /// The current request failed.
    Failed(FetchError),
}

impl FetchState {
    /// Whether a request is still in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Handle for one request attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    id: String,
}

impl Ticket {
    /// Generation this attempt was issued under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Identifier this attempt requests.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Generation-guarded fetch state machine.
#[derive(Debug, Default)]
pub struct Lifecycle {
    generation: u64,
    target: Option<String>,
    state: FetchState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new attempt for `id`, superseding any earlier one.
    ///
    /// The state becomes [`FetchState::Loading`]. No previous result is
    /// reused, even for the same identifier.
    pub fn begin(&mut self, id: &str) -> Ticket {
        self.generation = self.generation.wrapping_add(1);
        self.target = Some(id.to_owned());
        self.state = FetchState::Loading;

        Ticket {
            generation: self.generation,
            id: id.to_owned(),
        }
    }

    /// Apply the outcome of an attempt.
    ///
    /// Returns `false` and leaves the state untouched if the ticket has been
    /// superseded or cancelled.
    pub fn settle(&mut self, ticket: &Ticket, result: Result<Certification, FetchError>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.state = match result {
            Ok(cert) => FetchState::Loaded(cert),
            Err(err) => FetchState::Failed(err),
        };
        true
    }

    /// Invalidate the outstanding attempt without touching the state.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Whether `ticket` belongs to the latest attempt.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Identifier of the latest attempt.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

/// Lifecycle plus the channel its state is published on.
///
/// Publishing happens under the same lock as the transition, so observers
/// never see states out of order.
struct Shared {
    lifecycle: Mutex<Lifecycle>,
    tx: watch::Sender<FetchState>,
}

impl Shared {
    fn with<R>(&self, f: impl FnOnce(&mut Lifecycle, &watch::Sender<FetchState>) -> R) -> R {
        let mut lifecycle = self
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut lifecycle, &self.tx)
    }

    fn begin(&self, id: &str) -> Ticket {
        self.with(|lifecycle, tx| {
            let ticket = lifecycle.begin(id);
            tx.send_replace(FetchState::Loading);
            debug!(id = %id, generation = ticket.generation, "certification fetch started");
            ticket
        })
    }

    fn settle(&self, ticket: &Ticket, result: Result<Certification, FetchError>) {
        if let Err(ref err) = result {
            // Logged even when discarded; the cause never reaches the view.
            warn!(id = %ticket.id, generation = ticket.generation, error = %err, "certification fetch failed");
        }

        self.with(|lifecycle, tx| {
            if lifecycle.settle(ticket, result) {
                tx.send_replace(lifecycle.state().clone());
                debug!(id = %ticket.id, generation = ticket.generation, "certification fetch settled");
            } else {
                debug!(
                    id = %ticket.id,
                    generation = ticket.generation,
                    current = lifecycle.generation(),
                    "discarding superseded certification fetch"
                );
            }
        });
    }

    fn cancel(&self) {
        self.with(|lifecycle, _| {
            lifecycle.cancel();
            debug!(generation = lifecycle.generation(), "certification fetch cancelled");
        });
    }
}

/// Owns the fetch lifecycle of one detail page instance.
///
/// At most one request is outstanding. Dropping the controller cancels it.
pub struct FetchController<S: CertificationSource> {
    source: Arc<S>,
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl<S: CertificationSource> FetchController<S> {
    /// Create an idle controller.
    pub fn new(source: S) -> Self {
        let (tx, _rx) = watch::channel(FetchState::Idle);
        Self {
            source: Arc::new(source),
            shared: Arc::new(Shared {
                lifecycle: Mutex::new(Lifecycle::new()),
                tx,
            }),
            task: None,
        }
    }

    /// The source requests are issued against.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Start fetching `id`, discarding any in-flight request.
    ///
    /// The state is [`FetchState::Loading`] when this returns. Must be called
    /// from within a Tokio runtime.
    pub fn load(&mut self, id: &str) {
        self.abort_task();

        let ticket = self.shared.begin(id);
        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.shared);

        self.task = Some(tokio::spawn(async move {
            let result = source.fetch(ticket.id()).await;
            shared.settle(&ticket, result);
        }));
    }

    /// Cancel the in-flight request, as on unmount.
    ///
    /// The state is left as it was; the cancelled request can no longer
    /// change it.
    pub fn unmount(&mut self) {
        self.abort_task();
        self.shared.cancel();
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FetchState {
        self.shared.tx.borrow().clone()
    }

    /// Identifier of the latest request, if any.
    pub fn target(&self) -> Option<String> {
        self.shared.with(|lifecycle, _| lifecycle.target().map(ToOwned::to_owned))
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.shared.tx.subscribe()
    }

    /// Wait until the state is no longer [`FetchState::Loading`].
    ///
    /// Returns immediately when idle. After [`unmount`](Self::unmount) during
    /// a request this never resolves, since nothing will settle it.
    pub async fn settled(&self) -> FetchState {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<S: CertificationSource> Drop for FetchController<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<S: CertificationSource> std::fmt::Debug for FetchController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchController")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::oneshot;

    use super::*;
    use crate::model::sample;

    type Reply = Result<Certification, FetchError>;

    /// Source whose answers are released by the test, one gate per id.
    #[derive(Default)]
    struct GatedSource {
        gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
        calls: AtomicUsize,
    }

    impl GatedSource {
        fn gate(&self, id: &str) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(id.to_owned(), rx);
            tx
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl CertificationSource for GatedSource {
        async fn fetch(&self, id: &str) -> Result<Certification, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().remove(id);
            match gate {
                Some(rx) => rx.await.unwrap_or_else(|_| {
                    Err(FetchError::Network {
                        reason: "gate dropped".to_owned(),
                    })
                }),
                None => Err(FetchError::Http { status: 404 }),
            }
        }
    }

    async fn wait_for_calls(source: &GatedSource, n: usize) {
        while source.calls() < n {
            tokio::task::yield_now().await;
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    #[test]
    fn new_lifecycle_is_idle() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), &FetchState::Idle);
        assert_eq!(lifecycle.target(), None);
    }

    #[test]
    fn begin_sets_loading() {
        let mut lifecycle = Lifecycle::new();
        let ticket = lifecycle.begin("42");
        assert_eq!(lifecycle.state(), &FetchState::Loading);
        assert!(lifecycle.state().is_loading());
        assert_eq!(ticket.id(), "42");
        assert_eq!(lifecycle.target(), Some("42"));
    }

    #[test]
    fn current_ticket_settles_to_loaded() {
        let mut lifecycle = Lifecycle::new();
        let ticket = lifecycle.begin("42");
        assert!(lifecycle.settle(&ticket, Ok(sample(42))));
        assert_eq!(lifecycle.state(), &FetchState::Loaded(sample(42)));
    }

    #[test]
    fn superseded_success_never_overwrites_newer_outcome() {
        let mut lifecycle = Lifecycle::new();
        let first = lifecycle.begin("42");
        let second = lifecycle.begin("43");

        // 42 resolves late, while 43 is still pending.
        assert!(!lifecycle.settle(&first, Ok(sample(42))));
        assert_eq!(lifecycle.state(), &FetchState::Loading);

        assert!(lifecycle.settle(&second, Err(FetchError::Http { status: 500 })));
        assert_eq!(
            lifecycle.state(),
            &FetchState::Failed(FetchError::Http { status: 500 })
        );

        // And after 43 settled, 42 still cannot take over.
        assert!(!lifecycle.settle(&first, Ok(sample(42))));
        assert!(matches!(lifecycle.state(), FetchState::Failed(_)));
    }

    #[test]
    fn rapid_identifier_changes_only_expose_the_last() {
        let mut lifecycle = Lifecycle::new();
        let tickets: Vec<Ticket> = ["1", "2", "3", "4"].iter().map(|id| lifecycle.begin(id)).collect();

        // Settle in reverse order; only the last issued id may land.
        for ticket in tickets.iter().rev() {
            let id: i64 = ticket.id().parse().unwrap();
            let applied = lifecycle.settle(ticket, Ok(sample(id)));
            assert_eq!(applied, ticket.id() == "4");
        }
        assert_eq!(lifecycle.state(), &FetchState::Loaded(sample(4)));
    }

    #[test]
    fn cancel_discards_result_without_state_change() {
        let mut lifecycle = Lifecycle::new();
        let ticket = lifecycle.begin("42");
        lifecycle.cancel();

        assert!(!lifecycle.settle(&ticket, Ok(sample(42))));
        assert_eq!(lifecycle.state(), &FetchState::Loading);
    }

    #[test]
    fn same_id_after_cancel_is_a_fresh_attempt() {
        let mut lifecycle = Lifecycle::new();
        let first = lifecycle.begin("42");
        lifecycle.cancel();
        let second = lifecycle.begin("42");

        assert_ne!(first, second);
        assert!(!lifecycle.is_current(&first));
        assert!(lifecycle.is_current(&second));
    }

    // ── Controller ───────────────────────────────────────────────────

    #[tokio::test]
    async fn controller_starts_idle_and_loads() {
        let mut controller = FetchController::new(GatedSource::default());
        assert_eq!(controller.state(), FetchState::Idle);
        assert_eq!(controller.settled().await, FetchState::Idle);

        let gate = controller.source().gate("42");
        controller.load("42");
        assert_eq!(controller.state(), FetchState::Loading);

        gate.send(Ok(sample(42))).unwrap();
        assert_eq!(controller.settled().await, FetchState::Loaded(sample(42)));
        assert_eq!(controller.target().as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn controller_reports_http_failure() {
        let mut controller = FetchController::new(GatedSource::default());
        let gate = controller.source().gate("42");
        controller.load("42");

        gate.send(Err(FetchError::Http { status: 500 })).unwrap();
        assert_eq!(
            controller.settled().await,
            FetchState::Failed(FetchError::Http { status: 500 })
        );
    }

    #[tokio::test]
    async fn controller_reports_decode_failure() {
        let mut controller = FetchController::new(GatedSource::default());
        let gate = controller.source().gate("42");
        controller.load("42");

        let reply = Certification::from_json(br#"{"_id": 42}"#);
        gate.send(reply).unwrap();
        let state = controller.settled().await;
        assert!(!state.is_loading());
        assert!(matches!(state, FetchState::Failed(FetchError::Decode { .. })));
    }

    #[tokio::test]
    async fn controller_last_identifier_wins() {
        let mut controller = FetchController::new(GatedSource::default());
        let gate_42 = controller.source().gate("42");
        let gate_43 = controller.source().gate("43");

        controller.load("42");
        wait_for_calls(controller.source(), 1).await;
        controller.load("43");

        // The aborted 42 request may already be gone; its answer is moot.
        let _ = gate_42.send(Ok(sample(42)));
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(controller.state(), FetchState::Loading);

        gate_43.send(Ok(sample(43))).unwrap();
        assert_eq!(controller.settled().await, FetchState::Loaded(sample(43)));
    }

    #[tokio::test]
    async fn remount_with_same_id_issues_fresh_request() {
        let mut controller = FetchController::new(GatedSource::default());
        let _first = controller.source().gate("42");
        controller.load("42");
        wait_for_calls(controller.source(), 1).await;

        controller.unmount();
        assert_eq!(controller.state(), FetchState::Loading);

        let second = controller.source().gate("42");
        controller.load("42");
        wait_for_calls(controller.source(), 2).await;
        second.send(Ok(sample(42))).unwrap();

        assert_eq!(controller.settled().await, FetchState::Loaded(sample(42)));
        assert_eq!(controller.source().calls(), 2);
    }

    #[tokio::test]
    async fn subscribers_see_loading_then_loaded() {
        let mut controller = FetchController::new(GatedSource::default());
        let mut rx = controller.subscribe();
        let gate = controller.source().gate("7");

        controller.load("7");
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), FetchState::Loading);

        gate.send(Ok(sample(7))).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), FetchState::Loaded(sample(7)));
    }
}
