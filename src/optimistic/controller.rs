use crate::device::CommandRejected;
use crate::domain::ValueDomain;
use crate::optimistic::update::{FailurePolicy, OptimisticUpdate, Ticket, UpdateStatus};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

pub trait ControlValue: Copy + PartialEq + Debug + Send + Sync + 'static {}

impl<T> ControlValue for T where T: Copy + PartialEq + Debug + Send + Sync + 'static {}

/// Delivers a control value to the device.
#[async_trait]
pub trait CommandSink<T>: Send + Sync {
    async fn send(&self, value: T) -> Result<(), CommandRejected>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSnapshot<T> {
    pub value: T,
    pub confirmed: T,
    pub status: UpdateStatus,
}

/// How a proposal ended.
#[derive(Debug)]
pub enum Resolution<T> {
    Confirmed(T),
    RolledBack { restored: T, error: CommandRejected },
    Retained { value: T, error: CommandRejected },
    /// A newer proposal superseded this one, its outcome was discarded.
    Stale,
}

/// A request that was sent for a proposal and has not resolved yet.
#[derive(Debug)]
pub struct PendingRequest<T> {
    ticket: Ticket,
    value: T,
    handle: JoinHandle<Resolution<T>>,
}

impl<T: ControlValue> PendingRequest<T> {
    pub fn value(&self) -> T {
        self.value
    }

    pub async fn resolved(self) -> Resolution<T> {
        match self.handle.await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(ticket = ?self.ticket, "⚠️ Request task for {:?} ended abnormally: {}", self.value, e);
                Resolution::Stale
            }
        }
    }
}

/// Applies user changes immediately and reconciles them with the device in the background.
pub struct OptimisticControl<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    name: &'static str,
    state: Mutex<OptimisticUpdate<T>>,
    domain: Arc<dyn ValueDomain<T>>,
    sink: Arc<dyn CommandSink<T>>,
    policy: FailurePolicy,
    timeout: Duration,
}

impl<T> Clone for OptimisticControl<T> {
    fn clone(&self) -> Self {
        OptimisticControl { inner: self.inner.clone() }
    }
}

impl<T> Debug for OptimisticControl<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimisticControl")
            .field("name", &self.inner.name)
            .field("policy", &self.inner.policy)
            .finish()
    }
}

impl<T: ControlValue> OptimisticControl<T> {
    pub fn new(
        name: &'static str,
        initial: T,
        domain: Arc<dyn ValueDomain<T>>,
        sink: Arc<dyn CommandSink<T>>,
        policy: FailurePolicy,
        timeout: Duration,
    ) -> Self {
        let initial = domain.normalize(initial).unwrap_or(initial);

        OptimisticControl {
            inner: Arc::new(Inner {
                name,
                state: Mutex::new(OptimisticUpdate::confirmed(initial)),
                domain,
                sink,
                policy,
                timeout,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn value(&self) -> T {
        self.inner.state().value()
    }

    pub fn snapshot(&self) -> ControlSnapshot<T> {
        snapshot_of(&self.inner.state())
    }

    /// Normalizes `value`, shows it right away and sends it to the device.
    ///
    /// Returns `None` when the value is outside the domain or already displayed; no request is sent then.
    pub fn propose(&self, value: T) -> Option<PendingRequest<T>> {
        let Some(value) = self.inner.domain.normalize(value) else {
            warn!(control = self.inner.name, "⚠️ Ignoring {:?}, it is not a valid value", value);
            return None;
        };

        let ticket = self.inner.state().propose(value)?;
        debug!(control = self.inner.name, ?ticket, "Proposed {:?}", value);

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move { inner.dispatch(ticket, value).await });

        Some(PendingRequest { ticket, value, handle })
    }
}

impl<T: ControlValue> Inner<T> {
    fn state(&self) -> MutexGuard<'_, OptimisticUpdate<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[instrument(skip(self), fields(control = self.name))]
    async fn dispatch(&self, ticket: Ticket, value: T) -> Resolution<T> {
        let outcome = match timeout(self.timeout, self.sink.send(value)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CommandRejected::TimedOut(self.timeout)),
        };

        let mut state = self.state();
        let resolution = match outcome {
            Ok(()) if state.confirm(ticket) => Resolution::Confirmed(value),
            Err(error) => match state.fail(ticket, self.policy) {
                Some(shown) if self.policy == FailurePolicy::Rollback => Resolution::RolledBack { restored: shown, error },
                Some(shown) => Resolution::Retained { value: shown, error },
                None => Resolution::Stale,
            },
            Ok(()) => Resolution::Stale,
        };
        drop(state);

        match &resolution {
            Resolution::Confirmed(value) => info!("✅ Device accepted {:?}", value),
            Resolution::RolledBack { restored, error } => warn!("⚠️ Device refused {:?}, rolled back to {:?}: {}", value, restored, error),
            Resolution::Retained { error, .. } => warn!("⚠️ Device refused {:?}, keeping it on screen: {}", value, error),
            Resolution::Stale => debug!("Discarding response for superseded {:?}", value),
        }

        resolution
    }
}

fn snapshot_of<T: Copy + PartialEq>(state: &OptimisticUpdate<T>) -> ControlSnapshot<T> {
    ControlSnapshot {
        value: state.value(),
        confirmed: state.previous_confirmed(),
        status: state.status(),
    }
}
